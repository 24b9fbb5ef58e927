//! # `quorum-core`
//!
//! Provider-agnostic building blocks shared by every crate in the
//! workspace:
//!
//! | Module          | What it provides                                                        |
//! |-----------------|-------------------------------------------------------------------------|
//! | [`model`]       | The closed set of [`ModelId`](model::ModelId)s and their provider names |
//! | [`provider`]    | The [`ChatClient`](provider::ChatClient) capability every adapter implements |
//! | [`registry`]    | [`ModelRegistry`](registry::ModelRegistry), the model selector          |
//! | [`template`]    | Brace-substituted chat prompt templates and metadata                    |
//! | [`normalize`]   | Pure functions that clean raw model output                              |
//! | [`output`]      | Output modes: plain text or schema-validated structs                    |
//! | [`tool`] / [`agent`] | Invocable tools and the tool-calling agent loop                    |
//! | [`error`]       | The workspace-wide [`QuorumError`](error::QuorumError)                  |
//!
//! Nothing in here performs network I/O. Provider crates
//! (`quorum-openai`, `quorum-gemini`) implement [`provider::ChatClient`] and
//! the orchestrator in `quorum-generator` drives them.
pub mod agent;
pub mod error;
pub mod generic;
pub mod model;
pub mod normalize;
pub mod output;
pub mod provider;
pub mod registry;
pub mod schema_util;
pub mod template;
pub mod tool;

pub use error::{QuorumError, Result};
pub use model::ModelId;
pub use provider::ChatClient;
pub use registry::ModelRegistry;
