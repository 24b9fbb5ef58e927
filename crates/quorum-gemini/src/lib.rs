//! Google Gemini backend speaking the `v1beta` `generateContent` API.
//!
//! ```rust,no_run
//! use quorum_core::ModelId;
//! use quorum_gemini::GeminiAdapterBuilder;
//!
//! let gemini = GeminiAdapterBuilder::new_from_env()
//!     .with_temperature(0.0)
//!     .build(ModelId::Gemini2)
//!     .expect("GOOGLE_API_KEY must be set");
//! ```
//!
//! Gemini differs from the OpenAI dialect in a few places the adapter
//! smooths over:
//!
//! * system messages travel in `systemInstruction`, not in `contents`;
//! * the assistant role is called `model`;
//! * tool results are `functionResponse` parts matched by function *name*,
//!   so call ids are synthesized when the API omits them.
mod adapter;
pub mod api_v1beta;
mod client;
mod convert;
pub mod error;
mod provider_impl_chat;

pub use adapter::{GeminiAdapter, GeminiAdapterBuilder};
pub use client::GeminiClient;
