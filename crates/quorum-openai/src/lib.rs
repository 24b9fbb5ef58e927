//! Chat backend for every provider that speaks the OpenAI
//! `chat/completions` dialect.
//!
//! | Provider   | Base URL                                              | Credential           |
//! |------------|-------------------------------------------------------|----------------------|
//! | OpenAI     | `https://api.openai.com/v1`                           | `OPENAI_API_KEY`     |
//! | Perplexity | `https://api.perplexity.ai`                           | `PERPLEXITY_API_KEY` |
//! | DashScope  | `https://dashscope-intl.aliyuncs.com/compatible-mode/v1` | `DASHSCOPE_API_KEY` |
//!
//! Build one [`OpenAiAdapter`] per model through [`OpenAiAdapterBuilder`];
//! the adapter implements [`quorum_core::ChatClient`] and can be handed to a
//! `ModelRegistry` constructor as-is.
mod adapter;
pub mod api_v1;
mod client;
pub mod error;
mod model_map;
mod provider_impl_chat;

pub use adapter::{OpenAiAdapter, OpenAiAdapterBuilder};
pub use client::OpenAiClient;
