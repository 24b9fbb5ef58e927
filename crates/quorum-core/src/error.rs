//! Unified error type exposed by **`quorum-core`**.
//!
//! Provider crates convert their internal errors into
//! [`QuorumError::ProviderInvocation`] before bubbling them up, so the
//! orchestrator only ever deals with one error type.  The variants mirror
//! the failure taxonomy of a generation request:
//!
//! * configuration problems (missing prompt resource, missing credential,
//!   bad template) surface before any network call,
//! * model selection problems ([`QuorumError::InvalidModel`],
//!   [`QuorumError::UnregisteredModel`]) are raised synchronously,
//! * provider and normalization failures are isolated to a single model
//!   when running a batch.
use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::model::ModelId;

/// Convenient alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, QuorumError>;

#[derive(Debug, Error)]
pub enum QuorumError {
    /// Missing credential, malformed setting or similar static problem.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A prompt (or other text) resource could not be read.
    #[error("failed to read resource `{}`: {source}", path.display())]
    ResourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template text contains an unmatched brace.
    #[error("invalid template syntax: {0}")]
    TemplateSyntax(String),

    /// The template references a variable the metadata doesn't provide.
    #[error("template variable `{0}` is missing from the metadata")]
    MissingTemplateVariable(String),

    /// The identifier is not part of the [`ModelId`] enumeration.
    #[error("invalid model name: `{0}`")]
    InvalidModel(String),

    /// The identifier is valid but nobody registered a constructor for it.
    #[error("model `{0}` not found in the list of available models")]
    UnregisteredModel(ModelId),

    /// An adapter was asked to serve a model from another provider.
    #[error("provider `{provider}` does not support model `{model}`")]
    ModelNotSupported {
        provider: &'static str,
        model: ModelId,
    },

    /// Network or provider-side failure while invoking a model.
    #[error("provider invocation failed: {0}")]
    ProviderInvocation(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The model answered, but not in the requested structured format.
    #[error("LLM did not respond with a structured response: {source}")]
    MalformedLlmResponse {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    /// A tool invoked by the agent loop failed.
    #[error("tool `{name}` failed: {message}")]
    Tool { name: String, message: String },

    #[error("agent stopped after {0} iterations without a final answer")]
    AgentIterationLimit(usize),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl QuorumError {
    /// Wrap any provider-specific error.
    pub fn provider(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ProviderInvocation(Box::new(err))
    }
}
