use quorum_core::error::QuorumError;
use reqwest::StatusCode;

/// High-level error type covering every failure mode the client can hit.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("couldn’t (de)serialise body: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("API returned non-success status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("invalid API key header: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("response format error: {0}")]
    Format(String),
}

impl From<OpenAiError> for QuorumError {
    fn from(value: OpenAiError) -> Self {
        QuorumError::ProviderInvocation(Box::new(value))
    }
}
