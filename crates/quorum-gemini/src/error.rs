use quorum_core::error::QuorumError;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("couldn’t (de)serialise body: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Gemini returned non-success status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("invalid API key header: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("answer blocked: {0}")]
    Blocked(String),

    #[error("Gemini format error: {0}")]
    Format(String),
}

impl From<GeminiError> for QuorumError {
    fn from(value: GeminiError) -> Self {
        QuorumError::ProviderInvocation(Box::new(value))
    }
}
