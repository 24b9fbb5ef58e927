//! Model identifiers used throughout the **quorum** workspace.
//!
//! Every model a generation task may target is a variant of [`ModelId`].
//! The enum is closed on purpose: application code never types literal
//! strings such as `"gpt-4o"`, and parsing anything outside the list fails
//! fast with [`QuorumError::InvalidModel`].
//!
//! # Adding more models
//!
//! 1. Add the variant to [`ModelId`] and to [`ModelId::ALL`].
//! 2. Fill in [`ModelId::symbol`], [`ModelId::as_str`] and
//!    [`ModelId::provider`]; the compiler points at every match you missed.
//! 3. Register a constructor for it (see `quorum::default_registry`).
//!
//! # Example
//!
//! ```rust
//! use quorum_core::model::{ModelId, Provider};
//!
//! let model: ModelId = "SONAR_PRO".parse().unwrap();
//! assert_eq!(model.as_str(), "sonar-pro");
//! assert_eq!(model.provider(), Provider::Perplexity);
//! ```
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::QuorumError;

/// Symbolic identifier for a specific LLM configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelId {
    #[serde(rename = "GPT4O")]
    Gpt4o,
    #[serde(rename = "GEMINI_2")]
    Gemini2,
    Sonar,
    SonarPro,
    SonarReasoning,
    #[serde(rename = "QWEN_3")]
    Qwen3,
}

/// The company / API family serving a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Google,
    Perplexity,
    DashScope,
}

impl ModelId {
    pub const ALL: [ModelId; 6] = [
        ModelId::Gpt4o,
        ModelId::Gemini2,
        ModelId::Sonar,
        ModelId::SonarPro,
        ModelId::SonarReasoning,
        ModelId::Qwen3,
    ];

    /// Upper-case symbolic name, e.g. `GEMINI_2`.
    pub fn symbol(self) -> &'static str {
        match self {
            ModelId::Gpt4o => "GPT4O",
            ModelId::Gemini2 => "GEMINI_2",
            ModelId::Sonar => "SONAR",
            ModelId::SonarPro => "SONAR_PRO",
            ModelId::SonarReasoning => "SONAR_REASONING",
            ModelId::Qwen3 => "QWEN_3",
        }
    }

    /// Model string sent to the provider API.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::Gpt4o => "gpt-4o",
            ModelId::Gemini2 => "gemini-2.0-flash",
            ModelId::Sonar => "sonar",
            ModelId::SonarPro => "sonar-pro",
            ModelId::SonarReasoning => "sonar-reasoning",
            ModelId::Qwen3 => "qwen3-235b-a22b",
        }
    }

    pub fn provider(self) -> Provider {
        match self {
            ModelId::Gpt4o => Provider::OpenAi,
            ModelId::Gemini2 => Provider::Google,
            ModelId::Sonar | ModelId::SonarPro | ModelId::SonarReasoning => Provider::Perplexity,
            ModelId::Qwen3 => Provider::DashScope,
        }
    }
}

impl Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the symbolic name (`GPT4O`) as well as the model string
/// (`gpt-4o`).
impl FromStr for ModelId {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ModelId::ALL
            .into_iter()
            .find(|m| m.symbol() == needle || m.as_str() == needle)
            .ok_or_else(|| QuorumError::InvalidModel(s.to_string()))
    }
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Google => "google",
            Provider::Perplexity => "perplexity",
            Provider::DashScope => "dashscope",
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
