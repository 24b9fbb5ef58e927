use std::{env, sync::Arc, time::Duration};

use quorum_core::{
    error::{QuorumError, Result},
    model::{ModelId, Provider},
    registry::ModelParams,
};

use crate::client::GeminiClient;

const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// A [`quorum_core::ChatClient`] bound to one Gemini model.
pub struct GeminiAdapter {
    pub(crate) client: Arc<GeminiClient>,
    pub(crate) model: ModelId,
    pub(crate) temperature: Option<f64>,
}

/// Builder for [`GeminiAdapter`].
///
/// Missing keys only surface during [`Self::build`].
#[derive(Debug, Clone, Default)]
pub struct GeminiAdapterBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    temperature: Option<f64>,
}

impl GeminiAdapterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the key from `GOOGLE_API_KEY`.
    pub fn new_from_env() -> Self {
        Self {
            api_key: env::var(API_KEY_VAR).ok().filter(|key| !key.trim().is_empty()),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Apply registry-level parameters on top of what was set so far.
    pub fn with_params(mut self, params: &ModelParams) -> Self {
        if let Some(temperature) = params.temperature {
            self.temperature = Some(temperature);
        }
        if let Some(timeout) = params.request_timeout {
            self.timeout = Some(timeout);
        }
        self
    }

    /// # Errors
    ///
    /// * [`QuorumError::ModelNotSupported`] – `model` is not a Gemini model.
    /// * [`QuorumError::Configuration`] – the API key is missing.
    pub fn build(self, model: ModelId) -> Result<GeminiAdapter> {
        if model.provider() != Provider::Google {
            return Err(QuorumError::ModelNotSupported {
                provider: Provider::Google.name(),
                model,
            });
        }
        let api_key = self.api_key.ok_or_else(|| {
            QuorumError::Configuration(format!("missing env variable: `{API_KEY_VAR}`"))
        })?;

        let client = GeminiClient::new(api_key, self.base_url, self.timeout)?;

        Ok(GeminiAdapter {
            client: Arc::new(client),
            model,
            temperature: self.temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_gemini_models_are_accepted() {
        let err = GeminiAdapterBuilder::new()
            .with_api_key("key")
            .build(ModelId::Gpt4o)
            .err()
            .unwrap();
        assert!(matches!(err, QuorumError::ModelNotSupported { model: ModelId::Gpt4o, .. }));
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = GeminiAdapterBuilder::new().build(ModelId::Gemini2).err().unwrap();
        assert!(matches!(err, QuorumError::Configuration(msg) if msg.contains(API_KEY_VAR)));
    }

    #[test]
    fn default_base_url_is_v1beta() {
        let adapter = GeminiAdapterBuilder::new()
            .with_api_key("key")
            .with_params(&ModelParams::default().with_temperature(0.0))
            .build(ModelId::Gemini2)
            .unwrap();
        assert_eq!(adapter.client.base_url(), crate::client::DEFAULT_BASE_URL);
        assert_eq!(adapter.temperature, Some(0.0));
    }
}
