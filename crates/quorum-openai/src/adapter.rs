use std::{env, sync::Arc, time::Duration};

use quorum_core::{
    error::{QuorumError, Result},
    model::{ModelId, Provider},
    registry::ModelParams,
};

use crate::{client::OpenAiClient, model_map::map_model};

const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
const DASHSCOPE_BASE_URL: &str = "https://dashscope-intl.aliyuncs.com/compatible-mode/v1";

/// A [`quorum_core::ChatClient`] bound to one model on one
/// OpenAI-compatible endpoint.
///
/// Think of it as the **service locator** for the backend: it owns a
/// connection-pooled HTTP client, the resolved wire model name and the
/// sampling temperature.  Everything else happens through the trait.
pub struct OpenAiAdapter {
    pub(crate) client: Arc<OpenAiClient>,
    pub(crate) model: ModelId,
    pub(crate) model_name: &'static str,
    pub(crate) temperature: Option<f64>,
}

impl OpenAiAdapter {
    pub fn provider(&self) -> Provider {
        self.model.provider()
    }
}

/// Builder for [`OpenAiAdapter`].
///
/// # Typical usage
///
/// ```rust,no_run
/// use quorum_core::ModelId;
/// use quorum_openai::OpenAiAdapterBuilder;
///
/// let gpt = OpenAiAdapterBuilder::new_from_env()
///     .with_temperature(0.0)
///     .build(ModelId::Gpt4o)
///     .expect("OPENAI_API_KEY must be set");
///
/// let sonar = OpenAiAdapterBuilder::perplexity_from_env()
///     .build(ModelId::SonarPro)
///     .expect("PERPLEXITY_API_KEY must be set");
/// ```
///
/// Missing keys only surface during [`Self::build`], so a registry can hold
/// constructors for every model and fail just the ones lacking credentials.
#[derive(Debug, Clone)]
pub struct OpenAiAdapterBuilder {
    family: Provider,
    key_var: &'static str,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    temperature: Option<f64>,
}

impl OpenAiAdapterBuilder {
    /// Create an *empty* builder for `family`. Remember to supply an API key
    /// manually.
    pub fn new(family: Provider) -> Self {
        let (key_var, base_url) = match family {
            Provider::Perplexity => ("PERPLEXITY_API_KEY", Some(PERPLEXITY_BASE_URL)),
            Provider::DashScope => ("DASHSCOPE_API_KEY", Some(DASHSCOPE_BASE_URL)),
            Provider::OpenAi | Provider::Google => ("OPENAI_API_KEY", None),
        };
        Self {
            family,
            key_var,
            api_key: None,
            base_url: base_url.map(str::to_owned),
            timeout: None,
            temperature: None,
        }
    }

    /// OpenAI proper, keyed by `OPENAI_API_KEY`.
    pub fn new_from_env() -> Self {
        Self::new(Provider::OpenAi).with_key_from_env()
    }

    /// Perplexity's Sonar models, keyed by `PERPLEXITY_API_KEY`.
    pub fn perplexity_from_env() -> Self {
        Self::new(Provider::Perplexity).with_key_from_env()
    }

    /// Alibaba DashScope's compatible mode, keyed by `DASHSCOPE_API_KEY`.
    pub fn dashscope_from_env() -> Self {
        Self::new(Provider::DashScope).with_key_from_env()
    }

    /// Pick the family serving `model` and load its key from the environment.
    ///
    /// # Errors
    ///
    /// [`QuorumError::ModelNotSupported`] for models outside the
    /// OpenAI-compatible families.
    pub fn for_model_from_env(model: ModelId) -> Result<Self> {
        match model.provider() {
            Provider::OpenAi => Ok(Self::new_from_env()),
            Provider::Perplexity => Ok(Self::perplexity_from_env()),
            Provider::DashScope => Ok(Self::dashscope_from_env()),
            Provider::Google => Err(QuorumError::ModelNotSupported {
                provider: "openai-compatible",
                model,
            }),
        }
    }

    fn with_key_from_env(mut self) -> Self {
        self.api_key = env::var(self.key_var).ok().filter(|key| !key.trim().is_empty());
        self
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

    /// Finalise the builder and return an adapter bound to `model`.
    ///
    /// # Errors
    ///
    /// * [`QuorumError::Configuration`] – the API key is missing.
    /// * [`QuorumError::ModelNotSupported`] – `model` belongs to another family.
    /// * [`QuorumError::ProviderInvocation`] – the HTTP client could not be built.
    pub fn build(self, model: ModelId) -> Result<OpenAiAdapter> {
        let model_name = map_model(self.family, model)?;
        let api_key = self.api_key.ok_or_else(|| {
            QuorumError::Configuration(format!("missing env variable: `{}`", self.key_var))
        })?;

        let client = OpenAiClient::new(api_key, self.base_url, self.timeout)?;

        Ok(OpenAiAdapter {
            client: Arc::new(client),
            model,
            model_name,
            temperature: self.temperature,
        })
    }
}
