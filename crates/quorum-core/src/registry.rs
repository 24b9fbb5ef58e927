//! The model selector: turns a [`ModelId`] into a ready-to-use
//! [`ChatClient`].
//!
//! A [`ModelRegistry`] is a static table of constructor functions keyed by
//! model identifier.  Provider crates contribute the constructors, the
//! umbrella crate wires them up (`quorum::default_registry`), and tests
//! register stubs:
//!
//! ```rust
//! use quorum_core::{ModelId, ModelRegistry, QuorumError, registry::ModelParams};
//!
//! let registry = ModelRegistry::new();
//! let err = registry
//!     .select_model(ModelId::Gpt4o, &ModelParams::default())
//!     .err()
//!     .unwrap();
//! assert!(matches!(err, QuorumError::UnregisteredModel(ModelId::Gpt4o)));
//! ```
use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use crate::{
    error::{QuorumError, Result},
    model::ModelId,
    provider::ChatClient,
};

/// Runtime parameters forwarded to every client constructor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelParams {
    pub temperature: Option<f64>,
    /// HTTP timeout for a single provider request.
    pub request_timeout: Option<Duration>,
}

impl ModelParams {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// Constructor stored in the registry. It receives the requested model so
/// one function can serve a whole provider family.
pub type ClientFactory =
    Arc<dyn Fn(ModelId, &ModelParams) -> Result<Box<dyn ChatClient>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ModelRegistry {
    factories: HashMap<ModelId, ClientFactory>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for `model`.
    pub fn register<F>(mut self, model: ModelId, factory: F) -> Self
    where
        F: Fn(ModelId, &ModelParams) -> Result<Box<dyn ChatClient>> + Send + Sync + 'static,
    {
        self.factories.insert(model, Arc::new(factory));
        self
    }

    /// Register the same constructor for several models.
    pub fn register_all<F>(mut self, models: impl IntoIterator<Item = ModelId>, factory: F) -> Self
    where
        F: Fn(ModelId, &ModelParams) -> Result<Box<dyn ChatClient>> + Send + Sync + 'static,
    {
        let factory: ClientFactory = Arc::new(factory);
        for model in models {
            self.factories.insert(model, Arc::clone(&factory));
        }
        self
    }

    pub fn contains(&self, model: ModelId) -> bool {
        self.factories.contains_key(&model)
    }

    /// Registered models in declaration order.
    pub fn models(&self) -> Vec<ModelId> {
        ModelId::ALL
            .into_iter()
            .filter(|m| self.contains(*m))
            .collect()
    }

    /// Construct the client for `model`.
    ///
    /// # Errors
    ///
    /// * [`QuorumError::UnregisteredModel`] – no constructor for `model`.
    /// * whatever the constructor reports, typically
    ///   [`QuorumError::Configuration`] for a missing credential.
    pub fn select_model(&self, model: ModelId, params: &ModelParams) -> Result<Box<dyn ChatClient>> {
        let factory = self
            .factories
            .get(&model)
            .ok_or(QuorumError::UnregisteredModel(model))?;

        factory(model, params)
    }

    /// Like [`Self::select_model`] but starting from a symbolic name.
    ///
    /// # Errors
    ///
    /// [`QuorumError::InvalidModel`] if `name` is not a [`ModelId`].
    pub fn select_model_by_name(&self, name: &str, params: &ModelParams) -> Result<Box<dyn ChatClient>> {
        let model: ModelId = name.parse()?;
        self.select_model(model, params)
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.models())
            .finish()
    }
}
