use std::{env, num::NonZeroUsize, str::FromStr, time::Duration};

use quorum_core::{
    agent::DEFAULT_MAX_ITERATIONS,
    error::{QuorumError, Result},
    normalize::{FenceExtraction, NormalizePolicy},
    registry::ModelParams,
};

/// Runtime knobs of a [`Generator`](crate::Generator).
///
/// ```rust
/// use std::time::Duration;
/// use quorum_generator::GeneratorConfig;
///
/// let config = GeneratorConfig::default()
///     .with_pool_size(4)
///     .with_call_timeout(Duration::from_secs(90));
/// assert_eq!(config.pool_size(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pool_size: Option<NonZeroUsize>,
    /// Bound on a single model invocation (including the agent loop).
    pub call_timeout: Option<Duration>,
    /// Bound on the whole batch.
    pub batch_timeout: Option<Duration>,
    pub temperature: Option<f64>,
    pub max_agent_iterations: usize,
    pub normalize: NormalizePolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pool_size: None,
            call_timeout: None,
            batch_timeout: None,
            temperature: Some(0.0),
            max_agent_iterations: DEFAULT_MAX_ITERATIONS,
            normalize: NormalizePolicy::default(),
        }
    }
}

impl GeneratorConfig {
    /// Read `QUORUM_*` variables from the process environment, falling back
    /// to the defaults for unset ones.
    ///
    /// | Variable                      | Meaning                               |
    /// |-------------------------------|---------------------------------------|
    /// | `QUORUM_POOL_SIZE`            | concurrent model invocations          |
    /// | `QUORUM_CALL_TIMEOUT_SECS`    | per-model timeout                     |
    /// | `QUORUM_BATCH_TIMEOUT_SECS`   | whole-batch timeout                   |
    /// | `QUORUM_TEMPERATURE`          | sampling temperature (default `0`)    |
    /// | `QUORUM_MAX_AGENT_ITERATIONS` | tool-calling loop bound               |
    /// | `QUORUM_FENCE_EXTRACTION`     | `never`, `structured` or `always`     |
    ///
    /// # Errors
    ///
    /// [`QuorumError::Configuration`] naming the variable that failed to parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(size) = parse_var::<usize>(&lookup, "QUORUM_POOL_SIZE")? {
            config = config.with_pool_size(size);
        }
        if let Some(secs) = parse_var::<f64>(&lookup, "QUORUM_CALL_TIMEOUT_SECS")? {
            config.call_timeout = Some(seconds(secs, "QUORUM_CALL_TIMEOUT_SECS")?);
        }
        if let Some(secs) = parse_var::<f64>(&lookup, "QUORUM_BATCH_TIMEOUT_SECS")? {
            config.batch_timeout = Some(seconds(secs, "QUORUM_BATCH_TIMEOUT_SECS")?);
        }
        if let Some(temperature) = parse_var::<f64>(&lookup, "QUORUM_TEMPERATURE")? {
            config.temperature = Some(temperature);
        }
        if let Some(iterations) = parse_var::<usize>(&lookup, "QUORUM_MAX_AGENT_ITERATIONS")? {
            config.max_agent_iterations = iterations.max(1);
        }
        if let Some(policy) = lookup("QUORUM_FENCE_EXTRACTION") {
            config.normalize.fence_extraction = policy.parse::<FenceExtraction>()?;
        }

        Ok(config)
    }

    /// Concurrent units; defaults to the host's available parallelism.
    pub fn pool_size(&self) -> usize {
        self.pool_size
            .or_else(|| std::thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }

    /// A size of zero falls back to the default.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = NonZeroUsize::new(size);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = Some(timeout);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_agent_iterations(mut self, iterations: usize) -> Self {
        self.max_agent_iterations = iterations.max(1);
        self
    }

    pub fn with_normalize_policy(mut self, policy: NormalizePolicy) -> Self {
        self.normalize = policy;
        self
    }

    /// Parameters forwarded to every client constructor.
    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            temperature: self.temperature,
            request_timeout: self.call_timeout,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| QuorumError::Configuration(format!("invalid `{key}` value `{raw}`: {e}")))
        })
        .transpose()
}

fn seconds(secs: f64, key: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| QuorumError::Configuration(format!("invalid `{key}` value `{secs}`: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_plain_generation() {
        let config = GeneratorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.temperature, Some(0.0));
        assert!(config.call_timeout.is_none());
        assert!(config.pool_size() >= 1);
    }

    #[test]
    fn reads_every_variable() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            ("QUORUM_POOL_SIZE", "3"),
            ("QUORUM_CALL_TIMEOUT_SECS", "1.5"),
            ("QUORUM_BATCH_TIMEOUT_SECS", "60"),
            ("QUORUM_TEMPERATURE", "0.7"),
            ("QUORUM_MAX_AGENT_ITERATIONS", "4"),
            ("QUORUM_FENCE_EXTRACTION", "always"),
        ]))
        .unwrap();

        assert_eq!(config.pool_size(), 3);
        assert_eq!(config.call_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.batch_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.max_agent_iterations, 4);
        assert_eq!(config.normalize.fence_extraction, FenceExtraction::Always);
        assert_eq!(config.model_params().request_timeout, config.call_timeout);
    }

    #[test]
    fn malformed_value_names_the_variable() {
        let err = GeneratorConfig::from_lookup(lookup(&[("QUORUM_POOL_SIZE", "many")])).unwrap_err();
        assert!(matches!(err, QuorumError::Configuration(msg) if msg.contains("QUORUM_POOL_SIZE")));

        let err =
            GeneratorConfig::from_lookup(lookup(&[("QUORUM_CALL_TIMEOUT_SECS", "-1")])).unwrap_err();
        assert!(matches!(err, QuorumError::Configuration(_)));
    }
}
