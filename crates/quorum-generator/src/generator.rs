use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use quorum_core::{
    agent::ToolAgent,
    error::{QuorumError, Result},
    model::ModelId,
    output::OutputMode,
    provider::ChatClient,
    registry::ModelRegistry,
    template::Placeholders,
};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::Instrument as _;

use crate::{config::GeneratorConfig, task::GenerationTask};

/// Where a single model's generation currently is.
///
/// `Pending → SelectingClient → Invoking → Normalizing → Done | Failed`.
/// There are no retries; any error moves the unit straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Pending,
    SelectingClient,
    Invoking,
    Normalizing,
    Done,
    Failed,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationStage::Pending => "pending",
            GenerationStage::SelectingClient => "selecting_client",
            GenerationStage::Invoking => "invoking",
            GenerationStage::Normalizing => "normalizing",
            GenerationStage::Done => "done",
            GenerationStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why one model is missing from a batch result.
#[derive(Debug)]
pub struct GenerationFailure {
    pub model: ModelId,
    /// Stage the unit was in when it failed, also for a caught panic.
    pub stage: GenerationStage,
    pub error: QuorumError,
}

/// Outcome of a batch.
#[derive(Debug)]
pub struct GenerationReport<T> {
    pub results: HashMap<ModelId, T>,
    pub failures: Vec<GenerationFailure>,
    /// Models still running when the batch timeout elapsed.
    pub timed_out: Vec<ModelId>,
}

impl<T> Default for GenerationReport<T> {
    fn default() -> Self {
        Self {
            results: HashMap::new(),
            failures: Vec::new(),
            timed_out: Vec::new(),
        }
    }
}

impl<T> GenerationReport<T> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.timed_out.is_empty()
    }
}

type UnitResult<T> = std::result::Result<T, (GenerationStage, QuorumError)>;

/// Last stage a unit entered, readable after the unit panicked.
#[derive(Debug, Clone)]
struct StageCell(Arc<Mutex<GenerationStage>>);

impl Default for StageCell {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(GenerationStage::Pending)))
    }
}

impl StageCell {
    fn set(&self, stage: GenerationStage) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = stage;
    }

    fn get(&self) -> GenerationStage {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs [`GenerationTask`]s against the models of a [`ModelRegistry`].
///
/// The generator holds no per-request state, so one instance can serve any
/// number of concurrent requests.
#[derive(Debug, Clone)]
pub struct Generator {
    registry: Arc<ModelRegistry>,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(registry: ModelRegistry) -> Self {
        Self::with_config(registry, GeneratorConfig::default())
    }

    pub fn with_config(registry: ModelRegistry, config: GeneratorConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Ask a single model and propagate any failure to the caller.
    pub async fn generate_one<O: OutputMode>(
        &self,
        task: &GenerationTask<O>,
        model: ModelId,
    ) -> Result<O::Output> {
        self.run_unit(task, model, &StageCell::default())
            .await
            .map_err(|(_, error)| error)
    }

    /// Ask every model of `task` concurrently and return the answers keyed
    /// by model. Failed models are logged and left out; this never fails.
    pub async fn generate_all<O: OutputMode>(
        &self,
        task: &GenerationTask<O>,
    ) -> HashMap<ModelId, O::Output> {
        self.generate_report(task).await.results
    }

    /// Like [`Self::generate_all`], additionally reporting what failed.
    ///
    /// Each model runs as its own tokio task, at most
    /// [`GeneratorConfig::pool_size`] at a time, so a unit that blocks its
    /// thread does not hold up the others.  A panicking unit is reported as
    /// an [`QuorumError::Internal`] failure at the stage it had reached.
    #[tracing::instrument(skip_all, fields(task = %task.name(), models = task.models().len()))]
    pub async fn generate_report<O: OutputMode>(
        &self,
        task: &GenerationTask<O>,
    ) -> GenerationReport<O::Output> {
        let shared = Arc::new(task.clone());
        let permits = Arc::new(Semaphore::new(self.config.pool_size()));
        let mut units = JoinSet::new();
        let mut spawned: HashMap<tokio::task::Id, (ModelId, StageCell)> = HashMap::new();

        for model in task.models().iter().copied() {
            let generator = self.clone();
            let task = Arc::clone(&shared);
            let permits = Arc::clone(&permits);
            let stage = StageCell::default();
            let unit_stage = stage.clone();

            let handle = units.spawn(
                async move {
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return Err((
                            GenerationStage::Pending,
                            QuorumError::Internal("worker pool closed".to_string()),
                        ));
                    };
                    generator.run_unit(&task, model, &unit_stage).await
                }
                .in_current_span(),
            );
            spawned.insert(handle.id(), (model, stage));
        }

        let mut report = GenerationReport::default();
        let drain = async {
            while let Some(joined) = units.join_next_with_id().await {
                let (id, outcome) = match joined {
                    Ok((id, outcome)) => (id, outcome),
                    Err(err) => {
                        let id = err.id();
                        let stage = spawned
                            .get(&id)
                            .map_or(GenerationStage::Pending, |(_, stage)| stage.get());
                        let message = if err.is_panic() {
                            format!("generation panicked: {}", panic_message(&*err.into_panic()))
                        } else {
                            format!("generation cancelled: {err}")
                        };
                        (id, Err((stage, QuorumError::Internal(message))))
                    }
                };
                let Some((model, _)) = spawned.get(&id) else {
                    continue;
                };
                let model = *model;

                match outcome {
                    Ok(output) => {
                        report.results.insert(model, output);
                    }
                    Err((stage, error)) => {
                        tracing::error!(
                            task = %task.name(),
                            %model,
                            %stage,
                            error = %error,
                            "error with LLM response generation"
                        );
                        report.failures.push(GenerationFailure { model, stage, error });
                    }
                }
            }
        };

        match self.config.batch_timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, drain).await.is_err() {
                    units.abort_all();
                    report.timed_out = task
                        .models()
                        .iter()
                        .copied()
                        .filter(|m| {
                            !report.results.contains_key(m) && !report.failures.iter().any(|f| f.model == *m)
                        })
                        .collect();
                    tracing::warn!(
                        task = %task.name(),
                        timed_out = ?report.timed_out,
                        "batch timeout elapsed, dropping unfinished models"
                    );
                }
            }
            None => drain.await,
        }

        tracing::info!(
            task = %task.name(),
            succeeded = ?report.results.keys().collect::<Vec<_>>(),
            failed = report.failures.len(),
            "finished generating responses from models"
        );
        report
    }

    async fn run_unit<O: OutputMode>(
        &self,
        task: &GenerationTask<O>,
        model: ModelId,
        stage: &StageCell,
    ) -> UnitResult<O::Output> {
        stage.set(GenerationStage::SelectingClient);
        let client = self
            .registry
            .select_model(model, &self.config.model_params())
            .map_err(|e| (GenerationStage::SelectingClient, e))?;

        tracing::info!(task = %task.name(), %model, "started LLM response generation");
        stage.set(GenerationStage::Invoking);
        let raw = self
            .invoke(task, client.as_ref())
            .await
            .map_err(|e| (GenerationStage::Invoking, e))?;

        stage.set(GenerationStage::Normalizing);
        let output = O::normalize(&raw, &self.config.normalize)
            .map_err(|e| (GenerationStage::Normalizing, e))?;
        stage.set(GenerationStage::Done);
        tracing::info!(task = %task.name(), %model, "finished LLM response generation");

        Ok(output)
    }

    /// Plain chain call, or the agent loop when the task has tools.
    async fn invoke<O: OutputMode>(
        &self,
        task: &GenerationTask<O>,
        client: &dyn ChatClient,
    ) -> Result<String> {
        let call = async {
            if task.has_tools() {
                ToolAgent::new(client, task.tools())
                    .with_max_iterations(self.config.max_agent_iterations)
                    .run(task.template(), task.metadata())
                    .await
            } else {
                let messages = task.template().render(task.metadata(), &Placeholders::new())?;
                client.invoke(messages).await
            }
        };

        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| QuorumError::Timeout(limit))?,
            None => call.await,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
