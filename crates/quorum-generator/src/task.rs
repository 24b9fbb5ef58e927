use std::{fmt, marker::PhantomData, path::PathBuf, sync::Arc};

use quorum_core::{
    error::{QuorumError, Result},
    model::ModelId,
    output::{OutputMode, Structured, Text},
    template::{ChatPromptTemplate, Metadata},
    tool::Tool,
};
use quorum_prompt::PromptFiles;

/// One logical generation request: which models to ask, with which prompt
/// and metadata, and what kind of answer to expect.
///
/// A task is immutable once built.  To serve a new request with different
/// metadata, derive a fresh task with [`GenerationTask::with_metadata`]
/// instead of sharing and mutating one instance.
pub struct GenerationTask<O: OutputMode = Text> {
    name: String,
    models: Vec<ModelId>,
    template: ChatPromptTemplate,
    metadata: Metadata,
    tools: Vec<Arc<dyn Tool>>,
    schema_variable: Option<String>,
    _output: PhantomData<fn() -> O>,
}

impl GenerationTask<Text> {
    pub fn builder(name: impl Into<String>) -> GenerationTaskBuilder<Text> {
        GenerationTaskBuilder {
            name: name.into(),
            models: Vec::new(),
            prompt: None,
            metadata: Metadata::new(),
            tools: Vec::new(),
            schema_variable: None,
            _output: PhantomData,
        }
    }
}

impl<O: OutputMode> GenerationTask<O> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn models(&self) -> &[ModelId] {
        &self.models
    }

    pub fn template(&self) -> &ChatPromptTemplate {
        &self.template
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// A new task sharing prompt, models and tools, with `metadata`
    /// replacing the current variables.  The output schema is injected
    /// again when the task was built with a schema variable.
    ///
    /// # Errors
    ///
    /// [`QuorumError::MissingTemplateVariable`] if `metadata` lacks a
    /// variable the template uses.
    pub fn with_metadata(&self, metadata: Metadata) -> Result<Self> {
        let metadata = inject_schema::<O>(&self.name, self.schema_variable.as_deref(), metadata)?;
        self.template.validate(&metadata)?;
        Ok(Self {
            metadata,
            ..self.clone()
        })
    }
}

impl<O: OutputMode> Clone for GenerationTask<O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            models: self.models.clone(),
            template: self.template.clone(),
            metadata: self.metadata.clone(),
            tools: self.tools.clone(),
            schema_variable: self.schema_variable.clone(),
            _output: PhantomData,
        }
    }
}

impl<O: OutputMode> fmt::Debug for GenerationTask<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationTask")
            .field("name", &self.name)
            .field("models", &self.models)
            .field("variables", &self.template.input_variables())
            .field("tools", &self.tools.iter().map(|t| t.spec().name).collect::<Vec<_>>())
            .field("schema_variable", &self.schema_variable)
            .finish()
    }
}

fn inject_schema<O: OutputMode>(
    task: &str,
    variable: Option<&str>,
    mut metadata: Metadata,
) -> Result<Metadata> {
    if let Some(variable) = variable {
        let schema = O::response_schema()?.ok_or_else(|| {
            QuorumError::Configuration(format!(
                "task `{task}` exposes a schema but produces plain text"
            ))
        })?;
        metadata.insert(variable, schema);
    }
    Ok(metadata)
}

enum PromptSource {
    Files(PromptFiles),
    Inline { system: String, user: String },
}

/// Builder for [`GenerationTask`].
///
/// The prompt is loaded and validated in [`Self::build`], so a missing
/// resource or template variable fails before any model is contacted.
pub struct GenerationTaskBuilder<O: OutputMode = Text> {
    name: String,
    models: Vec<ModelId>,
    prompt: Option<PromptSource>,
    metadata: Metadata,
    tools: Vec<Arc<dyn Tool>>,
    schema_variable: Option<String>,
    _output: PhantomData<fn() -> O>,
}

impl<O: OutputMode> GenerationTaskBuilder<O> {
    pub fn model(mut self, model: ModelId) -> Self {
        self.models.push(model);
        self
    }

    pub fn models(mut self, models: impl IntoIterator<Item = ModelId>) -> Self {
        self.models.extend(models);
        self
    }

    /// Add models by symbolic name.
    ///
    /// # Errors
    ///
    /// [`QuorumError::InvalidModel`] for the first unknown name.
    pub fn model_names<S: AsRef<str>>(self, names: impl IntoIterator<Item = S>) -> Result<Self> {
        let models = names
            .into_iter()
            .map(|name| name.as_ref().parse::<ModelId>())
            .collect::<Result<Vec<_>>>()?;
        Ok(self.models(models))
    }

    pub fn prompt_files(mut self, system: impl Into<PathBuf>, user: impl Into<PathBuf>) -> Self {
        self.prompt = Some(PromptSource::Files(PromptFiles::new(system, user)));
        self
    }

    pub fn prompts(mut self, files: PromptFiles) -> Self {
        self.prompt = Some(PromptSource::Files(files));
        self
    }

    /// Use in-memory template text instead of files.
    pub fn prompt_text(mut self, system: impl Into<String>, user: impl Into<String>) -> Self {
        self.prompt = Some(PromptSource::Inline {
            system: system.into(),
            user: user.into(),
        });
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Insert the output's JSON Schema into the metadata under `name`, so
    /// the prompt can show the model what to produce.
    pub fn schema_variable(mut self, name: impl Into<String>) -> Self {
        self.schema_variable = Some(name.into());
        self
    }

    /// Expect answers decoded into `T` instead of plain text.
    pub fn structured<T>(self) -> GenerationTaskBuilder<Structured<T>>
    where
        Structured<T>: OutputMode,
    {
        GenerationTaskBuilder {
            name: self.name,
            models: self.models,
            prompt: self.prompt,
            metadata: self.metadata,
            tools: self.tools,
            schema_variable: self.schema_variable,
            _output: PhantomData,
        }
    }

    /// Load the prompt and validate the task.
    ///
    /// # Errors
    ///
    /// * [`QuorumError::Configuration`] – no prompt given.
    /// * [`QuorumError::ResourceNotFound`] – a prompt file is missing.
    /// * [`QuorumError::TemplateSyntax`] / [`QuorumError::MissingTemplateVariable`].
    pub fn build(self) -> Result<GenerationTask<O>> {
        let with_tools = !self.tools.is_empty();
        let template = match self.prompt {
            Some(PromptSource::Files(files)) => files.load(with_tools)?,
            Some(PromptSource::Inline { system, user }) if with_tools => {
                ChatPromptTemplate::for_agent(&system, &user)?
            }
            Some(PromptSource::Inline { system, user }) => {
                ChatPromptTemplate::from_messages(&system, &user)?
            }
            None => {
                return Err(QuorumError::Configuration(format!(
                    "task `{}` has no prompt",
                    self.name
                )));
            }
        };

        let metadata =
            inject_schema::<O>(&self.name, self.schema_variable.as_deref(), self.metadata)?;
        template.validate(&metadata)?;

        let mut models: Vec<ModelId> = Vec::with_capacity(self.models.len());
        for model in self.models {
            if models.contains(&model) {
                tracing::debug!(task = %self.name, %model, "dropping duplicate model");
            } else {
                models.push(model);
            }
        }

        Ok(GenerationTask {
            name: self.name,
            models,
            template,
            metadata,
            tools: self.tools,
            schema_variable: self.schema_variable,
            _output: PhantomData,
        })
    }
}
