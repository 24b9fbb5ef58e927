use std::path::{Path, PathBuf};

use quorum_core::{error::Result, model::ModelId, output::Structured};
use quorum_generator::{GenerationTask, Generator};
use quorum_prompt::{PromptFiles, read_text_resource};

use crate::{MeetingContext, outputs::MeetingSummary};

pub const SUMMARIZATION_TASK: &str = "Transcript Summarization";

const PROMPT_NAME: &str = "summarization";
const SCHEMA_VARIABLE: &str = "schema";
const DEFAULT_PROMPT_DIR: &str = "./prompts";

/// Summarizes one meeting transcript with one model.
///
/// The task loads `<dir>/summarization_system_prompt.txt` and
/// `<dir>/summarization_user_prompt.txt`; the prompts may reference
/// `{transcript}`, `{agenda_for_the_meeting}`, `{current_date}` and
/// `{schema}`.
///
/// ```rust,no_run
/// # async fn run(generator: quorum_generator::Generator) -> quorum_core::Result<()> {
/// use quorum_core::ModelId;
/// use quorum_types::TranscriptSummarizer;
///
/// let summary = TranscriptSummarizer::new(ModelId::Gemini2)
///     .summarize_file(&generator, "transcripts/10_50523.txt", ["1 ROLL CALL"])
///     .await?;
/// println!("{}", summary.meeting_summary);
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct TranscriptSummarizer {
    model: ModelId,
    prompts: PromptFiles,
}

impl TranscriptSummarizer {
    pub fn new(model: ModelId) -> Self {
        Self {
            model,
            prompts: PromptFiles::named(DEFAULT_PROMPT_DIR, PROMPT_NAME),
        }
    }

    /// Look for the summarization prompt pair in `dir` instead of `./prompts`.
    pub fn with_prompt_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.prompts = PromptFiles::named(dir, PROMPT_NAME);
        self
    }

    pub fn with_prompts(mut self, prompts: PromptFiles) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Build the structured task for `context` without running it.
    pub fn task(&self, context: &MeetingContext) -> Result<GenerationTask<Structured<MeetingSummary>>> {
        GenerationTask::builder(SUMMARIZATION_TASK)
            .model(self.model)
            .prompts(self.prompts.clone())
            .metadata(context.to_metadata())
            .structured::<MeetingSummary>()
            .schema_variable(SCHEMA_VARIABLE)
            .build()
    }

    /// Run the task; any failure of the single model is returned as-is.
    pub async fn summarize(&self, generator: &Generator, context: &MeetingContext) -> Result<MeetingSummary> {
        let task = self.task(context)?;
        let summary = generator.generate_one(&task, self.model).await?;

        tracing::info!(
            model = %self.model,
            agenda_items = summary.agenda_summary.len(),
            "summarized transcript"
        );
        Ok(summary)
    }

    /// Read the transcript from `path` and summarize it.
    pub async fn summarize_file(
        &self,
        generator: &Generator,
        path: impl Into<PathBuf>,
        agenda: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<MeetingSummary> {
        let transcript = read_text_resource(path.into())?;
        self.summarize(generator, &MeetingContext::new(transcript, agenda))
            .await
    }
}
