//! # `quorum-generator`
//!
//! The generation orchestrator: one prompt, many models, answers collected
//! per model.
//!
//! ```text
//!                   ┌────────────────┐
//!  GenerationTask ─►│   Generator    │─┬─► unit(GPT4O)    ─┐
//!  (models, prompt, │ registry+config│ ├─► unit(GEMINI_2) ─┼─► HashMap<ModelId, Output>
//!   metadata, tools)└────────────────┘ └─► unit(SONAR)    ─┘
//! ```
//!
//! Each unit runs `select client → invoke (or agent loop) → normalize`.
//! Units are isolated: one provider failing is logged and leaves its model
//! out of the result, it never aborts the batch.
//!
//! ```rust,no_run
//! use quorum_core::{ModelId, ModelRegistry, template::Metadata};
//! use quorum_generator::{GenerationTask, Generator};
//!
//! # async fn run(registry: ModelRegistry) -> quorum_core::Result<()> {
//! let task = GenerationTask::builder("Echo")
//!     .models([ModelId::Gpt4o, ModelId::Gemini2])
//!     .prompt_files("prompts/echo_system_prompt.txt", "prompts/echo_user_prompt.txt")
//!     .metadata(Metadata::new().with("input", "hi"))
//!     .build()?;
//!
//! let answers = Generator::new(registry).generate_all(&task).await;
//! for (model, text) in &answers {
//!     println!("{model}: {text}");
//! }
//! # Ok(())
//! # }
//! ```
mod config;
mod generator;
mod task;

pub use config::GeneratorConfig;
pub use generator::{GenerationFailure, GenerationReport, GenerationStage, Generator};
pub use task::{GenerationTask, GenerationTaskBuilder};
