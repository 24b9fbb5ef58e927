//! # `quorum` – The umbrella crate
//!
//! One dependency line for the whole fan-out stack:
//!
//! | Crate                   | What it provides                                                          |
//! |-------------------------|---------------------------------------------------------------------------|
//! | **`quorum-core`**       | `ModelId`, `ChatClient`, `ModelRegistry`, templates, normalization, tools |
//! | **`quorum-prompt`**     | Loading system/user prompt files into templates                           |
//! | **`quorum-generator`**  | `GenerationTask` and the concurrent `Generator`                           |
//! | **`quorum-types`**      | Meeting-transcript summarization types and task                           |
//! | **`quorum-openai`**     | OpenAI, Perplexity and DashScope backend *(feature `openai`)*             |
//! | **`quorum-gemini`**     | Google Gemini backend *(feature `gemini`)*                                |
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use quorum::{GenerationTask, Generator, ModelId, template::Metadata};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let generator = Generator::new(quorum::default_registry());
//!
//!     let task = GenerationTask::builder("Echo")
//!         .models([ModelId::Gpt4o, ModelId::Gemini2])
//!         .prompt_text("You repeat what you are told.", "Echo: {input}")
//!         .metadata(Metadata::new().with("input", "hi"))
//!         .build()?;
//!
//!     for (model, answer) in generator.generate_all(&task).await {
//!         println!("{model}: {answer}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Models whose credentials are missing simply drop out of the answer map;
//! use [`Generator::generate_report`] to see why.
mod defaults;

pub use quorum_core::*;
pub use quorum_generator::{
    GenerationFailure, GenerationReport, GenerationStage, GenerationTask, GenerationTaskBuilder,
    Generator, GeneratorConfig,
};
pub use quorum_prompt as prompt;
pub use quorum_types as types;
pub use defaults::default_registry;

#[cfg(feature = "gemini")]
pub use quorum_gemini as gemini;
#[cfg(feature = "openai")]
pub use quorum_openai as openai;
