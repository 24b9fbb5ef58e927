//! Prompt resources on disk.
//!
//! Every generation task reads two plain-text files, a system prompt and a
//! user prompt, and turns them into a
//! [`ChatPromptTemplate`](quorum_core::template::ChatPromptTemplate):
//!
//! ```rust,no_run
//! use quorum_prompt::PromptFiles;
//!
//! let files = PromptFiles::named("./prompts", "summarization");
//! // ./prompts/summarization_system_prompt.txt
//! // ./prompts/summarization_user_prompt.txt
//! let template = files.load(false)?;
//! # Ok::<(), quorum_core::QuorumError>(())
//! ```
//!
//! A missing file is reported as
//! [`QuorumError::ResourceNotFound`](quorum_core::QuorumError::ResourceNotFound)
//! naming the path, before any model is contacted.
mod files;
mod loader;

pub use files::PromptFiles;
pub use loader::read_text_resource;
