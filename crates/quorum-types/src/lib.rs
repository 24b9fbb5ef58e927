//! Domain types for summarizing public-meeting transcripts.
//!
//! * [`outputs::MeetingSummary`] – the structured answer every model is
//!   asked for; its JSON Schema is embedded in the prompt.
//! * [`MeetingContext`] – transcript, agenda and date turned into prompt
//!   metadata.
//! * [`TranscriptSummarizer`] – the "Transcript Summarization" task for a
//!   single model.
mod meeting;
pub mod outputs;
mod summarizer;

pub use meeting::{MeetingContext, meeting_id};
pub use summarizer::{SUMMARIZATION_TASK, TranscriptSummarizer};
