use chrono::{Datelike as _, NaiveDate};
use quorum_core::template::Metadata;

pub(crate) const TRANSCRIPT: &str = "transcript";
pub(crate) const AGENDA: &str = "agenda_for_the_meeting";
pub(crate) const CURRENT_DATE: &str = "current_date";

/// Compose the identifier the summary store keys meetings by.
///
/// ```rust
/// assert_eq!(quorum_types::meeting_id("10", "50523"), "10_50523");
/// ```
pub fn meeting_id(clip_id: impl std::fmt::Display, view_id: impl std::fmt::Display) -> String {
    format!("{clip_id}_{view_id}")
}

/// Everything the summarization prompt needs to know about one meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingContext {
    pub transcript: String,
    pub agenda: Vec<String>,
    /// Date the model reasons from; today (UTC) when unset.
    pub current_date: Option<NaiveDate>,
}

impl MeetingContext {
    pub fn new(transcript: impl Into<String>, agenda: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            transcript: transcript.into(),
            agenda: agenda.into_iter().map(Into::into).collect(),
            current_date: None,
        }
    }

    pub fn with_current_date(mut self, date: NaiveDate) -> Self {
        self.current_date = Some(date);
        self
    }

    /// Prompt variables: `transcript`, `agenda_for_the_meeting` (a JSON
    /// array of titles) and `current_date`.
    pub fn to_metadata(&self) -> Metadata {
        let date = self
            .current_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        Metadata::new()
            .with(TRANSCRIPT, self.transcript.as_str())
            .with(AGENDA, self.agenda.clone())
            .with(
                CURRENT_DATE,
                format!("{}, {}", date.weekday(), date.format("%Y-%m-%d")),
            )
    }
}

impl From<&MeetingContext> for Metadata {
    fn from(value: &MeetingContext) -> Self {
        value.to_metadata()
    }
}
