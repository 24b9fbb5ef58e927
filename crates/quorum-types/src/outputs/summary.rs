use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Summary of a whole meeting plus one entry per agenda item discussed.
#[derive(Debug, Clone, PartialEq, Eq, JsonSchema, Serialize, Deserialize)]
pub struct MeetingSummary {
    /// Concise narrative summary of the entire meeting.
    pub meeting_summary: String,
    /// Per-agenda-item summaries, in the order the items were discussed.
    #[serde(default)]
    pub agenda_summary: Vec<AgendaSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, JsonSchema, Serialize, Deserialize)]
pub struct AgendaSummary {
    /// Agenda item title exactly as it appears in the agenda.
    pub agenda_name: String,
    /// What was discussed and decided for this item.
    pub agenda_summary: String,
}

impl MeetingSummary {
    /// Look up the summary of one agenda item by its exact title.
    pub fn agenda_item(&self, name: &str) -> Option<&AgendaSummary> {
        self.agenda_summary.iter().find(|item| item.agenda_name == name)
    }
}
