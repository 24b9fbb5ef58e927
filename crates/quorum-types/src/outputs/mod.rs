mod summary;

pub use summary::{AgendaSummary, MeetingSummary};
