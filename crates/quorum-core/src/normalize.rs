//! Best-effort cleanup of raw model output.
//!
//! Models wrap answers in quotes, stray punctuation or markdown fences, and
//! occasionally echo the JSON Schema they were given instead of an instance
//! of it.  Normalization is a fixed pipeline of pure steps:
//!
//! 1. [`trim_response`] – strip [`TRIM_CHARS`] and whitespace at both ends.
//! 2. [`extract_fenced_block`] – keep only the interior of a ```` ``` ````
//!    fence, preferring one tagged `json` (see [`FenceExtraction`]).
//! 3. structured mode only: decode JSON, [`unwrap_properties`], then
//!    deserialize into the target type.
//!
//! Whether step 2 also runs for plain-text answers, and whether step 3
//! unwraps a top-level `properties` object, is decided by
//! [`NormalizePolicy`].  When it does, plain text is trimmed again after
//! each extraction and nested fences are peeled until none remain, so
//! normalizing an already normalized answer changes nothing.
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{QuorumError, Result};

/// Punctuation stripped from both ends in addition to whitespace.
pub const TRIM_CHARS: &str = r##"!"#$%&'*+,-./:;<=>?@\^_|~"##;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// When fence extraction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FenceExtraction {
    Never,
    /// Only when a schema is requested.
    #[default]
    StructuredOnly,
    Always,
}

impl std::str::FromStr for FenceExtraction {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "structured" | "structured_only" => Ok(Self::StructuredOnly),
            "always" => Ok(Self::Always),
            other => Err(QuorumError::Configuration(format!(
                "unknown fence extraction policy `{other}` (expected never, structured or always)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizePolicy {
    pub fence_extraction: FenceExtraction,
    /// Replace a decoded `{"properties": {...}}` by its inner object.
    pub unwrap_properties: bool,
}

impl Default for NormalizePolicy {
    fn default() -> Self {
        Self {
            fence_extraction: FenceExtraction::StructuredOnly,
            unwrap_properties: true,
        }
    }
}

impl NormalizePolicy {
    pub fn with_fence_extraction(mut self, fence_extraction: FenceExtraction) -> Self {
        self.fence_extraction = fence_extraction;
        self
    }

    pub fn with_unwrap_properties(mut self, unwrap: bool) -> Self {
        self.unwrap_properties = unwrap;
        self
    }
}

// ASCII whitespace including vertical tab; other Unicode spaces are content.
fn is_trimmed(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c') || TRIM_CHARS.contains(c)
}

/// Step A.
pub fn trim_response(text: &str) -> &str {
    text.trim_matches(is_trimmed)
}

/// Step B. Returns `None` when `text` contains no fence.
///
/// The fence starts after the *last* "```json" if there is one, otherwise
/// after the first "```", and ends at the last "```".  An unterminated
/// fence yields everything after its opening marker.
pub fn extract_fenced_block(text: &str) -> Option<&str> {
    if !text.contains(FENCE) {
        return None;
    }

    let start = match text.rfind(JSON_FENCE) {
        Some(at) => at + JSON_FENCE.len(),
        None => text.find(FENCE)? + FENCE.len(),
    };
    let end = text.rfind(FENCE).filter(|end| *end >= start).unwrap_or(text.len());

    Some(text[start..end].trim())
}

/// Unwrap a schema-echo response: `{"properties": {...}}` becomes `{...}`.
pub fn unwrap_properties(value: Value) -> Value {
    match value {
        Value::Object(mut map) if matches!(map.get("properties"), Some(Value::Object(_))) => {
            map.remove("properties").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn extract_if(text: &str, enabled: bool) -> &str {
    if enabled {
        extract_fenced_block(text).unwrap_or(text)
    } else {
        text
    }
}

/// Normalize a plain-text answer. Never fails.
pub fn normalize_text(raw: &str, policy: &NormalizePolicy) -> String {
    let mut text = trim_response(raw);
    if policy.fence_extraction == FenceExtraction::Always {
        // each interior is strictly shorter than its input
        while let Some(inner) = extract_fenced_block(text) {
            text = trim_response(inner);
        }
    }
    text.to_string()
}

/// Normalize and decode a structured answer into `T`.
///
/// # Errors
///
/// [`QuorumError::MalformedLlmResponse`] carrying `raw` when the cleaned
/// text is not JSON or does not match `T`.
pub fn normalize_structured<T>(raw: &str, policy: &NormalizePolicy) -> Result<T>
where
    T: DeserializeOwned,
{
    let malformed = |source| QuorumError::MalformedLlmResponse {
        raw: raw.to_string(),
        source,
    };

    let trimmed = trim_response(raw);
    let body = extract_if(trimmed, policy.fence_extraction != FenceExtraction::Never);

    let mut decoded: Value = serde_json::from_str(body).map_err(malformed)?;
    if policy.unwrap_properties {
        decoded = unwrap_properties(decoded);
    }

    serde_json::from_value(decoded).map_err(malformed)
}
