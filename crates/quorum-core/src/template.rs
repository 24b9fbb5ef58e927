//! Chat prompt templates with brace substitution.
//!
//! A [`ChatPromptTemplate`] is an ordered list of [`PromptSegment`]s: a
//! system text, a human text and, for tool-calling tasks, two named message
//! placeholders.  It is built once per generation task and rendered once
//! per model invocation against the task's [`Metadata`]:
//!
//! ```rust
//! use quorum_core::template::{ChatPromptTemplate, Metadata};
//!
//! let template = ChatPromptTemplate::from_messages(
//!     "You summarise council meetings.",
//!     "Echo: {input}",
//! )
//! .unwrap();
//!
//! let metadata = Metadata::new().with("input", "hi");
//! let messages = template.render(&metadata, &Default::default()).unwrap();
//! assert_eq!(messages[1].text(), "Echo: hi");
//! ```
//!
//! # Syntax
//!
//! * `{name}` is replaced by the metadata value `name`. Strings are inserted
//!   verbatim, every other JSON value as compact JSON.
//! * `{{` and `}}` produce literal braces.
//! * Any other brace is a [`QuorumError::TemplateSyntax`] error, reported
//!   when the template is built rather than when it is rendered.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{QuorumError, Result},
    generic::{GenericMessage, GenericRole},
};

/// Placeholder filled with the agent's intermediate tool-call trace.
pub const AGENT_SCRATCHPAD: &str = "agent_scratchpad";
/// Placeholder filled with prior turns supplied through the metadata.
pub const TASK_MEMORY: &str = "task_memory";

/// Template variables of one generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Map<String, Value>> for Metadata {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

/// Messages supplied for named placeholders at render time.
pub type Placeholders = HashMap<String, Vec<GenericMessage>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Variable(String),
}

/// Pre-parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateText {
    pieces: Vec<Piece>,
}

impl TemplateText {
    pub fn parse(source: &str) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((at, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => break,
                            other => name.push(other),
                        }
                    }
                    let name = name.trim();
                    if !closed || name.is_empty() {
                        return Err(QuorumError::TemplateSyntax(format!(
                            "unmatched or empty `{{` at byte {at}"
                        )));
                    }
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Variable(name.to_string()));
                }
                '}' => {
                    return Err(QuorumError::TemplateSyntax(format!(
                        "single `}}` encountered at byte {at}"
                    )));
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self { pieces })
    }

    /// Variable names in order of first appearance.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Variable(name) => Some(name.as_str()),
            Piece::Literal(_) => None,
        })
    }

    pub fn render(&self, metadata: &Metadata) -> Result<String> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Variable(name) => {
                    let value = metadata
                        .get(name)
                        .ok_or_else(|| QuorumError::MissingTemplateVariable(name.clone()))?;
                    match value {
                        Value::String(s) => out.push_str(s),
                        other => out.push_str(&other.to_string()),
                    }
                }
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSegment {
    System(TemplateText),
    Human(TemplateText),
    /// Zero or more messages injected at render time.
    Placeholder(String),
}

/// Immutable, reusable chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPromptTemplate {
    segments: Vec<PromptSegment>,
}

impl ChatPromptTemplate {
    /// System + human message template.
    pub fn from_messages(system: &str, human: &str) -> Result<Self> {
        Ok(Self {
            segments: vec![
                PromptSegment::System(TemplateText::parse(system)?),
                PromptSegment::Human(TemplateText::parse(human)?),
            ],
        })
    }

    /// System + human template followed by the [`AGENT_SCRATCHPAD`] and
    /// [`TASK_MEMORY`] placeholders used by tool-calling tasks.
    pub fn for_agent(system: &str, human: &str) -> Result<Self> {
        Ok(Self::from_messages(system, human)?
            .with_placeholder(AGENT_SCRATCHPAD)
            .with_placeholder(TASK_MEMORY))
    }

    pub fn with_placeholder(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PromptSegment::Placeholder(name.into()));
        self
    }

    pub fn segments(&self) -> &[PromptSegment] {
        &self.segments
    }

    pub fn has_placeholder(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, PromptSegment::Placeholder(p) if p == name))
    }

    /// Every variable the text segments reference.
    pub fn input_variables(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .flat_map(|segment| match segment {
                PromptSegment::System(text) | PromptSegment::Human(text) => {
                    text.variables().collect::<Vec<_>>()
                }
                PromptSegment::Placeholder(_) => Vec::new(),
            })
            .collect()
    }

    /// Fail with [`QuorumError::MissingTemplateVariable`] for the first
    /// variable `metadata` does not provide.
    pub fn validate(&self, metadata: &Metadata) -> Result<()> {
        match self.input_variables().into_iter().find(|v| !metadata.contains(v)) {
            Some(missing) => Err(QuorumError::MissingTemplateVariable(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Produce the message list for one invocation.
    ///
    /// Placeholders take their messages from `placeholders` first, then from
    /// a metadata array of the same name; a placeholder found in neither
    /// renders to nothing.
    pub fn render(&self, metadata: &Metadata, placeholders: &Placeholders) -> Result<Vec<GenericMessage>> {
        let mut messages = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment {
                PromptSegment::System(text) => {
                    messages.push(GenericMessage::new(text.render(metadata)?, GenericRole::System))
                }
                PromptSegment::Human(text) => {
                    messages.push(GenericMessage::new(text.render(metadata)?, GenericRole::User))
                }
                PromptSegment::Placeholder(name) => {
                    if let Some(supplied) = placeholders.get(name) {
                        messages.extend(supplied.iter().cloned());
                    } else if let Some(value) = metadata.get(name) {
                        messages.extend(messages_from_value(name, value)?);
                    }
                }
            }
        }

        Ok(messages)
    }
}

fn messages_from_value(name: &str, value: &Value) -> Result<Vec<GenericMessage>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(value.clone()).map_err(|e| {
            QuorumError::Configuration(format!(
                "placeholder `{name}` must hold a list of {{role, content}} messages: {e}"
            ))
        }),
        _ => Err(QuorumError::Configuration(format!(
            "placeholder `{name}` must hold a list of messages"
        ))),
    }
}
