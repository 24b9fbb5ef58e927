//! Generic message and role types shared by every provider adapter.
//!
//! They mirror the concepts exposed by most chat APIs ("system", "user",
//! "assistant", "tool").  Adapters convert them into their wire structs via
//! `From`/`Into`; templates and the agent loop only ever see these.
//!
//! Only add fields here if they are **required by multiple back-ends**.
//! Provider-specific extras belong to the adapter's own message type.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A single chat message independent of any specific LLM provider.
///
/// * `content` – raw UTF-8 text, `None` for pure tool-call messages.
/// * `role` – see [`GenericRole`].
/// * `name` – for tool results, the name of the tool that produced them.
/// * `tool_calls` – tool invocations requested by the assistant.
/// * `tool_call_id` – for tool results, the call they answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericMessage {
    pub content: Option<String>,
    pub role: GenericRole,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<GenericFunctionCallIntent>>,
    #[serde(default)]
    pub tool_call_id: Option<String>,
}

impl GenericMessage {
    /// ```rust
    /// use quorum_core::generic::{GenericMessage, GenericRole};
    ///
    /// let sys = GenericMessage::new("You are a meeting clerk.", GenericRole::System);
    /// assert_eq!(sys.text(), "You are a meeting clerk.");
    /// ```
    pub fn new(message: impl Into<String>, role: GenericRole) -> Self {
        Self {
            content: Some(message.into()),
            role,
            name: None,
            tool_call_id: None,
            tool_calls: None,
        }
    }

    /// Assistant message that only requests tool invocations.
    pub fn tool_call_request(tool_calls: Vec<GenericFunctionCallIntent>) -> Self {
        Self {
            content: None,
            role: GenericRole::Assistant,
            name: None,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    /// Result of a tool invocation, answering `intent`.
    pub fn tool_result(content: impl Into<String>, intent: &GenericFunctionCallIntent) -> Self {
        Self::new(content, GenericRole::Tool)
            .with_name(&intent.function.name)
            .with_tool_call_id(&intent.id)
    }

    pub fn with_name(mut self, name: impl ToString) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl ToString) -> Self {
        self.tool_call_id = Some(tool_call_id.to_string());
        self
    }

    /// Text content, or the empty string.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// High-level chat roles recognised by most LLM providers.
///
/// `Display` renders the canonical lowercase name.
#[derive(Debug, Clone, Serialize, Deserialize, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenericRole {
    /// Global behaviour and style guidelines.
    System,
    /// Messages produced by the model.
    Assistant,
    /// Messages originating from the human side. `human` is accepted as an
    /// alias so memory entries written for other toolkits still load.
    #[serde(alias = "human")]
    User,
    /// Result of a tool call injected into the conversation.
    Tool,
}

impl Display for GenericRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenericRole::System => write!(f, "system"),
            GenericRole::Assistant => write!(f, "assistant"),
            GenericRole::User => write!(f, "user"),
            GenericRole::Tool => write!(f, "tool"),
        }
    }
}

/// One round-trip worth of model output.
#[derive(Debug, Clone)]
pub struct GenericChatCompletionResponse {
    pub content: ResponseContent,
    pub usage: Option<GenericUsageReport>,
}

#[derive(Debug, Clone)]
pub enum ResponseContent {
    /// The model produced its final message.
    Finished(GenericMessage),
    /// The model wants tools to run before it continues.
    ToolCalls(GenericMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericUsageReport {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericFunctionCallIntent {
    pub id: String,
    pub function: GenericFunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericFunctionCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Provider-neutral description of a callable tool.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericFunctionSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
}
