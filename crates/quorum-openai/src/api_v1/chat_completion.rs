use quorum_core::generic::{GenericFunctionSpec, GenericMessage, GenericRole};
use quorum_core::provider::ChatCompleteParameters;
use serde::{Deserialize, Serialize};

use crate::impl_builder_methods;

use super::common::Usage;
use super::tools::ToolCall;

#[derive(Debug, Serialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

impl ChatCompletionRequest {
    pub fn new(model: String, messages: Vec<ChatCompletionMessage>) -> Self {
        Self {
            model,
            messages,
            temperature: None,
            top_p: None,
            n: None,
            response_format: None,
            tools: None,
            tool_choice: None,
        }
    }

    /// Translate provider-agnostic parameters into a request for `model`.
    pub fn from_parameters(model: impl Into<String>, params: ChatCompleteParameters) -> Self {
        let mut request = Self::new(
            model.into(),
            params.messages.into_iter().map(Into::into).collect(),
        );
        if let Some(tools) = params.tools {
            request.tools = Some(tools.into_iter().map(Into::into).collect());
            request.tool_choice = Some(ToolChoice::Auto);
        }
        request
    }
}

impl_builder_methods!(
    ChatCompletionRequest,
    temperature: f64,
    top_p: f64,
    n: i64,
    response_format: serde_json::Value,
    tools: Vec<ToolSpec>,
    tool_choice: ToolChoice
);

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct ToolSpec {
    pub function: ToolFunctionSpec,
    pub r#type: ToolType,
}

impl From<GenericFunctionSpec> for ToolSpec {
    fn from(value: GenericFunctionSpec) -> Self {
        ToolSpec {
            function: ToolFunctionSpec {
                name: value.name,
                description: value.description,
                parameters: value.parameters,
                strict: None,
            },
            r#type: ToolType::Function,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct ToolFunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    Function,
}

#[derive(Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    None,
    Auto,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    System,
    Assistant,
    Function,
    Tool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatCompletionMessage {
    pub role: MessageRole,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionMessageForResponse {
    pub role: MessageRole,
    #[serde(default)]
    pub content: Option<String>,
    /// Chain-of-thought some compatible backends (DashScope) return
    /// separately from the answer.
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default)]
    pub tool_call_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<ChatCompletionMessageForResponse> for GenericMessage {
    fn from(value: ChatCompletionMessageForResponse) -> Self {
        GenericMessage {
            content: value.content,
            role: value.role.into(),
            tool_calls: value
                .tool_calls
                .map(|calls| calls.into_iter().map(Into::into).collect()),
            name: value.name,
            tool_call_id: value.tool_call_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionChoice {
    #[serde(default)]
    pub index: i64,
    pub message: ChatCompletionMessageForResponse,
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub system_fingerprint: Option<String>,
    /// Sources Perplexity attaches to Sonar answers.
    #[serde(default)]
    pub citations: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    FunctionCall,
}

impl From<GenericRole> for MessageRole {
    fn from(value: GenericRole) -> Self {
        match value {
            GenericRole::System => MessageRole::System,
            GenericRole::Assistant => MessageRole::Assistant,
            GenericRole::User => MessageRole::User,
            GenericRole::Tool => MessageRole::Tool,
        }
    }
}

impl From<MessageRole> for GenericRole {
    fn from(value: MessageRole) -> Self {
        match value {
            MessageRole::User => GenericRole::User,
            MessageRole::System => GenericRole::System,
            MessageRole::Assistant => GenericRole::Assistant,
            MessageRole::Function | MessageRole::Tool => GenericRole::Tool,
        }
    }
}

impl From<GenericMessage> for ChatCompletionMessage {
    fn from(value: GenericMessage) -> Self {
        // Tool results are matched by `tool_call_id`; the API rejects `name` there.
        let name = match value.role {
            GenericRole::Tool => None,
            _ => value.name,
        };
        Self {
            role: value.role.into(),
            content: value.content,
            name,
            tool_calls: value
                .tool_calls
                .map(|calls| calls.into_iter().map(Into::into).collect()),
            tool_call_id: value.tool_call_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::generic::{GenericFunctionCall, GenericFunctionCallIntent};
    use serde_json::json;

    #[test]
    fn request_omits_unset_fields() {
        let params = ChatCompleteParameters::new(vec![
            GenericMessage::new("You are terse.", GenericRole::System),
            GenericMessage::new("Echo: hi", GenericRole::User),
        ]);
        let request = ChatCompletionRequest::from_parameters("gpt-4o", params).temperature(0.0);

        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(
            wire,
            json!({
                "model": "gpt-4o",
                "temperature": 0.0,
                "messages": [
                    {"role": "system", "content": "You are terse."},
                    {"role": "user", "content": "Echo: hi"}
                ]
            })
        );
    }

    #[test]
    fn tool_round_is_encoded_for_the_wire() {
        let intent = GenericFunctionCallIntent {
            id: "call_1".into(),
            function: GenericFunctionCall {
                name: "agenda_item".into(),
                arguments: json!({"file_number": "250652"}),
            },
        };
        let params = ChatCompleteParameters::new(vec![
            GenericMessage::tool_call_request(vec![intent.clone()]),
            GenericMessage::tool_result("Pier 80 lease", &intent),
        ])
        .with_tools(vec![GenericFunctionSpec {
            name: "agenda_item".into(),
            description: "Look up an agenda item".into(),
            parameters: json!({"type": "object"}),
        }]);

        let wire = serde_json::to_value(ChatCompletionRequest::from_parameters("gpt-4o", params)).unwrap();
        assert_eq!(wire["tool_choice"], "auto");
        assert_eq!(wire["tools"][0]["type"], "function");
        assert_eq!(wire["tools"][0]["function"]["name"], "agenda_item");
        assert_eq!(wire["messages"][0]["role"], "assistant");
        assert_eq!(wire["messages"][0]["content"], serde_json::Value::Null);
        assert_eq!(wire["messages"][0]["tool_calls"][0]["id"], "call_1");
        assert_eq!(wire["messages"][1]["role"], "tool");
        assert_eq!(wire["messages"][1]["tool_call_id"], "call_1");
        assert!(wire["messages"][1].get("name").is_none());
    }

    #[test]
    fn perplexity_style_response_decodes() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "abc",
            "model": "sonar-pro",
            "created": 1_700_000_000,
            "citations": ["https://sfbos.org"],
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": {"role": "assistant", "content": "The board met."}
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        }))
        .unwrap();

        assert_eq!(response.choices[0].finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 16);
        assert_eq!(response.citations.as_deref(), Some(&["https://sfbos.org".to_string()][..]));
    }
}
