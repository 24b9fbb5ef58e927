use quorum_core::generic::{GenericFunctionCall, GenericFunctionCallIntent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCall {
    pub id: String,
    pub function: ToolCallFunction,
    #[serde(default)]
    pub r#type: ToolCallType,
}

impl From<ToolCall> for GenericFunctionCallIntent {
    fn from(value: ToolCall) -> Self {
        GenericFunctionCallIntent {
            id: value.id,
            function: value.function.into(),
        }
    }
}

impl From<GenericFunctionCallIntent> for ToolCall {
    fn from(value: GenericFunctionCallIntent) -> Self {
        Self {
            id: value.id,
            function: value.function.into(),
            r#type: ToolCallType::Function,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallType {
    #[default]
    Function,
}

/// On the wire `arguments` is a JSON document *encoded as a string*.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCallFunction {
    pub name: String,
    pub arguments: String,
}

impl From<ToolCallFunction> for GenericFunctionCall {
    fn from(value: ToolCallFunction) -> Self {
        // Models occasionally emit arguments that are not valid JSON; keep
        // the raw text so the tool can still report a useful error.
        let arguments = serde_json::from_str(&value.arguments)
            .unwrap_or(Value::String(value.arguments));
        GenericFunctionCall {
            name: value.name,
            arguments,
        }
    }
}

impl From<GenericFunctionCall> for ToolCallFunction {
    fn from(value: GenericFunctionCall) -> Self {
        let arguments = match value.arguments {
            Value::String(raw) => raw,
            other => other.to_string(),
        };
        Self {
            name: value.name,
            arguments,
        }
    }
}
