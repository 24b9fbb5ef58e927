use std::collections::HashMap;

use quorum_core::{
    generic::{
        GenericChatCompletionResponse, GenericFunctionCall, GenericFunctionCallIntent,
        GenericFunctionSpec, GenericMessage, GenericRole, GenericUsageReport, ResponseContent,
    },
    provider::ChatCompleteParameters,
};
use serde_json::{Map, Value, json};

use crate::{
    api_v1beta::{
        Content, FunctionCall, FunctionDeclaration, FunctionResponse, GenerateContentRequest,
        GenerateContentResponse, GenerationConfig, Part, Role, Tool,
    },
    error::GeminiError,
};

/// JSON-schema keywords Gemini's OpenAPI subset rejects.
const UNSUPPORTED_SCHEMA_KEYS: [&str; 3] = ["$schema", "additionalProperties", "definitions"];

pub(crate) fn to_request(params: ChatCompleteParameters, temperature: Option<f64>) -> GenerateContentRequest {
    let mut system_parts = Vec::new();
    let mut contents: Vec<Content> = Vec::new();
    let mut call_names: HashMap<String, String> = HashMap::new();

    for message in params.messages {
        match message.role {
            GenericRole::System => system_parts.push(Part::text(message.text())),
            GenericRole::User => contents.push(Content::new(Role::User, vec![Part::text(message.text())])),
            GenericRole::Assistant => {
                let mut parts = Vec::new();
                if !message.text().is_empty() {
                    parts.push(Part::text(message.text()));
                }
                for intent in message.tool_calls.into_iter().flatten() {
                    call_names.insert(intent.id.clone(), intent.function.name.clone());
                    parts.push(Part::function_call(FunctionCall {
                        id: None,
                        name: intent.function.name,
                        args: intent.function.arguments,
                    }));
                }
                contents.push(Content::new(Role::Model, parts));
            }
            GenericRole::Tool => {
                let name = message
                    .name
                    .clone()
                    .or_else(|| {
                        message
                            .tool_call_id
                            .as_ref()
                            .and_then(|id| call_names.get(id).cloned())
                    })
                    .unwrap_or_default();
                let part = Part::function_response(FunctionResponse {
                    id: None,
                    name,
                    response: json!({ "content": message.text() }),
                });

                // All answers to one round of calls belong in a single turn.
                match contents.last_mut() {
                    Some(last)
                        if last.role == Some(Role::User)
                            && last.parts.iter().all(|p| p.function_response.is_some()) =>
                    {
                        last.parts.push(part)
                    }
                    _ => contents.push(Content::new(Role::User, vec![part])),
                }
            }
        }
    }

    GenerateContentRequest {
        contents,
        system_instruction: (!system_parts.is_empty()).then(|| Content {
            role: None,
            parts: system_parts,
        }),
        tools: params.tools.map(|specs| {
            vec![Tool {
                function_declarations: specs.into_iter().map(declaration).collect(),
            }]
        }),
        generation_config: temperature.map(|temperature| GenerationConfig {
            temperature: Some(temperature),
            ..GenerationConfig::default()
        }),
    }
}

fn declaration(spec: GenericFunctionSpec) -> FunctionDeclaration {
    FunctionDeclaration {
        name: spec.name,
        description: spec.description,
        parameters: strip_unsupported(spec.parameters),
    }
}

/// Drop keywords Gemini rejects from a JSON Schema.  Only schema keywords
/// are inspected: property names and literal values such as `enum` or
/// `default` pass through untouched.
fn strip_unsupported(schema: Value) -> Value {
    let Value::Object(map) = schema else {
        return schema;
    };
    map.into_iter()
        .filter(|(key, _)| !UNSUPPORTED_SCHEMA_KEYS.contains(&key.as_str()))
        .map(|(key, value)| {
            let value = match key.as_str() {
                "properties" | "patternProperties" => strip_schema_map(value),
                "items" | "not" | "anyOf" | "oneOf" | "allOf" | "prefixItems" => strip_subschemas(value),
                _ => value,
            };
            (key, value)
        })
        .collect::<Map<String, Value>>()
        .into()
}

fn strip_schema_map(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(name, schema)| (name, strip_unsupported(schema)))
                .collect(),
        ),
        other => other,
    }
}

fn strip_subschemas(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(strip_unsupported).collect()),
        other => strip_unsupported(other),
    }
}

pub(crate) fn from_response(
    response: GenerateContentResponse,
) -> Result<GenericChatCompletionResponse, GeminiError> {
    let usage = response.usage_metadata.map(|usage| GenericUsageReport {
        prompt_tokens: usage.prompt_token_count,
        completion_tokens: usage.candidates_token_count,
        total_tokens: if usage.total_token_count > 0 {
            usage.total_token_count
        } else {
            usage.prompt_token_count + usage.candidates_token_count
        },
    });

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "response has no candidates".into());
        return Err(GeminiError::Blocked(reason));
    };

    match candidate.finish_reason.as_deref() {
        None | Some("STOP") | Some("MAX_TOKENS") | Some("FINISH_REASON_UNSPECIFIED") => {}
        Some(other) => return Err(GeminiError::Blocked(other.to_owned())),
    }

    let parts = candidate.content.map(|content| content.parts).unwrap_or_default();

    let mut text = String::new();
    let mut calls = Vec::new();
    for part in parts {
        if part.thought == Some(true) {
            continue;
        }
        if let Some(call) = part.function_call {
            let id = call.id.unwrap_or_else(|| format!("call_{}", calls.len()));
            calls.push(GenericFunctionCallIntent {
                id,
                function: GenericFunctionCall {
                    name: call.name,
                    arguments: call.args,
                },
            });
        } else if let Some(chunk) = part.text {
            text.push_str(&chunk);
        }
    }

    let content = if calls.is_empty() {
        if text.is_empty() {
            return Err(GeminiError::Format("candidate has no text".into()));
        }
        ResponseContent::Finished(GenericMessage::new(text, GenericRole::Assistant))
    } else {
        let mut message = GenericMessage::tool_call_request(calls);
        if !text.is_empty() {
            message.content = Some(text);
        }
        ResponseContent::ToolCalls(message)
    };

    Ok(GenericChatCompletionResponse { content, usage })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn intent() -> GenericFunctionCallIntent {
        GenericFunctionCallIntent {
            id: "call_0".into(),
            function: GenericFunctionCall {
                name: "agenda_item".into(),
                arguments: json!({"file_number": "250652"}),
            },
        }
    }

    #[test]
    fn system_messages_move_to_system_instruction() {
        let params = ChatCompleteParameters::new(vec![
            GenericMessage::new("You are a meeting clerk.", GenericRole::System),
            GenericMessage::new("Echo: hi", GenericRole::User),
        ]);
        let wire = serde_json::to_value(to_request(params, Some(0.0))).unwrap();

        assert_eq!(
            wire,
            json!({
                "systemInstruction": {"parts": [{"text": "You are a meeting clerk."}]},
                "contents": [{"role": "user", "parts": [{"text": "Echo: hi"}]}],
                "generationConfig": {"temperature": 0.0}
            })
        );
    }

    #[test]
    fn tool_rounds_use_model_role_and_function_responses() {
        let call = intent();
        let mut second = intent();
        second.id = "call_1".into();
        second.function.name = "roll_call".into();

        let nameless_result = GenericMessage::new("all present", GenericRole::Tool).with_tool_call_id("call_1");
        let params = ChatCompleteParameters::new(vec![
            GenericMessage::new("What is 250652?", GenericRole::User),
            GenericMessage::tool_call_request(vec![call.clone(), second]),
            GenericMessage::tool_result("Pier 80 lease", &call),
            nameless_result,
        ])
        .with_tools(vec![GenericFunctionSpec {
            name: "agenda_item".into(),
            description: "Look up an agenda item".into(),
            parameters: json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "additionalProperties": false,
                "properties": {"file_number": {"type": "string"}}
            }),
        }]);

        let request = to_request(params, None);
        assert!(request.generation_config.is_none());
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[1].role, Some(Role::Model));
        assert_eq!(request.contents[1].parts.len(), 2);

        let answers = &request.contents[2];
        assert_eq!(answers.role, Some(Role::User));
        let names: Vec<_> = answers
            .parts
            .iter()
            .map(|p| p.function_response.as_ref().unwrap().name.as_str())
            .collect();
        assert_eq!(names, ["agenda_item", "roll_call"]);

        let wire = serde_json::to_value(&request).unwrap();
        let params = &wire["tools"][0]["functionDeclarations"][0]["parameters"];
        assert_eq!(params, &json!({"type": "object", "properties": {"file_number": {"type": "string"}}}));
    }

    #[test]
    fn property_names_survive_schema_stripping() {
        let stripped = strip_unsupported(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "definitions": {"type": "string", "additionalProperties": false},
                "additionalProperties": {
                    "type": "array",
                    "items": {"type": "object", "$schema": "x", "properties": {"$schema": {"type": "string"}}}
                },
                "mode": {"type": "string", "enum": ["definitions", "additionalProperties"]}
            },
            "required": ["definitions"]
        }));

        assert_eq!(
            stripped,
            json!({
                "type": "object",
                "properties": {
                    "definitions": {"type": "string"},
                    "additionalProperties": {
                        "type": "array",
                        "items": {"type": "object", "properties": {"$schema": {"type": "string"}}}
                    },
                    "mode": {"type": "string", "enum": ["definitions", "additionalProperties"]}
                },
                "required": ["definitions"]
            })
        );
    }

    #[test]
    fn text_parts_are_joined_and_thoughts_skipped() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "finishReason": "STOP",
                "content": {"role": "model", "parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "```json\n{\"name\": "},
                    {"text": "\"x\"}\n```"}
                ]}
            }],
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 5}
        }))
        .unwrap();

        let generic = from_response(response).unwrap();
        let ResponseContent::Finished(message) = generic.content else {
            panic!("expected text");
        };
        assert_eq!(message.text(), "```json\n{\"name\": \"x\"}\n```");
        assert_eq!(generic.usage.unwrap().total_tokens, 12);
    }

    #[test]
    fn function_calls_get_synthesized_ids() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "finishReason": "STOP",
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "agenda_item", "args": {"file_number": "250652"}}}
                ]}
            }]
        }))
        .unwrap();

        let ResponseContent::ToolCalls(message) = from_response(response).unwrap().content else {
            panic!("expected tool calls");
        };
        let calls = message.tool_calls.unwrap();
        assert_eq!(calls[0].id, "call_0");
        assert_eq!(calls[0].function.arguments, json!({"file_number": "250652"}));
    }

    #[test]
    fn blocked_prompts_surface_the_reason() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert!(matches!(from_response(response), Err(GeminiError::Blocked(reason)) if reason == "SAFETY"));

        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "RECITATION"}]
        }))
        .unwrap();
        assert!(matches!(from_response(response), Err(GeminiError::Blocked(_))));
    }
}
