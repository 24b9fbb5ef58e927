#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures_core::future::BoxFuture;
use quorum_core::{
    ChatClient, ModelId, ModelRegistry, QuorumError, Result,
    generic::{
        GenericChatCompletionResponse, GenericFunctionCall, GenericFunctionCallIntent,
        GenericMessage, GenericRole, ResponseContent,
    },
    provider::ChatCompleteParameters,
};

/// How a stub client answers.
#[derive(Clone)]
pub enum Behaviour {
    /// Reply `"<model> says: <last user message>"`, wrapped in quotes.
    Echo,
    /// Always reply with this text.
    Fixed(String),
    /// Fail every invocation.
    Fail(String),
    /// Sleep before echoing.
    Slow(Duration),
    /// Panic inside the invocation.
    Panic,
    /// Block the executing thread, then echo.
    Blocking(Duration),
    /// Request one call of the named tool, then echo the tool result.
    CallTool(String),
}

pub struct StubClient {
    pub model: ModelId,
    pub behaviour: Behaviour,
    pub calls: Arc<Mutex<Vec<ChatCompleteParameters>>>,
}

impl ChatClient for StubClient {
    fn model(&self) -> ModelId {
        self.model
    }

    fn chat_complete<'a>(
        &'a self,
        params: ChatCompleteParameters,
    ) -> BoxFuture<'a, Result<GenericChatCompletionResponse>> {
        self.calls.lock().unwrap().push(params.clone());
        let behaviour = self.behaviour.clone();
        let model = self.model;

        Box::pin(async move {
            let last = params.messages.last().cloned();
            let content = match behaviour {
                Behaviour::Echo => finished(format!("\"{model} says: {}\"", last_user_text(&params))),
                Behaviour::Fixed(text) => finished(text),
                Behaviour::Fail(message) => {
                    return Err(QuorumError::provider(std::io::Error::other(message)));
                }
                Behaviour::Slow(delay) => {
                    tokio::time::sleep(delay).await;
                    finished(format!("{model} says: {}", last_user_text(&params)))
                }
                Behaviour::Panic => panic!("stub client for {model} exploded"),
                Behaviour::Blocking(delay) => {
                    std::thread::sleep(delay);
                    finished(format!("{model} says: {}", last_user_text(&params)))
                }
                Behaviour::CallTool(tool) => match last {
                    Some(message) if message.role == GenericRole::Tool => {
                        finished(format!("tool said {}", message.text()))
                    }
                    _ => ResponseContent::ToolCalls(GenericMessage::tool_call_request(vec![
                        GenericFunctionCallIntent {
                            id: "call-1".into(),
                            function: GenericFunctionCall {
                                name: tool,
                                arguments: serde_json::json!({"file_number": "250652"}),
                            },
                        },
                    ])),
                },
            };

            Ok(GenericChatCompletionResponse {
                content,
                usage: None,
            })
        })
    }
}

fn finished(text: String) -> ResponseContent {
    ResponseContent::Finished(GenericMessage::new(text, GenericRole::Assistant))
}

fn last_user_text(params: &ChatCompleteParameters) -> String {
    params
        .messages
        .iter()
        .rev()
        .find(|m| m.role == GenericRole::User)
        .map(|m| m.text().to_string())
        .unwrap_or_default()
}

/// Registry whose constructors hand out stub clients. Models listed in
/// `broken` fail in their constructor instead.
pub struct StubRegistry {
    pub registry: ModelRegistry,
    pub calls: Arc<Mutex<Vec<ChatCompleteParameters>>>,
}

pub fn stub_registry(behaviours: &[(ModelId, Behaviour)], broken: &[ModelId]) -> StubRegistry {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ModelRegistry::new();

    for (model, behaviour) in behaviours.iter().cloned() {
        let calls = Arc::clone(&calls);
        registry = registry.register(model, move |model, _params| {
            Ok(Box::new(StubClient {
                model,
                behaviour: behaviour.clone(),
                calls: Arc::clone(&calls),
            }) as Box<dyn ChatClient>)
        });
    }

    for model in broken.iter().copied() {
        registry = registry.register(model, |model, _params| {
            Err(QuorumError::Configuration(format!(
                "missing credentials for {model}"
            )))
        });
    }

    StubRegistry { registry, calls }
}
