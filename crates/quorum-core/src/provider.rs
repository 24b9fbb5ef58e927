//! The one capability every provider adapter implements.
//!
//! All provider SDKs are treated alike: given rendered chat messages (and
//! optionally a set of tools), produce the model's answer.  The trait is
//! intentionally minimal:
//!
//! * [`ChatClient::model`] – which [`ModelId`] this client is bound to.
//! * [`ChatClient::chat_complete`] – a *single* non-streaming round-trip.
//! * [`ChatClient::invoke`] – convenience wrapper returning plain text.
//!
//! Methods return a [`BoxFuture`] so the trait stays object-safe without
//! pulling in `async_trait`; the registry hands out `Box<dyn ChatClient>`.
use futures_core::future::BoxFuture;

use crate::{
    error::{QuorumError, Result},
    generic::{GenericChatCompletionResponse, GenericFunctionSpec, GenericMessage, ResponseContent},
    model::ModelId,
};

pub trait ChatClient: Send + Sync {
    /// The model every request of this client goes to.
    fn model(&self) -> ModelId;

    /// Execute one chat round-trip.
    fn chat_complete<'a>(
        &'a self,
        params: ChatCompleteParameters,
    ) -> BoxFuture<'a, Result<GenericChatCompletionResponse>>;

    /// Send `messages` without tools and return the answer text.
    ///
    /// A tool-call response is reported as [`QuorumError::Internal`]
    /// because no tools were offered.
    fn invoke<'a>(&'a self, messages: Vec<GenericMessage>) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let response = self
                .chat_complete(ChatCompleteParameters::new(messages))
                .await?;

            match response.content {
                ResponseContent::Finished(message) => Ok(message.content.unwrap_or_default()),
                ResponseContent::ToolCalls(_) => Err(QuorumError::Internal(format!(
                    "model `{}` requested tool calls although no tools were offered",
                    self.model()
                ))),
            }
        })
    }
}

/// Input of a single [`ChatClient::chat_complete`] call.
#[derive(Debug, Clone)]
pub struct ChatCompleteParameters {
    pub messages: Vec<GenericMessage>,
    pub tools: Option<Vec<GenericFunctionSpec>>,
}

impl ChatCompleteParameters {
    pub fn new(messages: Vec<GenericMessage>) -> Self {
        Self {
            messages,
            tools: None,
        }
    }

    pub fn messages(&self) -> &[GenericMessage] {
        &self.messages
    }

    pub fn tools(&self) -> Option<&Vec<GenericFunctionSpec>> {
        self.tools.as_ref()
    }

    /// Attach tools; an empty list is treated as "no tools".
    pub fn with_tools(mut self, tools: Vec<GenericFunctionSpec>) -> Self {
        self.tools = (!tools.is_empty()).then_some(tools);
        self
    }
}
