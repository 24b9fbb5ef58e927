use std::sync::Arc;

use futures_core::future::BoxFuture;
use quorum_core::{
    error::Result,
    generic::{GenericChatCompletionResponse, GenericMessage, GenericUsageReport, ResponseContent},
    model::ModelId,
    provider::{ChatClient, ChatCompleteParameters},
};

use crate::{
    OpenAiAdapter,
    api_v1::{ChatCompletionRequest, ChatCompletionResponse, FinishReason},
    error::OpenAiError,
};

impl ChatClient for OpenAiAdapter {
    fn model(&self) -> ModelId {
        self.model
    }

    fn chat_complete<'a>(
        &'a self,
        params: ChatCompleteParameters,
    ) -> BoxFuture<'a, Result<GenericChatCompletionResponse>> {
        let client = Arc::clone(&self.client);
        let mut request = ChatCompletionRequest::from_parameters(self.model_name, params);
        request.temperature = self.temperature;

        Box::pin(async move {
            let response = client.chat_completion(request).await?;
            into_generic(response).map_err(Into::into)
        })
    }
}

fn into_generic(
    mut response: ChatCompletionResponse,
) -> std::result::Result<GenericChatCompletionResponse, OpenAiError> {
    let usage = response.usage.map(|usage| GenericUsageReport {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    });

    if response.choices.is_empty() {
        return Err(OpenAiError::Format("response has no choices".into()));
    }
    let first_choice = response.choices.swap_remove(0);
    let has_tool_calls = first_choice
        .message
        .tool_calls
        .as_ref()
        .is_some_and(|calls| !calls.is_empty());

    let content = match first_choice.finish_reason {
        Some(FinishReason::ToolCalls | FinishReason::FunctionCall) => {
            ResponseContent::ToolCalls(first_choice.message.into())
        }
        // Some compatible backends report `stop` next to tool calls.
        None | Some(FinishReason::Stop) if has_tool_calls => {
            ResponseContent::ToolCalls(first_choice.message.into())
        }
        None | Some(FinishReason::Stop) | Some(FinishReason::Length) => {
            let message: GenericMessage = first_choice.message.into();
            ResponseContent::Finished(message)
        }
        Some(FinishReason::ContentFilter) => {
            return Err(OpenAiError::Format(
                "answer withheld by the provider's content filter".into(),
            ));
        }
    };

    Ok(GenericChatCompletionResponse { content, usage })
}
