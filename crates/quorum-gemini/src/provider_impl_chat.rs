use std::sync::Arc;

use futures_core::future::BoxFuture;
use quorum_core::{
    error::Result,
    generic::GenericChatCompletionResponse,
    model::ModelId,
    provider::{ChatClient, ChatCompleteParameters},
};

use crate::{
    GeminiAdapter,
    convert::{from_response, to_request},
};

impl ChatClient for GeminiAdapter {
    fn model(&self) -> ModelId {
        self.model
    }

    fn chat_complete<'a>(
        &'a self,
        params: ChatCompleteParameters,
    ) -> BoxFuture<'a, Result<GenericChatCompletionResponse>> {
        let client = Arc::clone(&self.client);
        let request = to_request(params, self.temperature);
        let model = self.model.as_str();

        Box::pin(async move {
            let response = client.generate_content(model, &request).await?;
            from_response(response).map_err(Into::into)
        })
    }
}
