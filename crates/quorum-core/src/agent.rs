//! The tool-calling agent loop.
//!
//! ```text
//!  render(template, scratchpad) ──► chat_complete(tools) ──► Finished ──► answer
//!            ▲                               │
//!            │                           ToolCalls
//!            └──── scratchpad += call + tool results ◄──┘
//! ```
//!
//! Every iteration renders the task template with the scratchpad so far
//! injected at the [`AGENT_SCRATCHPAD`] placeholder, offers the tools, and
//! either returns the model's final text or runs the requested tools.  A
//! tool name the model invents is answered with an observation listing the
//! valid tools, giving the model a chance to correct itself.
use std::sync::Arc;

use crate::{
    error::{QuorumError, Result},
    generic::{GenericFunctionCallIntent, GenericFunctionSpec, GenericMessage, ResponseContent},
    provider::{ChatClient, ChatCompleteParameters},
    template::{ChatPromptTemplate, Metadata, Placeholders, AGENT_SCRATCHPAD},
    tool::Tool,
};

pub const DEFAULT_MAX_ITERATIONS: usize = 15;

pub struct ToolAgent<'a> {
    client: &'a dyn ChatClient,
    tools: &'a [Arc<dyn Tool>],
    max_iterations: usize,
}

impl<'a> ToolAgent<'a> {
    pub fn new(client: &'a dyn ChatClient, tools: &'a [Arc<dyn Tool>]) -> Self {
        Self {
            client,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Drive the loop until the model produces a final answer.
    ///
    /// # Errors
    ///
    /// * [`QuorumError::AgentIterationLimit`] – no final answer in time.
    /// * any error of the client or of a tool.
    pub async fn run(&self, template: &ChatPromptTemplate, metadata: &Metadata) -> Result<String> {
        let specs: Vec<GenericFunctionSpec> = self.tools.iter().map(|t| t.spec()).collect();
        let mut scratchpad: Vec<GenericMessage> = Vec::new();

        for iteration in 1..=self.max_iterations {
            let mut placeholders = Placeholders::new();
            placeholders.insert(AGENT_SCRATCHPAD.to_string(), scratchpad.clone());
            let messages = template.render(metadata, &placeholders)?;

            let response = self
                .client
                .chat_complete(ChatCompleteParameters::new(messages).with_tools(specs.clone()))
                .await?;

            let request = match response.content {
                ResponseContent::Finished(message) => {
                    tracing::debug!(model = %self.client.model(), iteration, "agent finished");
                    return Ok(message.content.unwrap_or_default());
                }
                ResponseContent::ToolCalls(message) => message,
            };

            let calls = request.tool_calls.clone().unwrap_or_default();
            scratchpad.push(request);

            for call in &calls {
                let observation = self.dispatch(call, &specs).await?;
                scratchpad.push(GenericMessage::tool_result(observation, call));
            }
        }

        Err(QuorumError::AgentIterationLimit(self.max_iterations))
    }

    async fn dispatch(
        &self,
        call: &GenericFunctionCallIntent,
        specs: &[GenericFunctionSpec],
    ) -> Result<String> {
        let name = call.function.name.as_str();
        tracing::debug!(
            model = %self.client.model(),
            tool = name,
            arguments = %call.function.arguments,
            "invoking tool"
        );

        let Some(position) = specs.iter().position(|s| s.name == name) else {
            let valid: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
            tracing::warn!(model = %self.client.model(), tool = name, "model requested unknown tool");
            return Ok(format!(
                "{name} is not a valid tool, try one of [{}].",
                valid.join(", ")
            ));
        };

        self.tools[position]
            .call(call.function.arguments.clone())
            .await
            .map_err(|e| match e {
                err @ QuorumError::Tool { .. } => err,
                other => QuorumError::Tool {
                    name: name.to_string(),
                    message: other.to_string(),
                },
            })
    }
}
