//! The model/tools loop.
//!
//! One `run` call handles one user message: ask the model, execute any tool
//! calls it requests in the order it requested them, feed the observations
//! back, and repeat until the model answers in text. The round count is
//! bounded; when it runs out the loop gives up with a fixed reply instead of
//! spinning.

use std::sync::Arc;

use thiserror::Error;

use crate::llm::{ChatMessage, LlmClient, LlmError};
use crate::tools::ToolRegistry;

/// Returned when the model keeps calling tools past the round budget.
pub const GIVE_UP_REPLY: &str =
    "I was not able to complete that request. Please try again or rephrase it.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),
}

pub struct Dispatcher {
    llm: Arc<dyn LlmClient>,
    registry: ToolRegistry,
    system_prompt: String,
    max_rounds: u32,
}

impl Dispatcher {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        registry: ToolRegistry,
        system_prompt: impl Into<String>,
        max_rounds: u32,
    ) -> Self {
        Self { llm, registry, system_prompt: system_prompt.into(), max_rounds }
    }

    /// Run one conversation turn to completion.
    pub async fn run(&self, user_message: &str) -> Result<String, AgentError> {
        let schemas = self.registry.schemas();
        let mut messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(user_message),
        ];

        for round in 0..self.max_rounds {
            let reply = self.llm.chat(&messages, &schemas).await?;

            if reply.tool_calls.is_empty() {
                let answer = reply.content.unwrap_or_default();
                tracing::debug!(
                    event_name = "agent.turn.answered",
                    rounds = round + 1,
                    "model answered in text"
                );
                return Ok(answer);
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in calls {
                tracing::debug!(
                    event_name = "agent.turn.tool_call",
                    tool = %call.name,
                    round = round + 1,
                    "executing tool call"
                );
                let observation = self.registry.dispatch(&call.name, call.arguments).await;
                messages.push(ChatMessage::observation(call.id, observation));
            }
        }

        tracing::warn!(
            event_name = "agent.turn.gave_up",
            max_rounds = self.max_rounds,
            "round budget exhausted"
        );
        Ok(GIVE_UP_REPLY.to_string())
    }
}
