//! Chat-completion client seam.
//!
//! `LlmClient` is the trait the dispatcher talks to; `OpenAiChatClient`
//! implements it against any OpenAI-compatible `/chat/completions` endpoint
//! (hosted OpenAI or a local Ollama in compatibility mode).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use medibot_core::config::LlmConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One tool invocation requested by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    /// Set on Tool-role observations, echoing the call being answered.
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: Some(content.into()), tool_calls: Vec::new(), tool_call_id: None }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: Some(content.into()), tool_calls: Vec::new(), tool_call_id: None }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self { role: Role::Assistant, content: None, tool_calls, tool_call_id: None }
    }

    pub fn observation(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// What a tool looks like to the model: a name, a purpose, and a JSON
/// schema for its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("llm endpoint returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("llm response was malformed: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the conversation and the tool surface; receive the next
    /// assistant turn (text, tool calls, or both).
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
    ) -> Result<ChatMessage, LlmError>;
}

pub struct OpenAiChatClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl OpenAiChatClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn request_body(&self, messages: &[ChatMessage], tools: &[ToolSchema]) -> Value {
        let wire_messages: Vec<Value> = messages.iter().map(message_to_wire).collect();
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": wire_messages,
        });
        if !tools.is_empty() {
            let wire_tools: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(wire_tools);
        }
        body
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
    ) -> Result<ChatMessage, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(messages, tools);

        let mut request = self.http.post(&url).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                event_name = "agent.llm.api_error",
                status,
                "llm endpoint returned an error"
            );
            return Err(LlmError::Api { status, body });
        }

        let payload: Value = response.json().await?;
        parse_completion(&payload)
    }
}

fn message_to_wire(message: &ChatMessage) -> Value {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };
    let mut wire = serde_json::json!({ "role": role });
    if let Some(content) = &message.content {
        wire["content"] = Value::String(content.clone());
    }
    if let Some(tool_call_id) = &message.tool_call_id {
        wire["tool_call_id"] = Value::String(tool_call_id.clone());
    }
    if !message.tool_calls.is_empty() {
        let calls: Vec<Value> = message
            .tool_calls
            .iter()
            .map(|call| {
                serde_json::json!({
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        // OpenAI carries arguments as a JSON-encoded string.
                        "arguments": call.arguments.to_string(),
                    }
                })
            })
            .collect();
        wire["tool_calls"] = Value::Array(calls);
    }
    wire
}

fn parse_completion(payload: &Value) -> Result<ChatMessage, LlmError> {
    let message = payload
        .pointer("/choices/0/message")
        .ok_or_else(|| LlmError::MalformedResponse("missing choices[0].message".to_string()))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    let mut tool_calls = Vec::new();
    if let Some(raw_calls) = message.get("tool_calls").and_then(Value::as_array) {
        for raw in raw_calls {
            let id = raw
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| LlmError::MalformedResponse("tool call missing id".to_string()))?
                .to_string();
            let name = raw
                .pointer("/function/name")
                .and_then(Value::as_str)
                .ok_or_else(|| LlmError::MalformedResponse("tool call missing name".to_string()))?
                .to_string();
            let raw_arguments = raw
                .pointer("/function/arguments")
                .and_then(Value::as_str)
                .unwrap_or("{}");
            let arguments = serde_json::from_str(raw_arguments)
                .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
            tool_calls.push(ToolCall { id, name, arguments });
        }
    }

    Ok(ChatMessage { role: Role::Assistant, content, tool_calls, tool_call_id: None })
}
