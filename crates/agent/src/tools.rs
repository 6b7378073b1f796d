//! The tool trait and registry the dispatcher executes against.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use medibot_core::errors::ToolFailure;

use crate::llm::ToolSchema;

/// What a tool hands back on success: plain text for the model to relay,
/// or structured data it should summarize.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolReply {
    Text(String),
    Structured(Value),
}

pub type ToolOutcome = Result<ToolReply, ToolFailure>;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON schema for the tool's arguments object.
    fn parameters(&self) -> Value;
    async fn execute(&self, arguments: Value) -> ToolOutcome;
}

/// Name-keyed tool set. Every outcome, success or failure, is rendered to an
/// observation string before it goes back into the conversation.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .values()
            .map(|tool| ToolSchema {
                name: tool.name(),
                description: tool.description(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    /// Run one tool call and render its observation.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> String {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!(event_name = "agent.tool.unknown", tool = name, "unknown tool requested");
            return format!("Error: unknown tool `{name}`.");
        };

        match tool.execute(arguments).await {
            Ok(ToolReply::Text(text)) => text,
            Ok(ToolReply::Structured(value)) => value.to_string(),
            Err(failure) => {
                tracing::info!(
                    event_name = "agent.tool.failed",
                    tool = name,
                    kind = ?failure.kind,
                    "tool reported a failure"
                );
                failure.detail
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use medibot_core::errors::ToolFailure;

    use super::{Tool, ToolOutcome, ToolRegistry, ToolReply};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echoes its input back."
        }

        fn parameters(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }

        async fn execute(&self, arguments: Value) -> ToolOutcome {
            if arguments.get("fail").is_some() {
                return Err(ToolFailure::validation("Echo refused."));
            }
            Ok(ToolReply::Structured(arguments))
        }
    }

    #[tokio::test]
    async fn dispatch_renders_success_failure_and_unknown() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert_eq!(registry.len(), 1);

        let ok = registry.dispatch("echo", json!({"a": 1})).await;
        assert_eq!(ok, "{\"a\":1}");

        let failed = registry.dispatch("echo", json!({"fail": true})).await;
        assert_eq!(failed, "Echo refused.");

        let unknown = registry.dispatch("missing", json!({})).await;
        assert!(unknown.contains("unknown tool"));
    }

    #[test]
    fn schemas_expose_registered_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let schemas = registry.schemas();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].name, "echo");
        assert!(schemas[0].parameters.is_object());
    }
}
