//! Tools the agent can call: web search and page reading.
//!
//! Every tool describes its parameters with a JSON schema that is handed to the
//! model's function-calling mechanism. Execution never panics or aborts the
//! agent: failures come back as a [`ToolError`], which the agent turns into an
//! `{"error": ...}` payload in the transcript.

pub mod html;
mod web;

pub use web::{PageContent, ReadPage, ReadPageArgs, WebSearch, WebSearchArgs};

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::LlmConfig;

/// Failure while executing a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Web search API call failed: {0}")]
    Upstream(String),

    #[error("Failed to fetch page: {0}")]
    Fetch(String),

    #[error("Failed to parse page: {0}")]
    Parse(String),
}

impl ToolError {
    /// The structured payload fed back to the model in place of a result.
    pub fn payload(&self) -> Value {
        let message = match self {
            ToolError::UnknownTool(_) => self.to_string(),
            other => format!("Tool execution failed: {}", other),
        };
        json!({ "error": message })
    }
}

/// A callable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used by the model to call the tool
    fn name(&self) -> &str;

    /// Description that tells the model when to use the tool
    fn description(&self) -> &str;

    /// JSON schema of the argument object
    fn parameters_schema(&self) -> Value;

    /// Execute with the model-supplied arguments.
    async fn execute(&self, args: Value) -> Result<Value, ToolError>;
}

/// Name and description of a registered tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Ordered set of tools; schema order follows registration order.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with the built-in `web_search` and `read_page` tools.
    pub fn new(llm: &LlmConfig, api_key: &str) -> Self {
        let mut registry = Self::empty();
        registry.register(WebSearch::new(
            &llm.search_url,
            api_key,
            llm.search_max_results,
        ));
        registry.register(ReadPage::new());
        registry
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool registered under the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(Arc::new(tool));
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Function-calling schemas in the chat-completions `tools` format.
    pub fn get_tool_schemas(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.parameters_schema(),
                    }
                })
            })
            .collect()
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(args).await
    }
}

/// Deserialize a tool's argument object into its typed form.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the arguments back"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, args: Value) -> Result<Value, ToolError> {
            Ok(args)
        }
    }

    fn builtin_registry() -> ToolRegistry {
        let config = crate::config::Config::new(":memory:".into());
        ToolRegistry::new(&config.llm, "sk-test")
    }

    #[test]
    fn builtin_schemas_require_their_arguments() {
        let schemas = builtin_registry().get_tool_schemas();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0]["function"]["name"], "web_search");
        assert_eq!(schemas[0]["function"]["parameters"]["required"], json!(["query"]));
        assert_eq!(schemas[1]["function"]["name"], "read_page");
        assert_eq!(schemas[1]["function"]["parameters"]["required"], json!(["url"]));
        assert!(schemas.iter().all(|s| s["type"] == "function"));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_not_a_panic() {
        let err = builtin_registry()
            .execute("launch_rockets", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: launch_rockets");
        assert_eq!(err.payload(), json!({"error": "Unknown tool: launch_rockets"}));
    }

    #[tokio::test]
    async fn registered_tool_is_dispatched_by_name() {
        let mut registry = ToolRegistry::empty();
        registry.register(Echo);
        let out = registry.execute("echo", json!({"x": 1})).await.unwrap();
        assert_eq!(out, json!({"x": 1}));
        assert_eq!(registry.list_tools()[0].name, "echo");
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = ToolRegistry::empty();
        registry.register(Echo);
        registry.register(Echo);
        assert_eq!(registry.list_tools().len(), 1);
    }

    #[test]
    fn execution_errors_are_prefixed_in_payload() {
        let payload = ToolError::Fetch("HTTP 404".to_string()).payload();
        assert_eq!(
            payload["error"],
            "Tool execution failed: Failed to fetch page: HTTP 404"
        );
    }
}
