//! Tool trait and per-agent tool registry
//!
//! A registry keeps tools in registration order, so an agent always offers
//! the model the same list in the same order. Registering a name twice
//! replaces the earlier tool in place.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Name, description and argument schema of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

impl ToolDefinition {
    /// Definition taking no arguments
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// The same definition in chat-backend form
    #[must_use]
    pub fn to_llm(&self) -> chatbro_llm::ToolDefinition {
        chatbro_llm::ToolDefinition::new(&self.name, &self.description, self.parameters.clone())
    }
}

/// Outcome of one tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    /// Payload on success, `Null` on failure
    pub output: Value,
    /// Reason on failure
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl ToolResult {
    #[must_use]
    pub fn success(output: Value, duration_ms: u64) -> Self {
        Self {
            success: true,
            output,
            error: None,
            duration_ms,
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            output: Value::Null,
            error: Some(error.into()),
            duration_ms,
        }
    }

    /// Text of the tool message fed back to the model
    ///
    /// String payloads are passed through verbatim; failures become
    /// `{"error": "..."}`.
    #[must_use]
    pub fn to_model_content(&self) -> String {
        match (&self.output, self.success) {
            (Value::String(text), true) => text.clone(),
            (other, true) => other.to_string(),
            (_, false) => serde_json::json!({
                "error": self.error.as_deref().unwrap_or("tool failed without a reason")
            })
            .to_string(),
        }
    }
}

/// Something an agent can call
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    /// Run with a JSON-object argument
    async fn execute(&self, input: Value) -> Result<ToolResult>;
}

/// Ordered, name-indexed set of tools
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing a same-named one at its original position
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name.clone();
        debug!(tool = %name, "Registering tool");
        match self.index.get(&name) {
            Some(&slot) => self.tools[slot] = tool,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn extend(&mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) {
        tools.into_iter().for_each(|tool| self.register(tool));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| self.tools[slot].clone())
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names in registration order
    #[must_use]
    pub fn list_names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .map(|tool| tool.definition().name.as_str())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions in registration order, ready for a completion request
    #[must_use]
    pub fn to_llm_tools(&self) -> Vec<chatbro_llm::ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| tool.definition().to_llm())
            .collect()
    }

    /// Run the tool called `name`
    ///
    /// # Errors
    /// `NotFound` for unknown names, `InvalidInput` when `input` is not an
    /// object, otherwise whatever the tool returns
    pub async fn execute(&self, name: &str, input: Value) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        if !input.is_object() {
            return Err(Error::InvalidInput(format!(
                "arguments for '{name}' must be a JSON object"
            )));
        }
        tool.execute(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool {
        definition: ToolDefinition,
    }

    impl EchoTool {
        fn named(name: &str, description: &str) -> Arc<dyn Tool> {
            Arc::new(Self {
                definition: ToolDefinition::new(name, description),
            })
        }
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, input: Value) -> Result<ToolResult> {
            Ok(ToolResult::success(input, 0))
        }
    }

    #[test]
    fn test_model_content() {
        let object = ToolResult::success(json!({"menu": ["soup"]}), 12);
        assert_eq!(object.to_model_content(), r#"{"menu":["soup"]}"#);

        let text = ToolResult::success(json!("plain"), 1);
        assert_eq!(text.to_model_content(), "plain");

        let failure = ToolResult::failure("upstream down", 5);
        assert_eq!(failure.to_model_content(), r#"{"error":"upstream down"}"#);
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.extend([
            EchoTool::named("b", "first b"),
            EchoTool::named("a", "a"),
            EchoTool::named("b", "second b"),
        ]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list_names(), ["b", "a"]);
        let definitions = registry.to_llm_tools();
        assert_eq!(definitions[0].description, "second b");
        assert_eq!(definitions[1].name, "a");
    }

    #[tokio::test]
    async fn test_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::named("echo", "echo"));

        let result = registry.execute("echo", json!({"x": 1})).await.unwrap();
        assert_eq!(result.output["x"], 1);

        let missing = registry.execute("nope", json!({})).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));

        let invalid = registry.execute("echo", json!("text")).await;
        assert!(matches!(invalid, Err(Error::InvalidInput(_))));
    }
}
