//! Function-calling wire types shared with the tool crate

use serde::{Deserialize, Serialize};

/// Function the model may call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Function name, unique within one request
    pub name: String,
    /// What the function does, as shown to the model
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Call requested by the model
///
/// `arguments` is the raw JSON text the model produced; it is not guaranteed
/// to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlates the call with its tool-result message
    pub id: String,
    /// Function name
    pub name: String,
    /// Raw JSON arguments
    pub arguments: String,
}

impl ToolCall {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Arguments as a JSON object, `None` if they are not one
    #[must_use]
    pub fn arguments_object(&self) -> Option<serde_json::Value> {
        serde_json::from_str::<serde_json::Value>(&self.arguments)
            .ok()
            .filter(serde_json::Value::is_object)
    }
}
