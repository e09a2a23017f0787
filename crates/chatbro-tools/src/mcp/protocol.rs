//! JSON-RPC 2.0 messages exchanged with an MCP server
//!
//! Only the subset needed to list and call tools is modelled. Unknown fields
//! are ignored and unknown content kinds are kept but carry no text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Protocol revision sent in `initialize`
pub const PROTOCOL_VERSION: &str = "2025-03-26";

const JSONRPC_VERSION: &str = "2.0";

/// MCP failure
#[derive(Debug, Error)]
pub enum McpError {
    /// Connection failure or non-success HTTP status
    #[error("mcp transport: {0}")]
    Transport(String),

    /// Body that is not the JSON-RPC we expected
    #[error("mcp protocol: {0}")]
    Protocol(String),

    /// JSON-RPC error object returned by the server
    #[error("mcp server error {code}: {message}")]
    Server { code: i64, message: String },
}

impl From<McpError> for crate::Error {
    fn from(e: McpError) -> Self {
        match e {
            McpError::Transport(msg) => crate::Error::Network(msg),
            other => crate::Error::Protocol(other.to_string()),
        }
    }
}

/// Result alias for MCP calls
pub type McpResult<T> = std::result::Result<T, McpError>;

/// Outgoing request; a notification when `id` is `None`
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    jsonrpc: &'static str,
    /// Method name, e.g. `tools/list`
    pub method: String,
    /// Correlation id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Method parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// Request expecting a response with the same `id`
    pub fn call(method: impl Into<String>, id: u64, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: method.into(),
            id: Some(id),
            params: Some(params),
        }
    }

    /// Fire-and-forget notification
    pub fn notify(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: method.into(),
            id: None,
            params: None,
        }
    }
}

/// Incoming response (or a server-initiated message without result)
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    /// Correlation id
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// True when this message answers request `id`
    pub fn answers(&self, id: Option<u64>) -> bool {
        self.id == id && (self.result.is_some() || self.error.is_some())
    }

    /// The result, or the error object as `McpError::Server`
    pub fn into_result(self) -> McpResult<Value> {
        match self.error {
            Some(error) => Err(McpError::Server {
                code: error.code,
                message: error.message,
            }),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Tool advertised by `tools/list`
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON schema of the arguments
    #[serde(default = "empty_object_schema", rename = "inputSchema")]
    pub input_schema: Value,
}

fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

impl RemoteTool {
    /// Definition under which the tool is offered to the model
    pub fn definition(&self) -> crate::ToolDefinition {
        crate::ToolDefinition::new(&self.name, &self.description)
            .with_parameters(self.input_schema.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ToolsPage {
    #[serde(default)]
    pub tools: Vec<RemoteTool>,
}

/// `tools/call` result
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<ContentItem>,
    /// Set when the tool itself reports failure
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl CallToolResult {
    /// Every textual part, one per line
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentItem::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One part of a tool result
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    /// `text`, `image`, `resource`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub resource: Option<EmbeddedResource>,
}

impl ContentItem {
    /// Text carried by this part, directly or through an embedded resource
    pub fn as_text(&self) -> Option<&str> {
        match self.kind.as_str() {
            "text" => self.text.as_deref(),
            "resource" => self.resource.as_ref().and_then(|r| r.text.as_deref()),
            _ => None,
        }
    }
}

/// Resource inlined in a tool result
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedResource {
    pub uri: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// `initialize` result
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(default, rename = "serverInfo")]
    pub server_info: Option<Implementation>,
}

/// Name and version of an MCP peer
#[derive(Debug, Clone, Deserialize)]
pub struct Implementation {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}
