//! MCP Tool Bridge - wraps remote MCP tools as native `Tool` trait objects

use super::client::McpHttpClient;
use super::protocol::RemoteTool;
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A single MCP tool exposed through the native `Tool` trait.
pub struct McpToolBridge {
    definition: ToolDefinition,
    client: Arc<McpHttpClient>,
}

impl McpToolBridge {
    /// Create a new bridge for the given MCP tool.
    pub fn new(tool: &RemoteTool, client: Arc<McpHttpClient>) -> Self {
        Self {
            definition: tool.definition(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Tool for McpToolBridge {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();

        debug!(
            server = %self.client.name(),
            tool = %self.definition.name,
            "Calling MCP tool"
        );

        let mcp_result = self
            .client
            .call_tool(&self.definition.name, input)
            .await
            .map_err(|e| Error::Execution(format!("MCP call failed: {}", e)))?;

        let duration = start.elapsed().as_millis() as u64;
        let text = mcp_result.text();

        if mcp_result.is_error {
            Ok(ToolResult::failure(text, duration))
        } else {
            Ok(ToolResult::success(serde_json::Value::String(text), duration))
        }
    }
}
