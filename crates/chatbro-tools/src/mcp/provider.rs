//! Tool provider backed by an MCP server

use super::bridge::McpToolBridge;
use super::client::McpHttpClient;
use crate::error::Result;
use crate::provider::ToolProvider;
use crate::registry::Tool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Lists an MCP server's tools once and serves the cached list afterwards
pub struct McpToolProvider {
    client: Arc<McpHttpClient>,
    cached: Mutex<Option<Vec<Arc<dyn Tool>>>>,
}

impl McpToolProvider {
    /// Create a provider for the server at `endpoint`
    ///
    /// # Errors
    /// Returns error if the endpoint URL is invalid
    pub fn connect(name: impl Into<String>, endpoint: &str) -> Result<Self> {
        let client = McpHttpClient::new(name, endpoint)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Create a provider over an existing client
    #[must_use]
    pub fn new(client: Arc<McpHttpClient>) -> Self {
        Self {
            client,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl ToolProvider for McpToolProvider {
    fn name(&self) -> &str {
        self.client.name()
    }

    async fn list_tools(&self) -> Result<Vec<Arc<dyn Tool>>> {
        let mut cached = self.cached.lock().await;
        if let Some(tools) = cached.as_ref() {
            return Ok(tools.clone());
        }

        let tools: Vec<Arc<dyn Tool>> = self
            .client
            .list_tools()
            .await?
            .iter()
            .map(|tool| Arc::new(McpToolBridge::new(tool, self.client.clone())) as Arc<dyn Tool>)
            .collect();

        info!(
            server = %self.client.name(),
            count = tools.len(),
            "Retrieved and cached MCP tools"
        );
        *cached = Some(tools.clone());
        Ok(tools)
    }
}
