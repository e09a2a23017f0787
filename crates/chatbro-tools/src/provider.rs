//! Tool providers - where a domain's tools come from
//!
//! A provider is asked once, while the agent catalog is built. Providers
//! backed by a remote service may fail; the caller decides how to degrade.

use crate::error::Result;
use crate::registry::Tool;
use std::sync::Arc;

/// Source of tools for one agent
#[async_trait::async_trait]
pub trait ToolProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// List the tools this provider offers
    async fn list_tools(&self) -> Result<Vec<Arc<dyn Tool>>>;
}

/// Provider over a fixed, in-process tool list
pub struct StaticToolProvider {
    name: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl StaticToolProvider {
    /// Create a provider serving `tools`
    #[must_use]
    pub fn new(name: impl Into<String>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            name: name.into(),
            tools,
        }
    }

    /// Provider with no tools
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

#[async_trait::async_trait]
impl ToolProvider for StaticToolProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> Result<Vec<Arc<dyn Tool>>> {
        Ok(self.tools.clone())
    }
}
