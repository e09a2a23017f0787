//! Domain agent descriptors

use crate::agent::Agent;
use std::sync::Arc;

/// A domain agent as the orchestrator sees it
///
/// Created once when the catalog is built and never modified.
#[derive(Debug, Clone)]
pub struct AgentDescriptor {
    /// Unique domain id, part of the session key
    pub key: String,
    /// Function name exposed to the orchestrator's model
    pub tool_name: String,
    /// Tool description shown to the orchestrator's model
    pub description: String,
    /// The domain agent
    pub agent: Arc<Agent>,
}

impl AgentDescriptor {
    /// Session key of this domain for `user_key`
    #[must_use]
    pub fn session_key(&self, user_key: &str) -> String {
        crate::tooling::domain_session_key(user_key, &self.key)
    }
}
