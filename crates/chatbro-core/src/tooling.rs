//! Per-turn domain tooling
//!
//! For every incoming message each domain agent is bound to the user's
//! domain session and wrapped as one tool the orchestrator can call.
//! Sessions of every domain are resolved each turn, whether or not the
//! orchestrator ends up calling that domain, and all of them are persisted
//! afterwards.

use crate::agent::Agent;
use crate::catalog::AgentProvider;
use crate::error::{Error, Result};
use crate::session::AgentSession;
use crate::store::SessionStore;
use async_trait::async_trait;
use chatbro_tools::{Tool, ToolDefinition, ToolResult};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Separator between user key and domain key
pub const SESSION_KEY_SEPARATOR: &str = "::";

/// Store key of a domain session.
///
/// User keys never contain `::` and domain keys never contain `:`, so the
/// pair can always be recovered from the key.
#[must_use]
pub fn domain_session_key(user_key: &str, domain_key: &str) -> String {
    format!("{}{}{}", user_key, SESSION_KEY_SEPARATOR, domain_key)
}

/// A domain session resolved for this turn
#[derive(Clone)]
pub struct DomainSessionHandle {
    /// Store key
    pub key: String,
    /// Owning domain agent
    pub agent: Arc<Agent>,
    /// Session, shared with the domain tool
    pub session: Arc<Mutex<AgentSession>>,
}

/// Domain tools and sessions for one turn of one user
pub struct DomainTooling {
    /// One tool per domain agent, in catalog order
    pub tools: Vec<Arc<dyn Tool>>,
    /// Sessions to persist after the turn
    pub sessions: Vec<DomainSessionHandle>,
}

/// Builds [`DomainTooling`] from the agent catalog
#[derive(Clone)]
pub struct DomainToolingBuilder {
    agents: Arc<dyn AgentProvider>,
    store: SessionStore,
}

impl DomainToolingBuilder {
    /// Create a builder
    pub fn new(agents: Arc<dyn AgentProvider>, store: SessionStore) -> Self {
        Self { agents, store }
    }

    /// Resolve every domain session of `user_key` and wrap each domain agent
    /// as a tool bound to it.
    ///
    /// A session that cannot be loaded is replaced by a fresh one.
    ///
    /// # Errors
    /// Returns error only if the agent catalog is unavailable
    pub async fn create(&self, user_key: &str, cancel: &CancellationToken) -> Result<DomainTooling> {
        let descriptors = self.agents.domain_agents().await?;

        let mut tools: Vec<Arc<dyn Tool>> = Vec::with_capacity(descriptors.len());
        let mut sessions = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors.iter() {
            let key = descriptor.session_key(user_key);
            let session = self
                .store
                .get(&key, descriptor.agent.as_ref(), cancel)
                .await;
            let session = Arc::new(Mutex::new(session));

            tools.push(Arc::new(DomainAgentTool {
                definition: domain_tool_definition(&descriptor.tool_name, &descriptor.description),
                agent: descriptor.agent.clone(),
                session: session.clone(),
                session_key: key.clone(),
                cancel: cancel.clone(),
            }));
            sessions.push(DomainSessionHandle {
                key,
                agent: descriptor.agent.clone(),
                session,
            });
        }

        debug!(user_key = %user_key, domains = sessions.len(), "Domain tooling created");
        Ok(DomainTooling { tools, sessions })
    }

    /// Delete every domain session of `user_key`.
    ///
    /// Every deletion is attempted; the first failure is returned after
    /// that. Returns true if at least one session was removed.
    ///
    /// # Errors
    /// Returns error if the catalog is unavailable or a deletion fails
    pub async fn reset(&self, user_key: &str, cancel: &CancellationToken) -> Result<bool> {
        let descriptors = self.agents.domain_agents().await?;

        let mut deleted_any = false;
        let mut first_error = None;
        for descriptor in descriptors.iter() {
            let key = descriptor.session_key(user_key);
            match self.store.must_delete(&key, cancel).await {
                Ok(deleted) => deleted_any |= deleted,
                Err(e) => {
                    warn!(session_key = %key, error = %e, "Failed to delete domain session");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(deleted_any),
        }
    }
}

fn domain_tool_definition(tool_name: &str, description: &str) -> ToolDefinition {
    ToolDefinition::new(tool_name, description).with_parameters(serde_json::json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The user's request, with any details the domain agent needs"
            }
        },
        "required": ["query"]
    }))
}

#[derive(Deserialize)]
struct DomainQuery {
    query: String,
}

/// A domain agent bound to one user's domain session
struct DomainAgentTool {
    definition: ToolDefinition,
    agent: Arc<Agent>,
    session: Arc<Mutex<AgentSession>>,
    session_key: String,
    cancel: CancellationToken,
}

#[async_trait]
impl Tool for DomainAgentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> chatbro_tools::Result<ToolResult> {
        let DomainQuery { query } = serde_json::from_value(input)
            .map_err(|e| chatbro_tools::Error::InvalidInput(e.to_string()))?;

        info!(domain = %self.agent.key(), session_key = %self.session_key, "Delegating to domain agent");
        let start = Instant::now();
        let mut session = self.session.lock().await;
        let result = self
            .agent
            .run(&mut session, &query, &[], &self.cancel)
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(text) => Ok(ToolResult::success(serde_json::Value::String(text), duration_ms)),
            Err(Error::Cancelled) => Err(chatbro_tools::Error::Execution(
                "request cancelled".to_string(),
            )),
            Err(e) => {
                warn!(domain = %self.agent.key(), error = %e, "Domain agent failed");
                Ok(ToolResult::failure(e.to_string(), duration_ms))
            }
        }
    }
}
