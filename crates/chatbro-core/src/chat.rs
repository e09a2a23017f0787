//! Chat service
//!
//! Entry point used by channels: one orchestrator turn per incoming message,
//! with every domain agent attached as a tool, and an explicit reset that
//! forgets everything the agents know about a user.

use crate::catalog::AgentProvider;
use crate::error::{Error, Result};
use crate::store::SessionStore;
use crate::tooling::{DomainTooling, DomainToolingBuilder, SESSION_KEY_SEPARATOR};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Façade over the agent catalog, domain tooling and session store
#[derive(Clone)]
pub struct ChatService {
    agents: Arc<dyn AgentProvider>,
    store: SessionStore,
    tooling: DomainToolingBuilder,
}

impl ChatService {
    /// Create a chat service
    pub fn new(agents: Arc<dyn AgentProvider>, store: SessionStore) -> Self {
        let tooling = DomainToolingBuilder::new(agents.clone(), store.clone());
        Self {
            agents,
            store,
            tooling,
        }
    }

    /// Answer `message` from `user_key`.
    ///
    /// Sessions are saved on a best-effort basis: a failed save is logged
    /// and never affects the returned text. Domain sessions are saved even
    /// when the orchestrator turn fails, since a domain agent may already
    /// have run.
    ///
    /// # Errors
    /// Returns error for an invalid user key, an unavailable catalog, a
    /// failed turn or an empty answer
    #[tracing::instrument(skip(self, message, cancel))]
    pub async fn respond(
        &self,
        message: &str,
        user_key: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        validate_user_key(user_key)?;

        let orchestrator = self.agents.orchestrator().await?;
        let mut session = self.store.get(user_key, orchestrator.as_ref(), cancel).await;
        let tooling = self.tooling.create(user_key, cancel).await?;

        info!(history = session.message_count(), "Sending chat request");
        let outcome = orchestrator
            .run(&mut session, message, &tooling.tools, cancel)
            .await
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(Error::EmptyResponse {
                        agent: orchestrator.name().to_string(),
                    })
                } else {
                    Ok(text)
                }
            });

        if outcome.is_ok() {
            self.store
                .try_save(user_key, orchestrator.as_ref(), &session, cancel)
                .await;
        }
        self.persist_domains(&tooling, cancel).await;

        match &outcome {
            Ok(text) => info!(chars = text.len(), "Received chat response"),
            Err(e) => warn!(error = %e, "Chat turn failed"),
        }
        outcome
    }

    /// Forget the orchestrator and every domain session of `user_key`.
    ///
    /// Returns true if anything was deleted.
    ///
    /// # Errors
    /// Returns the first deletion failure; all deletions are attempted
    #[tracing::instrument(skip(self, cancel))]
    pub async fn reset(&self, user_key: &str, cancel: &CancellationToken) -> Result<bool> {
        validate_user_key(user_key)?;
        info!("Resetting chat sessions");

        let orchestrator = self.store.must_delete(user_key, cancel).await;
        let domains = self.tooling.reset(user_key, cancel).await;

        let orchestrator_deleted = orchestrator?;
        let domains_deleted = domains?;
        Ok(orchestrator_deleted || domains_deleted)
    }

    async fn persist_domains(&self, tooling: &DomainTooling, cancel: &CancellationToken) {
        for handle in &tooling.sessions {
            let session = handle.session.lock().await;
            self.store
                .try_save(&handle.key, handle.agent.as_ref(), &session, cancel)
                .await;
        }
    }
}

/// User keys are non-empty and never contain the session key separator
fn validate_user_key(user_key: &str) -> Result<()> {
    if user_key.trim().is_empty() {
        return Err(Error::InvalidUserKey("user key is empty".to_string()));
    }
    if user_key.contains(SESSION_KEY_SEPARATOR) {
        return Err(Error::InvalidUserKey(format!(
            "user key '{}' contains '{}'",
            user_key, SESSION_KEY_SEPARATOR
        )));
    }
    Ok(())
}
