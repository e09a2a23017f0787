//! Session store
//!
//! Durable, TTL-bounded storage of one serialized session per key. The
//! backend only moves bytes; interpretation belongs to the owning agent
//! through [`SessionCodec`].
//!
//! Two persistence flavours are exposed:
//! - [`SessionStore::try_save`] is best-effort and never fails a reply
//! - [`SessionStore::must_delete`] propagates, since reset is destructive

mod backend;
mod memory;
mod redis_backend;

pub use backend::SessionBackend;
pub use memory::MemoryBackend;
pub use redis_backend::{RedisBackend, DEFAULT_KEY_PREFIX};

use crate::error::{Error, Result};
use crate::session::{AgentSession, SessionCodec};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default session TTL (7 days)
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// Session store façade over a [`SessionBackend`]
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store with the default TTL
    #[must_use]
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Set the TTL renewed on every save
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// TTL applied on save
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Backend name, for logs
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Load the session stored under `key`, interpreted by `codec`.
    ///
    /// Never fails: a miss, a corrupt or foreign blob, a backend error and
    /// cancellation all yield a fresh empty session.
    pub async fn get(
        &self,
        key: &str,
        codec: &dyn SessionCodec,
        cancel: &CancellationToken,
    ) -> AgentSession {
        let fetched = tokio::select! {
            () = cancel.cancelled() => {
                debug!(session_key = %key, "Session lookup cancelled");
                return AgentSession::new();
            }
            res = self.backend.get(key) => res,
        };

        match fetched {
            Ok(Some(bytes)) => match codec.deserialize_session(&bytes) {
                Ok(session) => {
                    debug!(
                        session_key = %key,
                        messages = session.message_count(),
                        "Session loaded"
                    );
                    session
                }
                Err(e) => {
                    warn!(session_key = %key, owner = %codec.owner(), error = %e, "Discarding unreadable session");
                    AgentSession::new()
                }
            },
            Ok(None) => {
                debug!(session_key = %key, "No stored session, starting fresh");
                AgentSession::new()
            }
            Err(e) => {
                warn!(session_key = %key, backend = %self.backend.name(), error = %e, "Session lookup failed, starting fresh");
                AgentSession::new()
            }
        }
    }

    /// Persist `session` under `key`, renewing its TTL.
    ///
    /// Failures are logged and reported as `false`. Cancellation is only
    /// honoured before the write is issued; an issued write is a single
    /// backend call that runs to completion.
    pub async fn try_save(
        &self,
        key: &str,
        codec: &dyn SessionCodec,
        session: &AgentSession,
        cancel: &CancellationToken,
    ) -> bool {
        if cancel.is_cancelled() {
            warn!(session_key = %key, "Save skipped, request cancelled");
            return false;
        }

        let bytes = match codec.serialize_session(session) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(session_key = %key, error = %e, "Failed to serialize session");
                return false;
            }
        };

        match self.backend.set_with_ttl(key, &bytes, self.ttl).await {
            Ok(()) => {
                debug!(
                    session_key = %key,
                    bytes = bytes.len(),
                    ttl_secs = self.ttl.as_secs(),
                    "Session saved"
                );
                true
            }
            Err(e) => {
                error!(session_key = %key, backend = %self.backend.name(), error = %e, "Failed to save session");
                false
            }
        }
    }

    /// Remove the session stored under `key`.
    ///
    /// Returns whether anything was removed.
    ///
    /// # Errors
    /// Returns [`Error::Cancelled`] if cancelled before the delete is issued,
    /// or the backend error otherwise
    pub async fn must_delete(&self, key: &str, cancel: &CancellationToken) -> Result<bool> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let deleted = self.backend.delete(key).await?;
        if deleted {
            info!(session_key = %key, "Session deleted");
        } else {
            debug!(session_key = %key, "No session to delete");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests;
