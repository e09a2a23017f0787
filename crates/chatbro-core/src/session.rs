//! Agent sessions
//!
//! A session is one agent's memory of one user: the model-visible history
//! plus auxiliary state owned by the agent's context provider. Only the
//! owning agent interprets the stored bytes; the store treats them as opaque.

use crate::error::{Error, Result};
use chatbro_llm::Message;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current envelope version
const SESSION_FORMAT_VERSION: u32 = 1;

/// Conversation memory of one agent with one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSession {
    /// Session id, for logs
    pub id: Uuid,
    /// Conversation history, without injected context
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Provider-local auxiliary state
    #[serde(default)]
    pub state: serde_json::Map<String, serde_json::Value>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Default for AgentSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentSession {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            state: serde_json::Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True if nothing has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.state.is_empty()
    }

    /// Number of messages in the history
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Read a typed state entry; absent or malformed entries read as `None`
    #[must_use]
    pub fn state_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.state
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Write a typed state entry
    ///
    /// # Errors
    /// Returns error if the value cannot be represented as JSON
    pub fn set_state_value<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.state
            .insert(key.to_string(), serde_json::to_value(value)?);
        self.touch();
        Ok(())
    }

    /// Mark the session as modified
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    owner: &'a str,
    version: u32,
    #[serde(flatten)]
    session: &'a AgentSession,
}

#[derive(Deserialize)]
struct Envelope {
    owner: String,
    version: u32,
    #[serde(flatten)]
    session: AgentSession,
}

/// Serialize `session` on behalf of `owner`
///
/// # Errors
/// Returns error if the session cannot be encoded
pub fn encode_session(owner: &str, session: &AgentSession) -> Result<Vec<u8>> {
    let envelope = EnvelopeRef {
        owner,
        version: SESSION_FORMAT_VERSION,
        session,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Deserialize a blob previously written for `owner`
///
/// # Errors
/// Returns error on malformed bytes, an unknown version, or a blob owned by
/// another agent
pub fn decode_session(owner: &str, bytes: &[u8]) -> Result<AgentSession> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    if envelope.version != SESSION_FORMAT_VERSION {
        return Err(Error::Serialization(format!(
            "unsupported session version {}",
            envelope.version
        )));
    }
    if envelope.owner != owner {
        return Err(Error::Serialization(format!(
            "session belongs to '{}', not '{}'",
            envelope.owner, owner
        )));
    }
    Ok(envelope.session)
}

/// Agents that can (de)serialize their own sessions
pub trait SessionCodec: Send + Sync {
    /// Stable owner id written into every blob
    fn owner(&self) -> &str;

    /// Serialize a session for storage
    fn serialize_session(&self, session: &AgentSession) -> Result<Vec<u8>> {
        encode_session(self.owner(), session)
    }

    /// Restore a session from storage
    fn deserialize_session(&self, bytes: &[u8]) -> Result<AgentSession> {
        decode_session(self.owner(), bytes)
    }
}
