use super::SessionBackend;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Process-local session backend
///
/// Expired entries are invisible to reads and dropped lazily.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    /// True if no live entries remain
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether a live entry exists for `key`
    pub async fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|e| e.is_live(now))
    }

    /// Live keys, in no particular order
    pub async fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .iter()
            .filter(|(_, e)| e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| !e.is_live(Instant::now())) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| Error::Store(format!("session ttl {}s is out of range", ttl.as_secs())))?;
        let entry = Entry {
            value: value.to_vec(),
            expires_at,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .write()
            .await
            .remove(key)
            .is_some_and(|e| e.is_live(now)))
    }
}
