use super::SessionBackend;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Default key namespace
pub const DEFAULT_KEY_PREFIX: &str = "chatbro:session:";

/// Redis-backed session backend (for production)
///
/// Keys are namespaced with a prefix and expire through `SETEX`.
pub struct RedisBackend {
    client: redis::Client,
    prefix: String,
}

impl RedisBackend {
    /// Create a backend with the default key prefix
    ///
    /// # Errors
    ///
    /// Returns error if Redis URL is invalid
    pub fn new(redis_url: &str) -> Result<Self> {
        Self::with_prefix(redis_url, DEFAULT_KEY_PREFIX)
    }

    /// Create a backend with a custom key prefix
    ///
    /// # Errors
    ///
    /// Returns error if Redis URL is invalid
    pub fn with_prefix(redis_url: &str, prefix: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| Error::Configuration(format!("invalid redis url: {}", e)))?;

        Ok(Self {
            client,
            prefix: prefix.to_string(),
        })
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::Store(format!("Redis connection failed: {}", e)))
    }
}

#[async_trait]
impl SessionBackend for RedisBackend {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.get_connection().await?;

        let data: Option<Vec<u8>> = redis::cmd("GET")
            .arg(self.build_key(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Store(format!("Redis GET failed: {}", e)))?;

        Ok(data)
    }

    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut conn = self.get_connection().await?;

        redis::cmd("SETEX")
            .arg(self.build_key(key))
            .arg(ttl.as_secs().max(1))
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| Error::Store(format!("Redis SETEX failed: {}", e)))?;

        debug!(session_key = %key, ttl = ttl.as_secs(), "Session written to Redis");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;

        let deleted: i64 = redis::cmd("DEL")
            .arg(self.build_key(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Store(format!("Redis DEL failed: {}", e)))?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let result = RedisBackend::new("not a url");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_keys_are_prefixed() {
        let backend = RedisBackend::with_prefix("redis://127.0.0.1:6379", "test:").unwrap();
        assert_eq!(backend.build_key("42::restaurants"), "test:42::restaurants");
    }

    // Requires a running Redis instance:
    // cargo test --features redis-tests
    #[cfg(feature = "redis-tests")]
    #[tokio::test]
    async fn test_redis_backend() {
        let backend = RedisBackend::with_prefix("redis://127.0.0.1:6379", "chatbro:test:").unwrap();

        backend
            .set_with_ttl("key", b"payload", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(backend.get("key").await.unwrap().unwrap(), b"payload");
        assert!(backend.delete("key").await.unwrap());
        assert!(!backend.delete("key").await.unwrap());
    }
}
