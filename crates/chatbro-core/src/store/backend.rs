use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key/value backend holding serialized sessions
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Backend name, for logs
    fn name(&self) -> &str;

    /// Fetch the blob stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, expiring after `ttl`
    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Remove `key`, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;
}
