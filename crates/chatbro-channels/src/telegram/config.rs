//! Telegram configuration types

use crate::error::{Error, Result};
use serde::Deserialize;

/// Telegram bot configuration
#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token
    pub bot_token: String,
    /// Allowed user IDs (empty = allow all)
    #[serde(default)]
    pub allowed_users: Vec<i64>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("allowed_users", &self.allowed_users)
            .finish()
    }
}

impl TelegramConfig {
    /// Read `TELEGRAM_BOT_TOKEN` and the optional comma-separated
    /// `TELEGRAM_ALLOWED_USERS`
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| Error::Telegram("TELEGRAM_BOT_TOKEN not set".to_string()))?;
        let allowed_users = std::env::var("TELEGRAM_ALLOWED_USERS")
            .map(|list| parse_user_ids(&list))
            .unwrap_or_default();

        Ok(Self::new(bot_token).with_allowed_users(allowed_users))
    }

    /// Create with a bot token
    #[must_use]
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            allowed_users: Vec::new(),
        }
    }

    /// Set allowed users
    #[must_use]
    pub fn with_allowed_users(mut self, users: Vec<i64>) -> Self {
        self.allowed_users = users;
        self
    }

    /// Check the configuration before connecting
    ///
    /// # Errors
    /// Returns error if the bot token is empty
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            return Err(Error::Telegram("bot token is empty".to_string()));
        }
        Ok(())
    }
}

/// Parse a comma-separated id list, skipping entries that are not numbers
fn parse_user_ids(list: &str) -> Vec<i64> {
    list.split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_ids() {
        assert_eq!(parse_user_ids("1, 22 ,x,,-5"), vec![1, 22, -5]);
        assert!(parse_user_ids("").is_empty());
    }
}
