//! Telegram adapter core

use super::config::TelegramConfig;
use crate::error::Result;
use crate::splitter::MessageSplitter;
use chatbro_core::{Error as CoreError, UserFriendlyError};
use teloxide::prelude::*;

/// Reply to a message without text
pub const EMPTY_MESSAGE_REPLY: &str = "Could you repeat? I received empty message.";

/// Reply after a successful reset
pub const RESET_REPLY: &str = "🧹✅";

/// Telegram bot adapter
pub struct TelegramAdapter {
    pub(crate) bot: Bot,
    pub(crate) config: TelegramConfig,
    pub(crate) splitter: MessageSplitter,
}

impl TelegramAdapter {
    /// Create a new Telegram adapter
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        let bot = Bot::new(&config.bot_token);
        Self {
            bot,
            config,
            splitter: MessageSplitter::default(),
        }
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = TelegramConfig::from_env()?;
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Use a custom reply splitter
    #[must_use]
    pub fn with_splitter(mut self, splitter: MessageSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Get the underlying bot
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Check if a user is allowed
    pub fn is_user_allowed(&self, user_id: i64) -> bool {
        self.config.allowed_users.is_empty() || self.config.allowed_users.contains(&user_id)
    }

    /// Text sent back when a request fails
    #[must_use]
    pub fn error_reply(error: &CoreError) -> String {
        let mut reply = format!(
            "Sorry, I encountered an error while processing your message. Error: {}",
            error.user_message()
        );
        if let Some(suggestion) = error.suggestion() {
            reply.push('\n');
            reply.push_str(&suggestion);
        }
        reply
    }
}
