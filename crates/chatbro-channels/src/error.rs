//! Channel errors

use thiserror::Error;

/// Failure in a chat channel
#[derive(Debug, Error)]
pub enum Error {
    /// Bot API request or bot setup failed
    #[error("telegram: {0}")]
    Telegram(String),
}

impl From<teloxide::RequestError> for Error {
    fn from(e: teloxide::RequestError) -> Self {
        Error::Telegram(e.to_string())
    }
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, Error>;
