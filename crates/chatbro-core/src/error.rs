//! Error types for chatbro-core

use std::path::PathBuf;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing settings
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Instructions file missing, unreadable or empty
    #[error("instructions error at {}: {message}", path.display())]
    Instructions {
        /// File that failed
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// Session backend failure
    #[error("store error: {0}")]
    Store(String),

    /// Session (de)serialization failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The model produced no text for a turn
    #[error("agent {agent} returned an empty response")]
    EmptyResponse {
        /// Agent name
        agent: String,
    },

    /// Malformed user key
    #[error("invalid user key: {0}")]
    InvalidUserKey(String),

    /// The model kept calling tools past the iteration limit
    #[error("agent {agent} exceeded {iterations} tool iterations")]
    ToolLoopExceeded {
        /// Agent name
        agent: String,
        /// Iteration limit
        iterations: usize,
    },

    /// The operation was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] chatbro_llm::Error),

    /// Tool error
    #[error("tool error: {0}")]
    Tool(#[from] chatbro_tools::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        Error::Store(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Human-readable rendering of errors for chat replies
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Configuration(msg) => format!("⚙️ Configuration error: {}", msg),
            Error::Instructions { .. } => "⚙️ Agent instructions are not available.".to_string(),
            Error::Store(_) => "🧠 Conversation memory is unavailable.".to_string(),
            Error::Serialization(_) => "🧠 Conversation memory is corrupted.".to_string(),
            Error::EmptyResponse { .. } => "🤖 The assistant returned an empty answer.".to_string(),
            Error::InvalidUserKey(_) => "❌ Unknown user.".to_string(),
            Error::ToolLoopExceeded { .. } => {
                "🔧 The assistant got stuck calling tools.".to_string()
            }
            Error::Cancelled => "⏹️ Request cancelled.".to_string(),
            Error::Llm(e) => format!(
                "🤖 LLM error: {}",
                chatbro_llm::util::sanitize_error_for_user(&e.to_string())
            ),
            Error::Tool(e) => format!("🔧 Tool error: {}", e),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::EmptyResponse { .. } | Error::ToolLoopExceeded { .. } => {
                Some("💡 Try rephrasing your message.".to_string())
            }
            Error::Store(_) | Error::Serialization(_) => {
                Some("💡 Send /reset to start a fresh conversation.".to_string())
            }
            Error::Llm(_) => Some("💡 Please try again in a moment.".to_string()),
            _ => None,
        }
    }
}
