//! Chat backend errors

use thiserror::Error;

/// Failure talking to a chat backend
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable credentials/settings
    #[error("chat backend is not configured: {0}")]
    NotConfigured(String),

    /// The backend rejected the request
    #[error("chat backend rejected the request: {0}")]
    Api(String),

    /// The backend answered with something we cannot use
    #[error("unusable answer from chat backend: {0}")]
    InvalidResponse(String),

    /// Transport failure before an answer arrived
    #[error("chat backend unreachable: {0}")]
    Network(String),

    /// No answer within the deadline, in milliseconds
    #[error("chat backend timed out after {0}ms")]
    Timeout(u64),
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, Error>;
