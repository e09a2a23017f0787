//! Tool errors

use thiserror::Error;

/// Failure looking up, listing or running a tool
#[derive(Debug, Error)]
pub enum Error {
    /// No tool registered under this name
    #[error("unknown tool '{0}'")]
    NotFound(String),

    /// The tool ran and failed
    #[error("tool failed: {0}")]
    Execution(String),

    /// Arguments rejected before running
    #[error("bad tool arguments: {0}")]
    InvalidInput(String),

    /// A remote tool source could not be reached
    #[error("tool source unreachable: {0}")]
    Network(String),

    /// A remote tool source answered out of protocol
    #[error("tool source protocol violation: {0}")]
    Protocol(String),
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, Error>;
