//! Error types for the tanuki server.

use tanuki_client::GitLabError;
use thiserror::Error;

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Startup configuration or any other GitLab-side failure.
    #[error(transparent)]
    GitLab(#[from] GitLabError),

    /// I/O error (signal registration, stdio).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// MCP handshake or session failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias using `ServerError`.
pub type Result<T> = std::result::Result<T, ServerError>;
