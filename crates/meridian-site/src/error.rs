//! Site error types.

use std::net::SocketAddr;

use thiserror::Error;

/// Result type for site operations.
pub type SiteResult<T> = Result<T, SiteError>;

/// Errors that can occur while running the site server.
#[derive(Debug, Error)]
pub enum SiteError {
    /// Bind failed.
    #[error("failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
