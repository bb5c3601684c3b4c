//! Remote plan store error types.

use thiserror::Error;

/// Errors from talking to the remote plan store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No user id to address the plan by
    #[error("No user id configured for the remote plan store")]
    MissingUserId,
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status
    #[error("Server returned status {0}")]
    Status(reqwest::StatusCode),
    /// The response body was not a plan
    #[error("Failed to decode plan response: {0}")]
    Decode(#[from] serde_json::Error),
}
