//! Client errors

use thiserror::Error;

/// Client errors for Taskvault API operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The session could not be renewed; the caller must log in again
    #[error("session expired")]
    SessionExpired,

    /// Request was rejected as unauthenticated even after renewal
    #[error("authentication required: {0}")]
    Unauthenticated(String),

    /// The server rejected the request
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status
        status: u16,
        /// Machine-readable error code, when the server sent one
        code: Option<String>,
        /// Human-readable message
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ClientError {
    /// True when the caller should re-authenticate before retrying
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::Unauthenticated(_))
    }
}
