//! Error types for session operations.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur while acquiring or releasing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend rejected the email/password pair.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The login request could not be completed.
    #[error("Login request failed: {0}")]
    Transport(String),

    /// The backend answered login with an unexpected status.
    #[error("Login rejected with HTTP {status}")]
    Backend { status: u16 },

    /// The login response body did not carry the expected fields.
    #[error("Malformed login response: {0}")]
    MalformedResponse(String),

    /// The credential vault could not be read or written.
    #[error("Credential storage failed: {0}")]
    Storage(String),
}

impl From<HttpError> for SessionError {
    fn from(e: HttpError) -> Self {
        SessionError::Transport(e.to_string())
    }
}
