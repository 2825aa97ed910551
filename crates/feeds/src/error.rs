//! Error types for session operations.

use std::time::Duration;
use streamprobe_core::DecodeError;
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("{method} rejected: {error}")]
    SubscriptionRejected { method: String, error: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode message: {0}")]
    Decode(String),

    #[error("Session is not open")]
    NotOpen,

    #[error("Fixture error: {0}")]
    Fixture(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for SessionError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        SessionError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Decode(err.to_string())
    }
}

impl From<DecodeError> for SessionError {
    fn from(err: DecodeError) -> Self {
        SessionError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for SessionError {
    fn from(err: url::ParseError) -> Self {
        SessionError::Connection(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Fixture(err.to_string())
    }
}

impl SessionError {
    /// Returns true if this error is transient and a fresh attempt may succeed.
    /// The session itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionError::Connection(_) | SessionError::Timeout(_))
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout(_))
    }
}
