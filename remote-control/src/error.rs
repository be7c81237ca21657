use thiserror::Error;

/// Errors from the remote-control session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Dial, TLS, handshake, read or write failure; the connection is gone
    #[error("Connection error: {0}")]
    Connection(String),

    /// The device sent something that could not be decoded or refused us
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The deadline passed before the awaited event arrived
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// The wait was aborted through its cancel token
    #[error("Wait cancelled")]
    Cancelled,
}

impl SessionError {
    /// True when the connection is unusable and the session must be reopened
    pub fn is_connection(&self) -> bool {
        matches!(self, SessionError::Connection(_))
    }
}

impl From<tungstenite::Error> for SessionError {
    fn from(error: tungstenite::Error) -> Self {
        SessionError::Connection(error.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(error: std::io::Error) -> Self {
        SessionError::Connection(error.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(error: serde_json::Error) -> Self {
        SessionError::Protocol(error.to_string())
    }
}

/// Type alias for results that can return a SessionError
pub type Result<T> = std::result::Result<T, SessionError>;
