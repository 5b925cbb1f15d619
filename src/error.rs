//! Error types for the bridge core

use std::fmt;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors surfaced by the session core
///
/// Transport failures that happen mid-life (read/write errors on an
/// established connection) are never returned through this type; they are
/// absorbed by the owning session, which disconnects itself and broadcasts
/// an `Error` event to attached streams instead.
#[derive(Debug)]
pub enum BridgeError {
    /// Request rejected before any resource was touched
    InvalidArgument(String),
    /// TCP connect failed, carrying the underlying transport error
    ConnectFailed(std::io::Error),
    /// TCP connect did not complete within the configured timeout
    ConnectTimeout,
    /// Looked-up session id is absent or already reaped
    SessionNotFound(String),
    /// Session exists but is not active
    SessionInactive(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            BridgeError::ConnectFailed(e) => write!(f, "Connection failed: {}", e),
            BridgeError::ConnectTimeout => write!(f, "Connection timed out"),
            BridgeError::SessionNotFound(id) => write!(f, "Session '{}' not found", id),
            BridgeError::SessionInactive(id) => write!(f, "Session '{}' is not active", id),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BridgeError::ConnectFailed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = BridgeError::SessionNotFound("mud_1_0".to_string());
        assert_eq!(err.to_string(), "Session 'mud_1_0' not found");

        let err = BridgeError::InvalidArgument("host is required".to_string());
        assert!(err.to_string().contains("host is required"));
    }

    #[test]
    fn test_connect_failed_keeps_source() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = BridgeError::ConnectFailed(io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("refused"));
    }
}
