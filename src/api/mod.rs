//! HTTP API: REST endpoints and the per-session SSE stream
//!
//! This layer is a thin adapter over the session core. Handlers validate
//! nothing beyond envelope shape; the registry owns argument validation and
//! all lifecycle decisions.

pub mod handlers;
pub mod http;
pub mod sse;

use std::sync::Arc;

use serde::Serialize;

use crate::config::BridgeConfig;
use crate::session::SessionRegistry;

/// Shared state injected into every handler
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub config: BridgeConfig,
}

impl AppState {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        let config = registry.config().clone();
        Self { registry, config }
    }
}

/// Standard success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// API error envelope with a stable machine-readable code
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            code: code.to_string(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("SESSION_NOT_FOUND", message)
    }

    pub fn session_inactive(message: impl Into<String>) -> Self {
        Self::new("SESSION_INACTIVE", message)
    }

    pub fn connect_failed(message: impl Into<String>) -> Self {
        Self::new("CONNECT_FAILED", message)
    }

    pub fn connect_timeout(message: impl Into<String>) -> Self {
        Self::new("CONNECT_TIMEOUT", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_flattens_data() {
        #[derive(Serialize)]
        struct Payload {
            message: String,
        }
        let json = serde_json::to_string(&ApiResponse::ok(Payload {
            message: "Disconnected".to_string(),
        }))
        .unwrap();
        assert!(json.contains(r#""success":true"#));
        assert!(json.contains(r#""message":"Disconnected""#));
    }

    #[test]
    fn test_error_envelope_carries_code() {
        let json = serde_json::to_string(&ApiError::not_found("Session 'x' not found")).unwrap();
        assert!(json.contains(r#""success":false"#));
        assert!(json.contains(r#""code":"SESSION_NOT_FOUND""#));
    }
}
