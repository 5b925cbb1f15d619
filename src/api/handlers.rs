//! REST handlers for session lifecycle operations

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse, AppState};
use crate::error::BridgeError;
use crate::session::SessionSummary;

/// Request body for POST /api/sessions
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub host: String,
    pub port: u16,
}

/// Response body for a created session
#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub connection_id: String,
    pub message: String,
}

/// POST /api/sessions - open a connection and register it
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    match state.registry.create(&req.host, req.port).await {
        Ok(session) => {
            let body = SessionCreated {
                connection_id: session.id().to_string(),
                message: format!("Connected to MUD {}:{}", session.host(), session.port()),
            };
            (StatusCode::OK, Json(ApiResponse::ok(body))).into_response()
        }
        Err(err) => error_response(err).into_response(),
    }
}

/// Request body for POST /api/sessions/:id/send
#[derive(Debug, Deserialize)]
pub struct SendCommandRequest {
    pub command: String,
}

/// Outcome of a send attempt
#[derive(Debug, Serialize)]
pub struct CommandOutcome {
    pub delivered: bool,
    pub message: String,
}

/// POST /api/sessions/:id/send - write one command to the MUD
pub async fn send_command(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SendCommandRequest>,
) -> impl IntoResponse {
    let Some(session) = state.registry.get(&id).await else {
        return error_response(BridgeError::SessionNotFound(id)).into_response();
    };
    if !session.is_connected() {
        return error_response(BridgeError::SessionInactive(id)).into_response();
    }

    let delivered = session.send(&req.command).await;
    let body = CommandOutcome {
        delivered,
        message: if delivered {
            "Command sent".to_string()
        } else {
            "Failed to send command".to_string()
        },
    };
    (StatusCode::OK, Json(ApiResponse::ok(body))).into_response()
}

#[derive(Debug, Serialize)]
pub struct SessionClosed {
    pub message: String,
}

/// DELETE /api/sessions/:id - close and deregister; always succeeds
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.registry.close(&id).await;
    Json(ApiResponse::ok(SessionClosed {
        message: "Disconnected".to_string(),
    }))
}

/// Listing of all pooled sessions
#[derive(Debug, Serialize)]
pub struct SessionListing {
    pub total: usize,
    pub sessions: Vec<SessionSummary>,
}

/// GET /api/sessions - summaries of every pooled connection
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sessions = state.registry.list().await;
    Json(ApiResponse::ok(SessionListing {
        total: sessions.len(),
        sessions,
    }))
}

/// Map a core error to its HTTP status and envelope
fn error_response(err: BridgeError) -> (StatusCode, Json<ApiError>) {
    let message = err.to_string();
    match err {
        BridgeError::InvalidArgument(_) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::invalid_argument(message)),
        ),
        BridgeError::SessionNotFound(_) => {
            (StatusCode::NOT_FOUND, Json(ApiError::not_found(message)))
        }
        BridgeError::SessionInactive(_) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::session_inactive(message)),
        ),
        BridgeError::ConnectFailed(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiError::connect_failed(message)),
        ),
        BridgeError::ConnectTimeout => (
            StatusCode::BAD_GATEWAY,
            Json(ApiError::connect_timeout(message)),
        ),
    }
}
