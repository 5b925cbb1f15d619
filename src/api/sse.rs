//! Stream fan-out adapter: one session's events as an SSE feed
//!
//! Each attached client gets its own broadcast receiver and its own ping
//! timer, both owned by the response stream. When the client goes away axum
//! drops the stream, which drops the receiver — that is the detach, and it
//! leaks nothing across repeated attach/detach cycles.
//!
//! Frames ride on plain `data:` lines (blank-line terminated) with the type
//! inside the JSON payload; clients of the original proxy parse exactly this
//! framing, so no SSE `event:` names are used.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast;

use super::{ApiError, AppState};
use crate::config::BridgeConfig;
use crate::session::{SessionEvent, SocketSession};

/// Wire frames carried in the `data:` payload of the stream
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    /// First frame on every attach
    Connected { message: String, timestamp: i64 },
    /// Inbound MUD text
    MudOutput { content: String, timestamp: i64 },
    /// Transport failure or slow-subscriber notice; the stream continues
    Error { message: String, timestamp: i64 },
    /// Terminal frame; the stream closes after it
    Disconnect { message: String, timestamp: i64 },
    /// Keepalive for HTTP intermediaries
    Ping { timestamp: i64 },
}

impl StreamFrame {
    fn stamp() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    pub fn connected() -> Self {
        StreamFrame::Connected {
            message: "Stream started".to_string(),
            timestamp: Self::stamp(),
        }
    }

    pub fn output(content: String) -> Self {
        StreamFrame::MudOutput {
            content,
            timestamp: Self::stamp(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamFrame::Error {
            message: message.into(),
            timestamp: Self::stamp(),
        }
    }

    pub fn disconnect() -> Self {
        StreamFrame::Disconnect {
            message: "Connection closed".to_string(),
            timestamp: Self::stamp(),
        }
    }

    pub fn ping() -> Self {
        StreamFrame::Ping {
            timestamp: Self::stamp(),
        }
    }

    /// Translate a session event into its wire frame
    pub fn from_event(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Data(content) => StreamFrame::output(content),
            SessionEvent::Error(message) => StreamFrame::error(message),
            SessionEvent::TimedOut => StreamFrame::error("connection timed out"),
            SessionEvent::Closed => StreamFrame::disconnect(),
        }
    }

    fn to_sse(&self) -> Event {
        Event::default().data(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Build the SSE body for one attached subscriber.
///
/// Yields a `connected` frame immediately, then session events as they
/// arrive, interleaved with periodic pings while the session is active. On
/// the session's terminal event the `disconnect` frame is flushed, the
/// configured grace delay elapses, and the stream ends.
pub fn session_stream(
    session: Arc<SocketSession>,
    config: &BridgeConfig,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let mut rx = session.subscribe();
    let ping_interval = config.ping_interval;
    let flush_delay = config.flush_delay;

    async_stream::stream! {
        yield Ok::<_, Infallible>(StreamFrame::connected().to_sse());

        let mut ping = tokio::time::interval(ping_interval);
        ping.tick().await; // the first tick completes immediately

        loop {
            tokio::select! {
                _ = ping.tick() => {
                    // pings stop once the session is gone; the terminal
                    // frame arrives through the event channel
                    if session.is_connected() {
                        yield Ok(StreamFrame::ping().to_sse());
                    }
                }
                result = rx.recv() => match result {
                    Ok(SessionEvent::Closed) => {
                        yield Ok(StreamFrame::disconnect().to_sse());
                        tokio::time::sleep(flush_delay).await;
                        break;
                    }
                    Ok(event) => {
                        yield Ok(StreamFrame::from_event(event).to_sse());
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        yield Ok(StreamFrame::error(
                            format!("Missed {} events, please reconnect", n),
                        ).to_sse());
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        eprintln!("[Stream] subscriber detached from {}", session.id());
    }
}

/// GET /api/sessions/:id/stream - attach an SSE subscriber
pub async fn stream_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.registry.get(&id).await {
        Some(session) => {
            eprintln!("[Stream] subscriber attached to {}", id);
            Sse::new(session_stream(session, &state.config)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("Session '{}' not found", id))),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn payload(frame: &StreamFrame) -> Value {
        serde_json::from_str(&serde_json::to_string(frame).unwrap()).unwrap()
    }

    #[test]
    fn test_frame_wire_format() {
        let frame = payload(&StreamFrame::output("You see a dark room.".to_string()));
        assert_eq!(frame["type"], "mud_output");
        assert_eq!(frame["content"], "You see a dark room.");
        assert!(frame["timestamp"].is_i64());

        assert_eq!(payload(&StreamFrame::connected())["type"], "connected");
        assert_eq!(payload(&StreamFrame::disconnect())["type"], "disconnect");
        assert_eq!(payload(&StreamFrame::ping())["type"], "ping");

        let frame = payload(&StreamFrame::error("boom"));
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["message"], "boom");
    }

    #[test]
    fn test_event_translation() {
        let frame = StreamFrame::from_event(SessionEvent::Data("hello".to_string()));
        assert!(matches!(frame, StreamFrame::MudOutput { ref content, .. } if content == "hello"));

        let frame = StreamFrame::from_event(SessionEvent::TimedOut);
        assert!(matches!(frame, StreamFrame::Error { .. }));

        let frame = StreamFrame::from_event(SessionEvent::Closed);
        assert!(matches!(frame, StreamFrame::Disconnect { .. }));
    }
}
