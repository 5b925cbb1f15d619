//! MUD Bridge
//!
//! Bridges line-oriented MUD TCP connections to web clients over HTTP:
//! outbound connections are pooled in a registry, each one's inbound byte
//! stream is re-exposed as a live Server-Sent-Events feed, and commands go
//! out through plain request/response calls.
//!
//! # Modules
//!
//! - `session`: the core - socket sessions, the registry, and the idle reaper
//! - `api`: axum router, REST handlers, and the SSE fan-out adapter
//! - `config`: tuning knobs with environment overrides
//! - `error`: typed errors for the boundary operations
//! - `utils`: timestamp helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mud_bridge::{api, config::BridgeConfig, session};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let registry = Arc::new(session::SessionRegistry::new(BridgeConfig::from_env()));
//!     session::reaper::spawn_reaper(registry.clone());
//!
//!     let app = api::http::create_router(Arc::new(api::AppState::new(registry)));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use session::{SessionEvent, SessionRegistry, SessionStatus, SessionSummary, SocketSession};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
