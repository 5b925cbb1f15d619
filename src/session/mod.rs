//! Session core: pooled TCP connections to MUD servers
//!
//! A [`SocketSession`] owns one outbound TCP connection and fans its inbound
//! byte stream out to any number of subscribers. The [`SessionRegistry`] maps
//! opaque ids to live sessions, and the [`reaper`] sweep evicts the idle ones.

pub mod reaper;
pub mod registry;
pub mod socket;

pub use registry::SessionRegistry;
pub use socket::SocketSession;

use serde::Serialize;

/// Connection status of a socket session
///
/// Transitions are one-way: `Connecting -> Active -> Closed`, or
/// `Connecting -> Closed` on a failed connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Connecting,
    Active,
    Closed,
}

/// Events broadcast by a session to its subscribers
///
/// `Data` may fire any number of times while the session is active. The other
/// three fire at most once per session and always precede (or accompany) the
/// transition to `Closed`.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Inbound bytes from the MUD, decoded as UTF-8 (lossy)
    Data(String),
    /// Transport-level read/write failure
    Error(String),
    /// Read-inactivity ceiling elapsed
    TimedOut,
    /// Terminal notification: the session is closed
    Closed,
}

/// Listing entry for one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub connected: bool,
    /// Unix millis of the last send or inbound data
    pub last_activity: u64,
}
