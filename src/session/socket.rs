//! Socket session: one pooled outbound TCP connection
//!
//! A session owns its transport exclusively. One background task drives the
//! read loop, a second writes keepalives; both are aborted by `disconnect()`.
//! Inbound data fans out to subscribers through a broadcast channel, so a
//! session can feed zero or many attached streams without knowing about them.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::{SessionEvent, SessionStatus, SessionSummary};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::utils::now_millis;

/// Tail cap on the accumulated-but-unread receive buffer
const RECV_BUFFER_CAP: usize = 256 * 1024;

/// One outbound TCP connection to a MUD server
#[derive(Debug)]
pub struct SocketSession {
    id: String,
    host: String,
    port: u16,
    config: BridgeConfig,
    status: Mutex<SessionStatus>,
    /// Unix millis of the last send or inbound data; heartbeats do not touch it
    last_activity: AtomicU64,
    /// Inbound text received but not consumed through any stream
    buffer: Mutex<String>,
    event_tx: broadcast::Sender<SessionEvent>,
    writer: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
    /// Read loop + heartbeat handles, aborted on disconnect
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SocketSession {
    /// Create a session in `Connecting` state; no transport is opened yet
    pub fn new(id: String, host: &str, port: u16, config: BridgeConfig) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(config.event_buffer);
        Arc::new(Self {
            id,
            host: host.to_string(),
            port,
            config,
            status: Mutex::new(SessionStatus::Connecting),
            last_activity: AtomicU64::new(now_millis()),
            buffer: Mutex::new(String::new()),
            event_tx,
            writer: tokio::sync::Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.lock()
    }

    /// Raw status flag: is the transport believed open
    pub fn is_connected(&self) -> bool {
        self.status() == SessionStatus::Active
    }

    /// Liveness predicate: active AND seen activity within the idle threshold.
    /// This is the soft input to the reaper's eviction decision.
    pub fn is_active(&self) -> bool {
        self.is_connected() && self.idle_for() < self.config.idle_threshold_millis()
    }

    pub fn last_activity(&self) -> u64 {
        self.last_activity.load(Ordering::SeqCst)
    }

    /// Millis since the last send or inbound data
    pub fn idle_for(&self) -> u64 {
        now_millis().saturating_sub(self.last_activity())
    }

    /// Subscribe to this session's events. Dropping the receiver is the
    /// detach; nothing else tracks the subscription.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Number of currently attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.event_tx.receiver_count()
    }

    /// Inbound text accumulated since the last `take_buffered`
    pub fn take_buffered(&self) -> String {
        std::mem::take(&mut *self.buffer.lock())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            host: self.host.clone(),
            port: self.port,
            connected: self.is_connected(),
            last_activity: self.last_activity(),
        }
    }

    /// Establish the TCP transport within the configured connect timeout.
    ///
    /// On success the session becomes `Active` and its read loop and
    /// heartbeat start. On failure or timeout the session is `Closed` and
    /// nothing was spawned. Emits no events before success.
    pub async fn connect(self: &Arc<Self>) -> BridgeResult<()> {
        if self.status() != SessionStatus::Connecting {
            return Err(BridgeError::ConnectFailed(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "session was already connected",
            )));
        }

        let attempt = TcpStream::connect((self.host.as_str(), self.port));
        let stream = match tokio::time::timeout(self.config.connect_timeout, attempt).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                *self.status.lock() = SessionStatus::Closed;
                return Err(BridgeError::ConnectFailed(e));
            }
            Err(_) => {
                *self.status.lock() = SessionStatus::Closed;
                return Err(BridgeError::ConnectTimeout);
            }
        };

        let (reader, writer) = stream.into_split();
        *self.writer.lock().await = Some(writer);

        // Transition and spawn under the same lock so a racing disconnect
        // either sees no tasks yet or aborts both.
        {
            let mut status = self.status.lock();
            if *status != SessionStatus::Connecting {
                return Err(BridgeError::ConnectFailed(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "session closed during connect",
                )));
            }
            *status = SessionStatus::Active;
            let mut tasks = self.tasks.lock();
            tasks.push(tokio::spawn(Self::read_loop(self.clone(), reader)));
            tasks.push(tokio::spawn(Self::heartbeat_loop(self.clone())));
        }
        self.touch();
        eprintln!("[Session] {} connected to {}:{}", self.id, self.host, self.port);
        Ok(())
    }

    /// Write `command` plus a line terminator to the transport.
    ///
    /// Returns `false` without side effects when the session is not active.
    /// A write failure broadcasts an `Error` event, disconnects the session,
    /// and reports `false`; it never raises.
    pub async fn send(&self, command: &str) -> bool {
        if !self.is_connected() {
            return false;
        }

        let result = {
            let mut guard = self.writer.lock().await;
            match guard.as_mut() {
                Some(writer) => writer.write_all(format!("{}\n", command).as_bytes()).await,
                None => return false,
            }
        };

        match result {
            Ok(()) => {
                self.touch();
                true
            }
            Err(e) => {
                eprintln!("[Session] {} write failed: {}", self.id, e);
                let _ = self.event_tx.send(SessionEvent::Error(e.to_string()));
                self.disconnect().await;
                false
            }
        }
    }

    /// Close the session. Idempotent: exactly one caller performs the
    /// teardown (abort tasks, release the transport, broadcast `Closed`);
    /// every other concurrent or repeated call returns immediately.
    pub async fn disconnect(&self) {
        let tasks = {
            let mut status = self.status.lock();
            if *status == SessionStatus::Closed {
                return;
            }
            *status = SessionStatus::Closed;
            self.tasks.lock().drain(..).collect::<Vec<_>>()
        };
        for task in tasks {
            task.abort();
        }
        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }
        let _ = self.event_tx.send(SessionEvent::Closed);
        eprintln!("[Session] {} closed", self.id);
    }

    fn touch(&self) {
        self.last_activity.store(now_millis(), Ordering::SeqCst);
    }

    /// Hand a disconnect to a detached task. Session-owned tasks must not
    /// await `disconnect()` themselves: it aborts them, and an aborted task
    /// would leave the teardown half done.
    fn disconnect_detached(self: &Arc<Self>) {
        let session = self.clone();
        tokio::spawn(async move {
            session.disconnect().await;
        });
    }

    /// Read loop: one task per transport. Each read is bounded by the socket
    /// timeout; inbound chunks update the activity clock, accumulate in the
    /// buffer, and are broadcast in arrival order.
    async fn read_loop(session: Arc<Self>, mut reader: OwnedReadHalf) {
        let mut buf = [0u8; 4096];
        loop {
            let read = tokio::time::timeout(session.config.socket_timeout, reader.read(&mut buf));
            match read.await {
                Ok(Ok(0)) => {
                    eprintln!("[Session] {} closed by peer", session.id);
                    session.disconnect_detached();
                    break;
                }
                Ok(Ok(n)) => {
                    let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                    session.touch();
                    session.accumulate(&text);
                    let _ = session.event_tx.send(SessionEvent::Data(text));
                }
                Ok(Err(e)) => {
                    eprintln!("[Session] {} read failed: {}", session.id, e);
                    let _ = session.event_tx.send(SessionEvent::Error(e.to_string()));
                    session.disconnect_detached();
                    break;
                }
                Err(_) => {
                    eprintln!("[Session] {} socket timeout", session.id);
                    let _ = session.event_tx.send(SessionEvent::TimedOut);
                    session.disconnect_detached();
                    break;
                }
            }
        }
    }

    /// Heartbeat loop: while active, write a bare newline on a fixed period.
    /// The write deliberately bypasses `send` so keepalives never reset the
    /// idle clock; an abandoned-but-connected session must still be reapable.
    async fn heartbeat_loop(session: Arc<Self>) {
        let mut ticker = tokio::time::interval(session.config.heartbeat_interval);
        ticker.tick().await; // the first tick completes immediately
        loop {
            ticker.tick().await;
            if !session.is_connected() {
                break;
            }
            let result = {
                let mut guard = session.writer.lock().await;
                match guard.as_mut() {
                    Some(writer) => writer.write_all(b"\n").await,
                    None => break,
                }
            };
            if let Err(e) = result {
                eprintln!("[Session] {} keepalive failed: {}", session.id, e);
                let _ = session.event_tx.send(SessionEvent::Error(e.to_string()));
                session.disconnect_detached();
                break;
            }
        }
    }

    fn accumulate(&self, text: &str) {
        let mut buffer = self.buffer.lock();
        buffer.push_str(text);
        if buffer.len() > RECV_BUFFER_CAP {
            // keep the tail, respecting char boundaries
            let excess = buffer.len() - RECV_BUFFER_CAP;
            let cut = (excess..buffer.len())
                .find(|i| buffer.is_char_boundary(*i))
                .unwrap_or(buffer.len());
            buffer.drain(..cut);
        }
    }
}
