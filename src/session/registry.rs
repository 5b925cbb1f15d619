//! Session registry: id allocation and concurrency-safe session lookup

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{SessionSummary, SocketSession};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::utils::now_millis;

/// Process-scoped mapping from session ids to live sessions
///
/// The registry owns its sessions: it is the only component that removes an
/// entry. Lookups hand out `Arc` clones, so a session looked up concurrently
/// with its removal stays usable until the last clone drops; it is simply no
/// longer visible to later lookups.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SocketSession>>>,
    counter: AtomicU64,
    config: BridgeConfig,
}

impl SessionRegistry {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            counter: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Generate a session id: monotonic counter plus wall-clock millis.
    /// Never reused within a process lifetime, no coordination needed.
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("mud_{}_{}", n, now_millis())
    }

    /// Validate arguments, connect, and register a new session.
    ///
    /// Validation failures reject before any resource is touched; a failed
    /// connect registers nothing.
    pub async fn create(&self, host: &str, port: u16) -> BridgeResult<Arc<SocketSession>> {
        let host = host.trim();
        if host.is_empty() {
            return Err(BridgeError::InvalidArgument("host is required".to_string()));
        }
        if port == 0 {
            return Err(BridgeError::InvalidArgument(
                "port must be in 1-65535".to_string(),
            ));
        }

        let session = SocketSession::new(self.next_id(), host, port, self.config.clone());
        session.connect().await?;

        self.sessions
            .write()
            .await
            .insert(session.id().to_string(), session.clone());
        eprintln!(
            "[Registry] new session {} for {}:{}",
            session.id(),
            host,
            port
        );
        Ok(session)
    }

    pub async fn get(&self, id: &str) -> Option<Arc<SocketSession>> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> Option<Arc<SocketSession>> {
        self.sessions.write().await.remove(id)
    }

    /// Disconnect and deregister. Idempotent: closing an unknown or
    /// already-closed id is a no-op.
    pub async fn close(&self, id: &str) {
        if let Some(session) = self.remove(id).await {
            session.disconnect().await;
            eprintln!("[Registry] session {} removed", id);
        }
    }

    pub async fn list(&self) -> Vec<SessionSummary> {
        self.sessions
            .read()
            .await
            .values()
            .map(|s| s.summary())
            .collect()
    }

    /// Snapshot of all entries, for the reaper's sweep
    pub async fn snapshot(&self) -> Vec<(String, Arc<SocketSession>)> {
        self.sessions
            .read()
            .await
            .iter()
            .map(|(id, s)| (id.clone(), s.clone()))
            .collect()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
