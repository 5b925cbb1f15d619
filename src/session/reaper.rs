//! Idle-session reaper
//!
//! One process-wide periodic task. Each tick sweeps the registry and evicts
//! every session that is no longer live (`!is_active()`) or whose inactivity
//! exceeds the hard ceiling. The ceiling is a backstop: it reclaims sessions
//! whose status flag lags reality, e.g. a socket wedged without ever firing
//! a close event.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::SessionRegistry;
use crate::utils::now_millis;

/// Spawn the recurring sweep. The task runs for the life of the process.
pub fn spawn_reaper(registry: Arc<SessionRegistry>) -> JoinHandle<()> {
    let period = registry.config().reap_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await; // the first tick completes immediately
        loop {
            ticker.tick().await;
            sweep(&registry).await;
        }
    })
}

/// One sweep pass. Returns the number of evicted sessions.
///
/// Disconnects run on detached tasks: a slow or wedged transport close must
/// never stall the sweep. Deregistration is immediate either way.
pub async fn sweep(registry: &SessionRegistry) -> usize {
    let ceiling = registry.config().reap_ceiling_millis();
    let now = now_millis();

    let stale: Vec<_> = registry
        .snapshot()
        .await
        .into_iter()
        .filter(|(_, session)| {
            !session.is_active() || now.saturating_sub(session.last_activity()) > ceiling
        })
        .collect();

    let evicted = stale.len();
    for (id, session) in stale {
        eprintln!("[Reaper] removing inactive session: {}", id);
        tokio::spawn(async move {
            session.disconnect().await;
        });
        registry.remove(&id).await;
    }
    evicted
}
