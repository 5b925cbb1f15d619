//! Bridge configuration
//!
//! All tuning knobs live here: network timeouts, the heartbeat/ping cadences,
//! and the idle-reaping thresholds. Every knob has a default matching the
//! behavior of the original proxy and can be overridden from the environment
//! (`MUD_BRIDGE_*`). Unparseable values fall back to the default.

use std::env;
use std::time::Duration;

/// Configuration for the bridge server
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Maximum time to wait for an outbound TCP connect
    pub connect_timeout: Duration,
    /// Read-inactivity ceiling on an established transport; on elapse the
    /// session emits `TimedOut` and closes
    pub socket_timeout: Duration,
    /// Period between keepalive writes to the MUD
    pub heartbeat_interval: Duration,
    /// Inactivity window after which `is_active()` turns false
    pub idle_threshold: Duration,
    /// Period between reaper sweeps
    pub reap_interval: Duration,
    /// Absolute inactivity backstop enforced by the reaper regardless of the
    /// session status flag
    pub reap_ceiling: Duration,
    /// Period between `ping` frames on an attached SSE stream
    pub ping_interval: Duration,
    /// Grace delay before closing a stream after its `disconnect` frame
    pub flush_delay: Duration,
    /// Capacity of each session's event broadcast channel
    pub event_buffer: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            connect_timeout: Duration::from_secs(30),
            socket_timeout: Duration::from_secs(300),
            heartbeat_interval: Duration::from_secs(30),
            idle_threshold: Duration::from_secs(300),
            reap_interval: Duration::from_secs(60),
            reap_ceiling: Duration::from_secs(300),
            ping_interval: Duration::from_secs(25),
            flush_delay: Duration::from_millis(100),
            event_buffer: 1024,
        }
    }
}

impl BridgeConfig {
    /// Build a config from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env::var("MUD_BRIDGE_ADDR").unwrap_or(defaults.bind_addr),
            connect_timeout: env_millis("MUD_BRIDGE_CONNECT_TIMEOUT_MS", defaults.connect_timeout),
            socket_timeout: env_millis("MUD_BRIDGE_SOCKET_TIMEOUT_MS", defaults.socket_timeout),
            heartbeat_interval: env_millis("MUD_BRIDGE_HEARTBEAT_MS", defaults.heartbeat_interval),
            idle_threshold: env_millis("MUD_BRIDGE_IDLE_THRESHOLD_MS", defaults.idle_threshold),
            reap_interval: env_millis("MUD_BRIDGE_REAP_INTERVAL_MS", defaults.reap_interval),
            reap_ceiling: env_millis("MUD_BRIDGE_REAP_CEILING_MS", defaults.reap_ceiling),
            ping_interval: env_millis("MUD_BRIDGE_PING_MS", defaults.ping_interval),
            flush_delay: env_millis("MUD_BRIDGE_FLUSH_DELAY_MS", defaults.flush_delay),
            event_buffer: env_count("MUD_BRIDGE_EVENT_BUFFER", defaults.event_buffer),
        }
    }

    /// Idle threshold in milliseconds, as compared against activity timestamps
    pub fn idle_threshold_millis(&self) -> u64 {
        self.idle_threshold.as_millis() as u64
    }

    /// Reap ceiling in milliseconds
    pub fn reap_ceiling_millis(&self) -> u64 {
        self.reap_ceiling.as_millis() as u64
    }
}

fn env_millis(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn env_count(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_source_tuning() {
        let config = BridgeConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.idle_threshold, Duration::from_secs(300));
        assert_eq!(config.reap_interval, Duration::from_secs(60));
        assert_eq!(config.event_buffer, 1024);
    }

    #[test]
    fn test_env_override_and_fallback() {
        env::set_var("MUD_BRIDGE_TEST_KNOB_MS", "1500");
        assert_eq!(
            env_millis("MUD_BRIDGE_TEST_KNOB_MS", Duration::from_secs(1)),
            Duration::from_millis(1500)
        );
        env::set_var("MUD_BRIDGE_TEST_KNOB_MS", "not-a-number");
        assert_eq!(
            env_millis("MUD_BRIDGE_TEST_KNOB_MS", Duration::from_secs(1)),
            Duration::from_secs(1)
        );
        env::remove_var("MUD_BRIDGE_TEST_KNOB_MS");
    }

    #[test]
    fn test_event_buffer_rejects_zero() {
        env::set_var("MUD_BRIDGE_TEST_BUFFER", "0");
        assert_eq!(env_count("MUD_BRIDGE_TEST_BUFFER", 1024), 1024);
        env::remove_var("MUD_BRIDGE_TEST_BUFFER");
    }
}
