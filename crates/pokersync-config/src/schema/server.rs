//! Realtime server connection settings.

use serde::{Deserialize, Serialize};

/// Connection settings for the session server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// WebSocket URL of the session server.
    pub url: String,
    /// Connect on startup without waiting for an explicit `connect()`.
    pub auto_connect: bool,
    /// Give up on a single dial attempt after this many seconds.
    pub connect_timeout_secs: u64,
    /// Interval between WebSocket pings.
    pub heartbeat_interval_secs: u64,
    /// Reconnect base delay in seconds.
    pub reconnect_delay_secs: u64,
    /// Maximum reconnect delay in seconds.
    pub max_reconnect_delay_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:3000/ws".into(),
            auto_connect: true,
            connect_timeout_secs: 15,
            heartbeat_interval_secs: 25,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
        }
    }
}
