//! Configuration, wire envelope, and event/command enums for the realtime client.

use pokersync_config::schema::ServerConfig;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the WebSocket connection to the estimation server.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// `ws://` or `wss://` endpoint.
    pub url: String,
    /// Timeout for a single dial, in seconds (default: 15).
    pub connect_timeout_secs: u64,
    /// Heartbeat interval in seconds (default: 25).
    pub heartbeat_interval_secs: u64,
    /// Reconnect base delay in seconds.
    pub reconnect_delay_secs: u64,
    /// Maximum reconnect delay in seconds.
    pub max_reconnect_delay_secs: u64,
    /// Frames kept while disconnected; the oldest is dropped beyond this.
    pub outbox_capacity: usize,
    /// Capacity of the inbound event channel.
    pub event_channel_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:3000/ws".to_string(),
            connect_timeout_secs: 15,
            heartbeat_interval_secs: 25,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
            outbox_capacity: 64,
            event_channel_capacity: 256,
        }
    }
}

impl From<&ServerConfig> for RealtimeConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            url: server.url.clone(),
            connect_timeout_secs: server.connect_timeout_secs,
            heartbeat_interval_secs: server.heartbeat_interval_secs,
            reconnect_delay_secs: server.reconnect_delay_secs,
            max_reconnect_delay_secs: server.max_reconnect_delay_secs,
            ..Self::default()
        }
    }
}

impl RealtimeConfig {
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Delay before reconnect attempt `attempt` (1-based): the base delay
    /// doubled per attempt, capped at the maximum.
    pub(crate) fn backoff_secs(&self, attempt: u32) -> u64 {
        let shift = attempt.saturating_sub(1).min(16);
        self.reconnect_delay_secs
            .saturating_mul(1u64 << shift)
            .min(self.max_reconnect_delay_secs)
    }
}

// ---------------------------------------------------------------------------
// Wire envelope
// ---------------------------------------------------------------------------

/// One frame on the wire: an event name and its JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Events & Commands
// ---------------------------------------------------------------------------

/// Events emitted by the realtime client.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// WebSocket connection established.
    Connected,
    /// WebSocket connection lost or closed.
    Disconnected,
    /// Waiting `delay_secs` before reconnect attempt `attempt`.
    Reconnecting { attempt: u32, delay_secs: u64 },
    /// A dial failed or timed out.
    Error(String),
    /// An inbound protocol event.
    Message {
        event: String,
        data: serde_json::Value,
    },
}

/// Commands sent to the realtime client from the application layer.
#[derive(Debug)]
pub(crate) enum RealtimeCommand {
    Open,
    Close,
    Emit(Envelope),
}
