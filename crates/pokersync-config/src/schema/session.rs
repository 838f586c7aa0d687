//! Client-side session behavior.

use serde::{Deserialize, Serialize};

/// Session behavior knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long "X joined the room" notices stay visible, in milliseconds.
    pub notice_ttl_ms: u64,
    /// Story id attached to submitted votes (story tracking is unused).
    pub story_id: String,
    /// Capacity of the transport event channel and the session event bus.
    pub event_channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            notice_ttl_ms: 3000,
            story_id: "simple-voting".into(),
            event_channel_capacity: 256,
        }
    }
}
