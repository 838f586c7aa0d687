//! WebSocket client for the estimation server.
//!
//! Speaks JSON `{"event", "data"}` frames over `tokio-tungstenite`.
//! Handles heartbeats, an outbox for frames sent while offline, and
//! auto-reconnect with exponential backoff.

mod client;
mod connection;
mod handler;
mod types;

pub use client::RealtimeClient;
pub use types::{Envelope, RealtimeConfig, TransportEvent};
