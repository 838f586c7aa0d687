//! Connection manager: owns the transport handle and reflects its
//! lifecycle into the store.
//!
//! The manager is the only writer of `status` and `connection_error`.
//! Transport failures stop here; nothing above sees a transport error
//! except as the `connection_error` string.

use std::sync::Arc;

use pokersync_common::SyncError;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::store::{ConnectionStatus, SessionStore};

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// The outbound half of a realtime transport.
///
/// Calls never block. Lifecycle changes and inbound frames come back
/// separately as `TransportEvent`s.
pub trait Transport: Send + Sync {
    /// Start connecting (and keep reconnecting) until `close`.
    fn open(&self) -> Result<(), SyncError>;
    /// Stop reconnecting and drop any live connection.
    fn close(&self) -> Result<(), SyncError>;
    /// Send one protocol event, queueing it if not connected.
    fn emit(&self, event: &str, data: Value) -> Result<(), SyncError>;
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    store: Arc<SessionStore>,
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<SessionStore>) -> Self {
        Self { transport, store }
    }

    /// Open the transport. No-op if already connected.
    pub fn connect(&self) {
        if self.store.status.get() == ConnectionStatus::Connected {
            debug!("connect() while connected, ignoring");
            return;
        }
        self.store.status.set(ConnectionStatus::Connecting);
        if let Err(e) = self.transport.open() {
            warn!(error = %e, "Failed to open transport");
            self.store.status.set(ConnectionStatus::Disconnected);
            self.store.connection_error.set(Some(e.to_string()));
        }
    }

    /// Close the transport. No-op if already disconnected.
    pub fn disconnect(&self) {
        if self.store.status.get() == ConnectionStatus::Disconnected {
            debug!("disconnect() while disconnected, ignoring");
            return;
        }
        if let Err(e) = self.transport.close() {
            warn!(error = %e, "Failed to close transport");
            self.store.status.set(ConnectionStatus::Disconnected);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_connected()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.store.status.get()
    }

    pub fn connection_error(&self) -> Option<String> {
        self.store.connection_error.get()
    }

    /// Send a raw protocol event. Failures are logged, never returned.
    pub fn emit(&self, event: &str, data: Value) {
        debug!(event, "Emitting");
        if let Err(e) = self.transport.emit(event, data) {
            warn!(error = %e, event, "Emit failed");
        }
    }

    /// Serialize `payload` and send it as `event`.
    pub fn emit_payload<T: Serialize>(&self, event: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(data) => self.emit(event, data),
            Err(e) => warn!(error = %e, event, "Failed to encode payload"),
        }
    }

    // -- transport lifecycle -------------------------------------------------

    pub(crate) fn on_connected(&self) {
        info!("Connected");
        self.store.status.set(ConnectionStatus::Connected);
        self.store.connection_error.set(None);
    }

    pub(crate) fn on_disconnected(&self) {
        info!("Disconnected");
        self.store.status.set(ConnectionStatus::Disconnected);
    }

    pub(crate) fn on_reconnecting(&self, attempt: u32, delay_secs: u64) {
        debug!(attempt, delay_secs, "Reconnect scheduled");
        self.store.status.set(ConnectionStatus::Connecting);
    }

    /// Record the most recent error. Status is left as is.
    pub(crate) fn on_error(&self, message: String) {
        warn!(error = %message, "Connection error");
        self.store.connection_error.set(Some(message));
    }

    pub fn clear_error(&self) {
        self.store.connection_error.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingTransport, TransportCall};

    fn manager() -> (ConnectionManager, Arc<RecordingTransport>, Arc<SessionStore>) {
        let transport = Arc::new(RecordingTransport::default());
        let store = Arc::new(SessionStore::new());
        let manager = ConnectionManager::new(transport.clone(), store.clone());
        (manager, transport, store)
    }

    #[test]
    fn connect_sets_connecting_and_opens() {
        let (manager, transport, store) = manager();
        manager.connect();
        assert_eq!(store.status.get(), ConnectionStatus::Connecting);
        assert_eq!(transport.calls(), vec![TransportCall::Open]);
    }

    #[test]
    fn connect_is_noop_when_connected() {
        let (manager, transport, _) = manager();
        manager.on_connected();
        manager.connect();
        assert!(transport.calls().is_empty());
        assert!(manager.is_connected());
    }

    #[test]
    fn disconnect_is_noop_when_disconnected() {
        let (manager, transport, _) = manager();
        manager.disconnect();
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn disconnect_closes_when_connected() {
        let (manager, transport, _) = manager();
        manager.on_connected();
        manager.disconnect();
        assert_eq!(transport.calls(), vec![TransportCall::Close]);
    }

    #[test]
    fn connected_clears_error_and_disconnect_keeps_it() {
        let (manager, _, _) = manager();
        manager.on_error("boom".into());
        assert_eq!(manager.connection_error().as_deref(), Some("boom"));

        manager.on_disconnected();
        assert_eq!(manager.connection_error().as_deref(), Some("boom"));

        manager.on_connected();
        assert_eq!(manager.connection_error(), None);
        assert_eq!(manager.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn error_leaves_status_unchanged() {
        let (manager, _, _) = manager();
        manager.on_connected();
        manager.on_error("server hiccup".into());
        assert!(manager.is_connected());
    }

    #[test]
    fn reconnecting_reads_as_connecting() {
        let (manager, _, _) = manager();
        manager.on_connected();
        manager.on_disconnected();
        manager.on_reconnecting(1, 1);
        assert_eq!(manager.status(), ConnectionStatus::Connecting);
    }

    #[test]
    fn failed_open_is_absorbed() {
        let (manager, transport, store) = manager();
        transport.fail_next();
        manager.connect();
        assert_eq!(store.status.get(), ConnectionStatus::Disconnected);
        assert!(manager.connection_error().is_some());
    }

    #[test]
    fn emit_payload_serializes() {
        let (manager, transport, _) = manager();
        manager.emit_payload("voting-started", &serde_json::json!({"roomId": "r1"}));
        assert_eq!(
            transport.calls(),
            vec![TransportCall::Emit {
                event: "voting-started".into(),
                data: serde_json::json!({"roomId": "r1"}),
            }]
        );
    }
}
