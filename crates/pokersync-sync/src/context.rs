//! One place that owns every session component.

use std::sync::Arc;

use pokersync_config::PokerSyncConfig;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

use crate::connection::{ConnectionManager, Transport};
use crate::realtime::{RealtimeClient, RealtimeConfig, TransportEvent};
use crate::store::SessionStore;
use crate::sync::{EventSynchronizer, SessionEvent, SyncSettings};

/// Owns the store, the transport, the connection manager and the
/// synchronizer. Built once per process and passed by reference.
pub struct SessionContext {
    config: PokerSyncConfig,
    store: Arc<SessionStore>,
    connection: Arc<ConnectionManager>,
    synchronizer: EventSynchronizer,
}

impl SessionContext {
    /// Build the context on a real WebSocket transport.
    ///
    /// The returned receiver yields every transport event; the caller's
    /// driver loop passes each one to [`handle_event`](Self::handle_event).
    /// Opens the connection right away when `server.auto_connect` is set.
    pub fn start(config: PokerSyncConfig) -> (Self, mpsc::Receiver<TransportEvent>) {
        let realtime = RealtimeConfig::from(&config.server)
            .with_event_channel_capacity(config.session.event_channel_capacity);
        let (client, events) = RealtimeClient::spawn(realtime);

        let context = Self::with_transport(config, Arc::new(client));
        if context.config.server.auto_connect {
            context.connection.connect();
        }
        (context, events)
    }

    /// Build the context on any transport. Does not connect.
    pub fn with_transport(config: PokerSyncConfig, transport: Arc<dyn Transport>) -> Self {
        let store = Arc::new(SessionStore::new());
        let connection = Arc::new(ConnectionManager::new(transport, Arc::clone(&store)));
        let synchronizer = EventSynchronizer::new(
            Arc::clone(&store),
            Arc::clone(&connection),
            SyncSettings::from(&config.session),
        );
        info!(server = %config.server.url, "Session context ready");

        Self {
            config,
            store,
            connection,
            synchronizer,
        }
    }

    pub fn config(&self) -> &PokerSyncConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn synchronizer(&self) -> &EventSynchronizer {
        &self.synchronizer
    }

    pub fn handle_event(&self, event: TransportEvent) {
        self.synchronizer.handle_event(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.synchronizer.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ConnectionStatus;
    use crate::testing::{RecordingTransport, TransportCall};

    #[test]
    fn components_share_one_store() {
        let transport = Arc::new(RecordingTransport::default());
        let context = SessionContext::with_transport(PokerSyncConfig::default(), transport.clone());

        context.connection().connect();
        assert_eq!(transport.calls(), vec![TransportCall::Open]);
        assert_eq!(context.store().status.get(), ConnectionStatus::Connecting);

        context.handle_event(TransportEvent::Connected);
        assert!(context.synchronizer().store().is_connected());
        assert!(context.connection().is_connected());
    }

    #[test]
    fn settings_follow_session_config() {
        let mut config = PokerSyncConfig::default();
        config.session.story_id = "story-42".into();
        config.session.notice_ttl_ms = 500;
        let context =
            SessionContext::with_transport(config, Arc::new(RecordingTransport::default()));

        let settings = context.synchronizer().settings();
        assert_eq!(settings.story_id, "story-42");
        assert_eq!(settings.notice_ttl.as_millis(), 500);
    }

    #[tokio::test]
    async fn start_without_auto_connect_stays_idle() {
        let mut config = PokerSyncConfig::default();
        config.server.auto_connect = false;
        let (context, _events) = SessionContext::start(config);
        assert_eq!(context.store().status.get(), ConnectionStatus::Disconnected);
    }
}
