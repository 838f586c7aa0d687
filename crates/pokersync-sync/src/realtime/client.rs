//! Public handle for interacting with the realtime connection.

use pokersync_common::SyncError;
use tokio::sync::mpsc;

use super::connection::connection_loop;
use super::types::{Envelope, RealtimeCommand, RealtimeConfig, TransportEvent};
use crate::connection::Transport;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Handle for interacting with the realtime connection.
///
/// All methods are non-blocking and send commands to the background
/// connection task. The task is spawned once, here, and stays idle until
/// the first `open`.
#[derive(Clone)]
pub struct RealtimeClient {
    command_tx: mpsc::UnboundedSender<RealtimeCommand>,
}

impl RealtimeClient {
    /// Create a new client and spawn its background task.
    /// Returns `(client, event_receiver)`. Must be called inside a tokio runtime.
    pub fn spawn(config: RealtimeConfig) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity.max(1));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tokio::spawn(connection_loop(config, event_tx, command_rx));

        (Self { command_tx }, event_rx)
    }

    fn send(&self, cmd: RealtimeCommand) -> Result<(), SyncError> {
        self.command_tx
            .send(cmd)
            .map_err(|_| SyncError::ChannelClosed)
    }
}

impl Transport for RealtimeClient {
    fn open(&self) -> Result<(), SyncError> {
        self.send(RealtimeCommand::Open)
    }

    fn close(&self) -> Result<(), SyncError> {
        self.send(RealtimeCommand::Close)
    }

    fn emit(&self, event: &str, data: serde_json::Value) -> Result<(), SyncError> {
        self.send(RealtimeCommand::Emit(Envelope {
            event: event.to_string(),
            data,
        }))
    }
}
