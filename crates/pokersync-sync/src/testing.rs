//! In-memory transport double.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use pokersync_common::SyncError;
use serde_json::Value;

use crate::connection::Transport;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TransportCall {
    Open,
    Close,
    Emit { event: String, data: Value },
}

/// Records every call instead of touching the network.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    calls: Mutex<Vec<TransportCall>>,
    fail_next: AtomicBool,
}

impl RecordingTransport {
    pub(crate) fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Emitted events as `(name, data)` pairs, in order.
    pub(crate) fn emitted(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Emit { event, data } => Some((event, data)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn emitted_names(&self) -> Vec<String> {
        self.emitted().into_iter().map(|(event, _)| event).collect()
    }

    /// Make the next call fail with `ChannelClosed`.
    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: TransportCall) -> Result<(), SyncError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SyncError::ChannelClosed);
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl Transport for RecordingTransport {
    fn open(&self) -> Result<(), SyncError> {
        self.record(TransportCall::Open)
    }

    fn close(&self) -> Result<(), SyncError> {
        self.record(TransportCall::Close)
    }

    fn emit(&self, event: &str, data: Value) -> Result<(), SyncError> {
        self.record(TransportCall::Emit {
            event: event.to_string(),
            data,
        })
    }
}
