//! Dispatch table from inbound event name to a typed handler.

use std::collections::HashMap;

use pokersync_common::SyncError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

type Handler<C> = Box<dyn Fn(&C, Value) + Send + Sync>;

/// Handlers keyed by event name, built once at startup.
///
/// Each handler declares the payload type it wants. A payload that does
/// not decode is logged and dropped, so handlers only ever see
/// well-formed input and never report errors back to the transport.
pub struct HandlerRegistry<C> {
    handlers: HashMap<&'static str, Handler<C>>,
}

impl<C> Default for HandlerRegistry<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C: 'static> HandlerRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`, replacing any previous one.
    pub fn on<T, F>(mut self, event: &'static str, handler: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(&C, T) + Send + Sync + 'static,
    {
        let wrapped = move |ctx: &C, data: Value| match serde_json::from_value::<T>(data) {
            Ok(payload) => handler(ctx, payload),
            Err(e) => {
                let err = SyncError::Decode {
                    event: event.to_string(),
                    message: e.to_string(),
                };
                warn!(error = %err, "Dropping undecodable payload");
            }
        };
        self.handlers.insert(event, Box::new(wrapped));
        self
    }

    /// Run the handler for `event`. Returns `false` if none is registered.
    pub fn dispatch(&self, ctx: &C, event: &str, data: Value) -> bool {
        match self.handlers.get(event) {
            Some(handler) => {
                handler(ctx, data);
                true
            }
            None => {
                debug!(event, "No handler registered, ignoring");
                false
            }
        }
    }

    pub fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
