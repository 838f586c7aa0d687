//! Frame encoding and decoding for the `{"event", "data"}` envelope.

use tracing::{debug, warn};

use super::types::{Envelope, TransportEvent};
use crate::protocol::events;

/// Decode one inbound text frame into a transport event.
///
/// Unparseable frames are dropped. `connect` and `disconnect` are
/// reserved for locally synthesized transport state and are never
/// accepted from the wire.
pub(crate) fn decode_frame(text: &str) -> Option<TransportEvent> {
    let envelope = match serde_json::from_str::<Envelope>(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!(error = %e, text = %text, "Unrecognized frame from server");
            return None;
        }
    };

    match envelope.event.as_str() {
        events::CONNECT | events::DISCONNECT => {
            debug!(event = %envelope.event, "Ignoring reserved event from server");
            None
        }
        _ => {
            debug!(event = %envelope.event, "Frame received");
            Some(TransportEvent::Message {
                event: envelope.event,
                data: envelope.data,
            })
        }
    }
}

/// Encode an outbound envelope as a text frame.
pub(crate) fn encode_frame(envelope: &Envelope) -> Option<String> {
    match serde_json::to_string(envelope) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(error = %e, event = %envelope.event, "Failed to encode frame");
            None
        }
    }
}
