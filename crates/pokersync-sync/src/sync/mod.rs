//! Event synchronizer and phase coordinator.
//!
//! Turns inbound protocol events into store writes and local user
//! actions into outbound protocol events. The synchronizer is the single
//! writer of the room, user, votes and results fields.

mod phase;
mod registry;
mod synchronizer;


pub use phase::{PhaseCoordinator, SessionEvent, View};
pub use registry::HandlerRegistry;
pub use synchronizer::{EventSynchronizer, SyncSettings, ROOM_CREATION_FAILED};
