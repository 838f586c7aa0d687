//! Real-time session synchronization for PokerSync.
//!
//! Keeps one client's view of a shared estimation session (room, roster,
//! votes, phase, results) consistent with the server across drops and
//! reconnects. The pieces, leaves first:
//!
//! - [`aggregation`]: pure vote aggregation.
//! - [`store`]: observable session snapshot.
//! - [`realtime`]: WebSocket transport with reconnect and heartbeat.
//! - [`connection`]: connection manager over the [`Transport`] seam.
//! - [`sync`]: event synchronizer and phase coordinator.
//! - [`context`]: owns all of the above for one process.

pub mod aggregation;
pub mod connection;
pub mod context;
pub mod export;
pub mod models;
pub mod protocol;
pub mod realtime;
pub mod rooms;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregation::{
    calculate_results, consensus_message, vote_distribution, vote_spread, VoteGroup,
};
pub use connection::{ConnectionManager, Transport};
pub use context::SessionContext;
pub use export::{export_file_name, ResultsExport};
pub use models::{Deck, Participant, Phase, Role, Room, RoomSettings, Story, Vote, VotingResults};
pub use realtime::{RealtimeClient, RealtimeConfig, TransportEvent};
pub use rooms::{default_room_name, LocalRoomProvider, RoomProvider};
pub use store::{ConnectionStatus, Observable, SessionStore};
pub use sync::{EventSynchronizer, SessionEvent, SyncSettings, View};
