//! Room creation.

use async_trait::async_trait;
use chrono::Utc;
use pokersync_common::{new_id, new_room_code, SyncError};
use rand::Rng;

use crate::models::{Deck, Participant, Phase, Role, Room, RoomSettings};

/// Creates rooms before the client joins them over the realtime channel.
#[async_trait]
pub trait RoomProvider: Send + Sync {
    async fn create_room(
        &self,
        room_name: &str,
        moderator_name: &str,
    ) -> pokersync_common::Result<Room>;
}

/// Builds rooms locally; the server learns about the room from the
/// subsequent `join-room`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalRoomProvider;

#[async_trait]
impl RoomProvider for LocalRoomProvider {
    async fn create_room(
        &self,
        room_name: &str,
        moderator_name: &str,
    ) -> pokersync_common::Result<Room> {
        let moderator_name = moderator_name.trim();
        if moderator_name.is_empty() {
            return Err(SyncError::RoomCreation("moderator name is required".into()).into());
        }

        let moderator = Participant::new(new_id(), moderator_name, Role::Moderator);
        Ok(Room {
            id: new_id(),
            code: new_room_code(),
            name: room_name.to_string(),
            moderator_id: moderator.id.clone(),
            participants: vec![moderator],
            current_story: None,
            deck: Deck::default(),
            phase: Phase::Waiting,
            created_at: Utc::now(),
            settings: RoomSettings::default(),
        })
    }
}

/// `"Sprint N Planning"` with N in 1..=100.
pub fn default_room_name() -> String {
    let n = rand::thread_rng().gen_range(1..=100);
    format!("Sprint {n} Planning")
}
