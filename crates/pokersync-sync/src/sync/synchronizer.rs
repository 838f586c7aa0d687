//! Event synchronizer: inbound events in, store writes and outbound
//! intents out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pokersync_common::{normalize_room_code, Notification};
use pokersync_config::SessionConfig;
use serde::de::IgnoredAny;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::phase::{PhaseCoordinator, SessionEvent, View};
use super::registry::HandlerRegistry;
use crate::connection::ConnectionManager;
use crate::models::{Phase, Role, Story};
use crate::protocol::{
    error_message, events, JoinRoomPayload, ResultsPayload, RoomJoinedPayload, RoomPayload,
    SubmitVotePayload, UserPayload, VotesPayload, VotingStartedPayload,
};
use crate::realtime::TransportEvent;
use crate::rooms::{default_room_name, RoomProvider};
use crate::store::SessionStore;

/// Shown when the room provider fails.
pub const ROOM_CREATION_FAILED: &str = "Failed to create room. Please try again.";

/// Session-level knobs taken from the `[session]` config section.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub story_id: String,
    pub notice_ttl: Duration,
    pub event_channel_capacity: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for SyncSettings {
    fn from(session: &SessionConfig) -> Self {
        Self {
            story_id: session.story_id.clone(),
            notice_ttl: Duration::from_millis(session.notice_ttl_ms),
            event_channel_capacity: session.event_channel_capacity,
        }
    }
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Single writer of the session snapshot.
///
/// Inbound events go through [`handle_event`](Self::handle_event); local
/// user actions go through the intent methods. Intents are fire-and-forget:
/// their outcome shows up in the store once the server answers.
pub struct EventSynchronizer {
    store: Arc<SessionStore>,
    connection: Arc<ConnectionManager>,
    coordinator: PhaseCoordinator,
    settings: SyncSettings,
    registry: HandlerRegistry<EventSynchronizer>,
    /// Bumped by `leave_room`; async intents started under an older
    /// generation drop their follow-up.
    generation: AtomicU64,
}

impl EventSynchronizer {
    pub fn new(
        store: Arc<SessionStore>,
        connection: Arc<ConnectionManager>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            store,
            connection,
            coordinator: PhaseCoordinator::new(settings.event_channel_capacity),
            settings,
            registry: Self::handlers(),
            generation: AtomicU64::new(0),
        }
    }

    fn handlers() -> HandlerRegistry<Self> {
        HandlerRegistry::new()
            .on(events::CONNECT, |s: &Self, _: IgnoredAny| s.on_connect())
            .on(events::DISCONNECT, |s: &Self, _: IgnoredAny| s.on_disconnect())
            .on(events::ERROR, Self::on_error)
            .on(events::ROOM_JOINED, Self::on_room_joined)
            .on(events::ROOM_UPDATED, Self::on_room_updated)
            .on(events::VOTING_STARTED, |s: &Self, _: IgnoredAny| {
                s.on_voting_started()
            })
            .on(events::VOTE_SUBMITTED, Self::on_vote_submitted)
            .on(events::VOTES_REVEALED, Self::on_votes_revealed)
            .on(events::USER_JOINED, Self::on_user_joined)
            .on(events::USER_LEFT, Self::on_user_left)
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    pub fn coordinator(&self) -> &PhaseCoordinator {
        &self.coordinator
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn view(&self) -> View {
        self.coordinator.view()
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.coordinator.subscribe()
    }

    // -- inbound -------------------------------------------------------------

    /// Feed one transport event through the dispatch table.
    pub fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.dispatch(events::CONNECT, Value::Null),
            TransportEvent::Disconnected => self.dispatch(events::DISCONNECT, Value::Null),
            TransportEvent::Reconnecting {
                attempt,
                delay_secs,
            } => self.connection.on_reconnecting(attempt, delay_secs),
            TransportEvent::Error(message) => {
                self.dispatch(events::ERROR, Value::String(message))
            }
            TransportEvent::Message { event, data } => self.dispatch(&event, data),
        }
    }

    /// Run the handler registered for `event`, if any.
    pub fn dispatch(&self, event: &str, data: Value) {
        self.registry.dispatch(self, event, data);
    }

    fn on_connect(&self) {
        self.connection.on_connected();
    }

    fn on_disconnect(&self) {
        self.connection.on_disconnected();
    }

    fn on_error(&self, data: Value) {
        let message = error_message(&data);
        self.connection.on_error(message.clone());
        self.store.clear_pending();
        self.coordinator.publish(SessionEvent::Error(message));
    }

    fn on_room_joined(&self, payload: RoomJoinedPayload) {
        let RoomJoinedPayload { room, user } = payload;
        info!(room = %room.code, user = %user.name, role = %user.role, "Joined room");

        let phase = room.phase;
        self.store.provisional_phase.set(None);
        self.store.current_room.set(Some(Arc::new(room)));
        self.store.current_user.set(Some(user));
        self.store.creating_room.set(false);
        self.store.joining_room.set(false);
        self.connection.clear_error();

        if phase == Phase::Voting {
            self.coordinator.navigate(View::Voting);
        }
    }

    fn on_room_updated(&self, payload: RoomPayload) {
        let room = payload.into_room();
        debug!(room = %room.code, phase = ?room.phase, "Room updated");

        let phase = room.phase;
        self.store.provisional_phase.set(None);
        self.store.current_room.set(Some(Arc::new(room)));

        if phase == Phase::Voting && self.coordinator.view() == View::Lobby {
            self.coordinator.navigate(View::Voting);
        }
    }

    fn on_voting_started(&self) {
        self.store.provisional_phase.set(None);

        let Some(room) = self.store.current_room.get() else {
            debug!("voting-started without a room, ignoring");
            return;
        };
        self.store
            .current_room
            .set(Some(Arc::new(room.with_phase(Phase::Voting))));
        self.store.has_submitted_vote.set(false);

        self.coordinator.navigate(View::Voting);
        self.coordinator.publish(SessionEvent::VotingStarted);
    }

    fn on_vote_submitted(&self, payload: VotesPayload) {
        let votes = payload.into_votes();
        debug!(count = votes.len(), "Votes updated");
        self.store.current_votes.set(votes);
        self.store.submitting_vote.set(false);
    }

    fn on_votes_revealed(&self, payload: ResultsPayload) {
        let revealed = payload.into_results();
        self.store.voting_results.set(Some(revealed.to_results()));
        if let Some(votes) = revealed.votes {
            self.store.current_votes.set(votes);
        }

        self.coordinator.navigate(View::Results);
        self.coordinator.publish(SessionEvent::ResultsRevealed);
    }

    fn on_user_joined(&self, payload: UserPayload) {
        let user = payload.into_user();
        let is_self = self
            .store
            .current_user
            .with(|me| me.as_ref().is_some_and(|me| me.id == user.id));
        if is_self {
            return;
        }

        info!(user = %user.name, "User joined");
        self.store.notice.set(Some(Notification::info(
            format!("{} joined the room", user.name),
            self.settings.notice_ttl,
        )));
        self.coordinator
            .publish(SessionEvent::UserJoined { name: user.name });
    }

    fn on_user_left(&self, payload: UserPayload) {
        let user = payload.into_user();
        info!(user = %user.name, "User left");
        self.coordinator
            .publish(SessionEvent::UserLeft { name: user.name });
    }

    // -- outbound intents ----------------------------------------------------

    pub fn join_room(&self, code: &str, user_name: &str, role: Role) {
        let payload = JoinRoomPayload {
            room_code: normalize_room_code(code),
            user_name: user_name.trim().to_string(),
            role,
        };
        info!(room = %payload.room_code, user = %payload.user_name, %role, "Joining room");
        self.store.joining_room.set(true);
        self.connection.emit_payload(events::JOIN_ROOM, &payload);
    }

    /// Leave the room. Local state is cleared whether or not the server
    /// ever hears about it.
    pub fn leave_room(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.connection.emit(events::LEAVE_ROOM, Value::Null);
        self.store.clear_session();
        self.store.clear_pending();
        self.coordinator.navigate(View::Lobby);
    }

    pub fn submit_vote(&self, value: &str, story_id: &str) {
        self.store.submitting_vote.set(true);
        self.store.has_submitted_vote.set(true);
        self.connection.emit_payload(
            events::SUBMIT_VOTE,
            &SubmitVotePayload {
                vote: value.to_string(),
                story_id: story_id.to_string(),
            },
        );
    }

    pub fn reveal_votes(&self) {
        self.connection.emit(events::REVEAL_VOTES, Value::Null);
    }

    pub fn emit_voting_started(&self, room_id: &str) {
        self.connection.emit_payload(
            events::VOTING_STARTED,
            &VotingStartedPayload {
                room_id: room_id.to_string(),
            },
        );
    }

    /// Start a round: flip to voting provisionally and tell the server.
    pub fn start_voting(&self) {
        let Some(room) = self.store.current_room.get() else {
            warn!("start_voting() without a room");
            return;
        };
        self.store.provisional_phase.set(Some(Phase::Voting));
        self.emit_voting_started(&room.id);
        self.coordinator.navigate(View::Voting);
    }

    /// Start another round after a reveal.
    pub fn start_new_round(&self) {
        self.store.has_submitted_vote.set(false);
        self.start_voting();
    }

    /// Reopen card selection. Nothing is sent until the next `submit_vote`.
    pub fn change_vote(&self) {
        self.store.has_submitted_vote.set(false);
    }

    pub fn update_story(&self, story: &Story) {
        self.connection.emit_payload(events::STORY_UPDATED, story);
    }

    pub fn dismiss_error(&self) {
        self.connection.clear_error();
    }

    /// Create a room through `provider`, then join it as moderator.
    pub async fn create_room(&self, provider: &dyn RoomProvider, moderator_name: &str) {
        self.store.creating_room.set(true);
        self.connection.clear_error();

        let generation = self.generation.load(Ordering::SeqCst);
        let room_name = default_room_name();
        let created = provider.create_room(&room_name, moderator_name).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            info!("Left before room creation finished, not joining");
            return;
        }

        match created {
            Ok(room) => {
                info!(room = %room.code, name = %room.name, "Room created");
                self.join_room(&room.code, moderator_name, Role::Moderator);
            }
            Err(e) => {
                warn!(error = %e, "Room creation failed");
                self.connection.on_error(ROOM_CREATION_FAILED.to_string());
                self.store.creating_room.set(false);
            }
        }
    }
}
