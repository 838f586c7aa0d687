//! Session state store: the local snapshot of one session.
//!
//! Each field is an independently observable cell. Reads always see the
//! most recent write; there is no cross-field transaction. Only code in
//! this crate writes (the connection manager owns the connection fields,
//! the synchronizer owns everything else).

use std::sync::Arc;
use std::time::Instant;

use pokersync_common::Notification;
use tokio::sync::watch;

use crate::models::{Participant, Phase, Role, Room, Vote, VotingResults};

// ---------------------------------------------------------------------------
// Observable
// ---------------------------------------------------------------------------

/// A value cell that notifies subscribers on every write.
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx }
    }

    /// Clone of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub(crate) fn set(&self, value: T) {
        self.tx.send_replace(value);
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Observable").field(&*self.tx.borrow()).finish()
    }
}

// ---------------------------------------------------------------------------
// Connection status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SessionStore {
    pub status: Observable<ConnectionStatus>,
    pub connection_error: Observable<Option<String>>,

    pub current_room: Observable<Option<Arc<Room>>>,
    pub current_user: Observable<Option<Participant>>,
    pub current_votes: Observable<Vec<Vote>>,
    pub voting_results: Observable<Option<VotingResults>>,

    /// Optimistic phase set by a local intent; dropped on the next
    /// authoritative room write.
    pub provisional_phase: Observable<Option<Phase>>,

    pub creating_room: Observable<bool>,
    pub joining_room: Observable<bool>,
    pub submitting_vote: Observable<bool>,
    pub has_submitted_vote: Observable<bool>,

    pub notice: Observable<Option<Notification>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.status.get() == ConnectionStatus::Connected
    }

    /// Drop everything tied to the current room.
    pub(crate) fn clear_session(&self) {
        self.current_room.set(None);
        self.current_user.set(None);
        self.current_votes.set(Vec::new());
        self.voting_results.set(None);
        self.provisional_phase.set(None);
        self.has_submitted_vote.set(false);
    }

    /// Cancel every in-flight local action.
    pub(crate) fn clear_pending(&self) {
        self.creating_room.set(false);
        self.joining_room.set(false);
        self.submitting_vote.set(false);
    }

    // -- derived queries -----------------------------------------------------

    /// The provisional phase if one is set, else the room's phase.
    pub fn effective_phase(&self) -> Phase {
        if let Some(phase) = self.provisional_phase.get() {
            return phase;
        }
        self.current_room
            .with(|room| room.as_ref().map(|r| r.phase))
            .unwrap_or_default()
    }

    pub fn participants(&self) -> Vec<Participant> {
        self.current_room
            .with(|room| room.as_ref().map(|r| r.participants.clone()))
            .unwrap_or_default()
    }

    fn count_role(&self, role: Role) -> usize {
        self.current_room
            .with(|room| room.as_ref().map(|r| r.count_role(role)))
            .unwrap_or(0)
    }

    pub fn player_count(&self) -> usize {
        self.count_role(Role::Player)
    }

    pub fn observer_count(&self) -> usize {
        self.count_role(Role::Observer)
    }

    fn current_role(&self) -> Option<Role> {
        self.current_user.with(|user| user.as_ref().map(|u| u.role))
    }

    pub fn is_current_user_moderator(&self) -> bool {
        self.current_role() == Some(Role::Moderator)
    }

    /// Only players pick cards.
    pub fn can_vote(&self) -> bool {
        self.current_role() == Some(Role::Player)
    }

    /// A round needs at least two players.
    pub fn can_start_voting(&self) -> bool {
        self.player_count() > 1
    }

    pub fn has_voted(&self, user_id: &str) -> bool {
        self.current_votes
            .with(|votes| votes.iter().any(|v| v.user_id == user_id))
    }

    pub fn participant_vote(&self, user_id: &str) -> Option<String> {
        self.current_votes.with(|votes| {
            votes
                .iter()
                .find(|v| v.user_id == user_id)
                .map(|v| v.value.clone())
        })
    }

    pub fn voted_count(&self) -> usize {
        self.current_votes.with(Vec::len)
    }

    /// Percentage of players who have voted, 0 when there are no players.
    pub fn voting_progress(&self) -> f64 {
        let players = self.player_count();
        if players == 0 {
            return 0.0;
        }
        self.voted_count() as f64 / players as f64 * 100.0
    }

    /// The current notice, unless its TTL has run out.
    pub fn active_notice(&self) -> Option<Notification> {
        self.active_notice_at(Instant::now())
    }

    pub fn active_notice_at(&self, now: Instant) -> Option<Notification> {
        self.notice
            .get()
            .filter(|notice| !notice.is_expired_at(now))
    }
}
