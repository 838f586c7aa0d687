//! Phase coordinator: tracks the current view and publishes
//! navigation-level side effects.

use pokersync_common::EventBus;
use tokio::sync::{broadcast, watch};

use crate::store::Observable;

/// The screen a client should be showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Lobby,
    Voting,
    Results,
}

/// Transient side effects for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Navigate(View),
    VotingStarted,
    ResultsRevealed,
    UserJoined { name: String },
    UserLeft { name: String },
    Error(String),
}

pub struct PhaseCoordinator {
    view: Observable<View>,
    bus: EventBus<SessionEvent>,
}

impl PhaseCoordinator {
    pub fn new(capacity: usize) -> Self {
        Self {
            view: Observable::new(View::Lobby),
            bus: EventBus::new(capacity),
        }
    }

    /// The last view navigated to.
    pub fn view(&self) -> View {
        self.view.get()
    }

    pub fn watch_view(&self) -> watch::Receiver<View> {
        self.view.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.bus.subscribe()
    }

    pub(crate) fn navigate(&self, view: View) {
        self.view.set(view);
        self.bus.publish(SessionEvent::Navigate(view));
    }

    pub(crate) fn publish(&self, event: SessionEvent) {
        self.bus.publish(event);
    }
}
