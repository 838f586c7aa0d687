//! Plain-text rendering of the session snapshot and session events.

use pokersync_sync::{
    consensus_message, vote_distribution, vote_spread, Phase, Role, SessionEvent, SessionStore,
    View,
};

pub fn describe_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Navigate(View::Lobby) => "-- lobby --".to_string(),
        SessionEvent::Navigate(View::Voting) => "-- voting board --".to_string(),
        SessionEvent::Navigate(View::Results) => "-- results --".to_string(),
        SessionEvent::VotingStarted => "Voting has started. Pick a card with 'vote <card>'.".into(),
        SessionEvent::ResultsRevealed => "Votes revealed.".to_string(),
        SessionEvent::UserJoined { name } => format!("👋 {name} joined the room"),
        SessionEvent::UserLeft { name } => format!("{name} left the room"),
        SessionEvent::Error(message) => format!("error: {message}"),
    }
}

fn role_tag(role: Role) -> &'static str {
    match role {
        Role::Moderator => " (moderator)",
        Role::Player => "",
        Role::Observer => " (observer)",
    }
}

/// Full room overview for the `status` command.
pub fn status_lines(store: &SessionStore) -> Vec<String> {
    let mut lines = vec![format!("connection: {}", store.status.get().label())];
    if let Some(error) = store.connection_error.get() {
        lines.push(format!("last error: {error}"));
    }

    let Some(room) = store.current_room.get() else {
        lines.push("not in a room".to_string());
        return lines;
    };

    let phase = store.effective_phase();
    lines.push(format!("room: {} [{}]", room.name, room.code));
    lines.push(format!("phase: {}", phase.label()));
    if let Some(user) = store.current_user.get() {
        lines.push(format!("you: {}{}", user.name, role_tag(user.role)));
    }

    lines.push(format!(
        "participants ({} players, {} observers):",
        store.player_count(),
        store.observer_count()
    ));
    for p in &room.participants {
        let marker = match (phase, store.participant_vote(&p.id)) {
            (Phase::Revealed, Some(value)) => format!(" -> {value}"),
            (_, Some(_)) => " ✓".to_string(),
            (Phase::Voting, None) if p.role == Role::Player => " …".to_string(),
            _ => String::new(),
        };
        let offline = if p.is_connected { "" } else { " [offline]" };
        lines.push(format!("  {}{}{}{}", p.name, role_tag(p.role), offline, marker));
    }

    if phase == Phase::Voting {
        lines.push(format!(
            "votes: {}/{} ({:.0}%)",
            store.voted_count(),
            store.player_count(),
            store.voting_progress()
        ));
        lines.push(format!("deck: {}", room.deck.cards.join(" ")));
    }

    lines.extend(results_lines(store));
    lines
}

/// Results summary, empty until a reveal.
pub fn results_lines(store: &SessionStore) -> Vec<String> {
    let Some(results) = store.voting_results.get() else {
        return Vec::new();
    };
    let votes = if results.votes.is_empty() {
        store.current_votes.get()
    } else {
        results.votes.clone()
    };

    let mut lines = vec![
        format!(
            "results: average {:.1}, median {}, spread {}",
            results.average,
            results.median,
            vote_spread(&votes)
        ),
        consensus_message(&votes).to_string(),
    ];
    for group in vote_distribution(&votes) {
        let star = if group.is_popular { " *" } else { "" };
        lines.push(format!(
            "  {:>3}: {} vote(s), {}%{} ({})",
            group.value,
            group.count,
            group.percentage,
            star,
            group.voters.join(", ")
        ));
    }
    lines
}
