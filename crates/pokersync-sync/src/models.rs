//! Session data model shared by the store, the synchronizer and the wire.
//!
//! Field names follow the server's camelCase JSON. Every optional or
//! server-defaulted field carries `serde(default)` so partial room
//! snapshots still decode.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::aggregation::format_number;

/// Cards offered by the default Fibonacci deck.
pub const DEFAULT_DECK_CARDS: [&str; 13] = [
    "0", "1", "2", "3", "5", "8", "13", "21", "34", "55", "89", "?", "☕",
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Room phase: waiting (pre-vote), voting (open), revealed (tallied).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Voting,
    Revealed,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Waiting => "Waiting to Start",
            Phase::Voting => "Voting in Progress",
            Phase::Revealed => "Votes Revealed",
        }
    }
}

/// Participant role. Exactly one moderator per room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Moderator,
    #[default]
    Player,
    Observer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Moderator => "moderator",
            Role::Player => "player",
            Role::Observer => "observer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "moderator" => Ok(Role::Moderator),
            "player" => Ok(Role::Player),
            "observer" => Ok(Role::Observer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Participants & rooms
// ---------------------------------------------------------------------------

/// A member of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            is_connected: true,
            avatar: None,
        }
    }

    /// Upper-cased first letter of the name, for avatar placeholders.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

/// The ordered set of selectable card labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub cards: Vec<String>,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            name: "Fibonacci".into(),
            cards: DEFAULT_DECK_CARDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Deck {
    pub fn contains(&self, card: &str) -> bool {
        self.cards.iter().any(|c| c == card)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomSettings {
    pub auto_reveal: bool,
    pub allow_observers: bool,
    pub timer_enabled: bool,
    /// Seconds.
    pub timer_duration: u32,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            auto_reveal: false,
            allow_observers: true,
            timer_enabled: false,
            timer_duration: 300,
        }
    }
}

/// A story under estimation. Story tracking is reserved; only the
/// `story-updated` intent and `Room::current_story` carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_results: Option<VotingResults>,
}

/// One planning-poker room: the root aggregate of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub moderator_id: String,
    /// Join order.
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_story: Option<Story>,
    #[serde(default)]
    pub deck: Deck,
    #[serde(rename = "votingPhase", alias = "phase", default)]
    pub phase: Phase,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub settings: RoomSettings,
}

impl Room {
    /// A copy of this room with a different phase. The original is untouched.
    pub fn with_phase(&self, phase: Phase) -> Room {
        Room {
            phase,
            ..self.clone()
        }
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.participants.iter().filter(|p| p.role == role).count()
    }
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// A single submitted card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub value: String,
    #[serde(default)]
    pub story_id: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Vote {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        value: impl Into<String>,
        story_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            value: value.into(),
            story_id: story_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate produced by a reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingResults {
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default)]
    pub average: f64,
    #[serde(default = "zero_string", deserialize_with = "string_or_number")]
    pub median: String,
    #[serde(default)]
    pub consensus: bool,
    #[serde(default)]
    pub story_id: String,
}

impl Default for VotingResults {
    fn default() -> Self {
        Self {
            votes: Vec::new(),
            average: 0.0,
            median: zero_string(),
            consensus: false,
            story_id: String::new(),
        }
    }
}

fn zero_string() -> String {
    "0".to_string()
}

/// Accept a median sent either as `"6.5"` or as `6.5`.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => format_number(n),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn room_json() -> serde_json::Value {
        json!({
            "id": "r1",
            "code": "ABC123",
            "name": "Sprint 23 Planning",
            "moderatorId": "u1",
            "participants": [
                {"id": "u1", "name": "Sarah", "role": "moderator", "isConnected": true},
                {"id": "u2", "name": "alex", "role": "player", "isConnected": false}
            ],
            "deck": {"name": "Fibonacci", "cards": ["1", "2", "3"]},
            "votingPhase": "voting",
            "createdAt": "2024-05-01T10:00:00Z",
            "settings": {"autoReveal": true, "allowObservers": false, "timerEnabled": false, "timerDuration": 120}
        })
    }

    #[test]
    fn room_decodes_from_camel_case() {
        let room: Room = serde_json::from_value(room_json()).unwrap();
        assert_eq!(room.code, "ABC123");
        assert_eq!(room.moderator_id, "u1");
        assert_eq!(room.phase, Phase::Voting);
        assert_eq!(room.participants.len(), 2);
        assert_eq!(room.participants[0].role, Role::Moderator);
        assert!(!room.participants[1].is_connected);
        assert!(room.settings.auto_reveal);
        assert_eq!(room.settings.timer_duration, 120);
    }

    #[test]
    fn room_serializes_phase_as_voting_phase() {
        let room: Room = serde_json::from_value(room_json()).unwrap();
        let value = serde_json::to_value(&room).unwrap();
        assert_eq!(value["votingPhase"], "voting");
        assert!(value.get("phase").is_none());
        assert_eq!(value["moderatorId"], "u1");
    }

    #[test]
    fn minimal_room_uses_defaults() {
        let room: Room =
            serde_json::from_value(json!({"id": "1", "code": "ABC123", "name": "Test Room"}))
                .unwrap();
        assert_eq!(room.phase, Phase::Waiting);
        assert!(room.participants.is_empty());
        assert_eq!(room.deck, Deck::default());
        assert_eq!(room.settings, RoomSettings::default());
    }

    #[test]
    fn phase_alias_is_accepted() {
        let room: Room =
            serde_json::from_value(json!({"id": "1", "code": "ABC123", "phase": "revealed"}))
                .unwrap();
        assert_eq!(room.phase, Phase::Revealed);
    }

    #[test]
    fn with_phase_leaves_original_untouched() {
        let room: Room = serde_json::from_value(room_json()).unwrap();
        let revealed = room.with_phase(Phase::Revealed);
        assert_eq!(room.phase, Phase::Voting);
        assert_eq!(revealed.phase, Phase::Revealed);
        assert_eq!(revealed.participants, room.participants);
    }

    #[test]
    fn role_counts() {
        let room: Room = serde_json::from_value(room_json()).unwrap();
        assert_eq!(room.count_role(Role::Player), 1);
        assert_eq!(room.count_role(Role::Observer), 0);
        assert_eq!(room.participant("u2").unwrap().initial(), "A");
    }

    #[test]
    fn default_deck_is_fibonacci() {
        let deck = Deck::default();
        assert_eq!(deck.name, "Fibonacci");
        assert_eq!(deck.cards.len(), 13);
        assert!(deck.contains("☕"));
        assert!(deck.contains("?"));
        assert!(!deck.contains("4"));
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Observer".parse::<Role>().unwrap(), Role::Observer);
        assert_eq!(" player ".parse::<Role>().unwrap(), Role::Player);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Moderator.to_string(), "moderator");
    }

    #[test]
    fn median_accepts_number_or_string() {
        let r: VotingResults = serde_json::from_value(json!({"median": 6.5})).unwrap();
        assert_eq!(r.median, "6.5");
        let r: VotingResults = serde_json::from_value(json!({"median": "5"})).unwrap();
        assert_eq!(r.median, "5");
        let r: VotingResults = serde_json::from_value(json!({})).unwrap();
        assert_eq!(r.median, "0");
    }

    #[test]
    fn vote_round_trips_camel_case_keys() {
        let vote = Vote::new("u1", "Sarah", "8", "simple-voting");
        let value = serde_json::to_value(&vote).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["userName"], "Sarah");
        assert_eq!(value["storyId"], "simple-voting");
        assert!(value["timestamp"].is_string());
    }
}
