//! Wire protocol for the estimation server.
//!
//! Every frame is a JSON envelope `{"event": <name>, "data": <payload>}`
//! (see `realtime::Envelope`). This module names the events and defines
//! the payloads that ride inside the envelope. Inbound payloads are
//! decoded leniently: servers in the wild send several of them either
//! wrapped in an object or bare.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Participant, Role, Room, Story, Vote, VotingResults};

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

pub mod events {
    // Connection (synthesized locally from transport state)
    pub const CONNECT: &str = "connect";
    pub const DISCONNECT: &str = "disconnect";

    // Room management
    pub const JOIN_ROOM: &str = "join-room";
    pub const LEAVE_ROOM: &str = "leave-room";
    pub const ROOM_JOINED: &str = "room-joined";
    pub const ROOM_LEFT: &str = "room-left";
    pub const ROOM_UPDATED: &str = "room-updated";

    // Voting
    pub const SUBMIT_VOTE: &str = "submit-vote";
    pub const VOTE_SUBMITTED: &str = "vote-submitted";
    pub const REVEAL_VOTES: &str = "reveal-votes";
    pub const VOTES_REVEALED: &str = "votes-revealed";
    pub const VOTING_STARTED: &str = "voting-started";

    // Stories
    pub const STORY_CHANGED: &str = "story-changed";
    pub const STORY_UPDATED: &str = "story-updated";

    // Users
    pub const USER_JOINED: &str = "user-joined";
    pub const USER_LEFT: &str = "user-left";
    pub const USER_UPDATED: &str = "user-updated";

    pub const ERROR: &str = "error";
}

// ---------------------------------------------------------------------------
// Outbound payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_code: String,
    pub user_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVotePayload {
    pub vote: String,
    pub story_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingStartedPayload {
    pub room_id: String,
}

/// `story-updated` carries the story object itself.
pub type StoryUpdatedPayload = Story;

// ---------------------------------------------------------------------------
// Inbound payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RoomJoinedPayload {
    pub room: Room,
    pub user: Participant,
}

/// `room-updated`: `{room}` or a bare room.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoomPayload {
    Wrapped { room: Room },
    Bare(Room),
}

impl RoomPayload {
    pub fn into_room(self) -> Room {
        match self {
            RoomPayload::Wrapped { room } | RoomPayload::Bare(room) => room,
        }
    }
}

/// `vote-submitted`: `{votes}` or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VotesPayload {
    Wrapped { votes: Vec<Vote> },
    Bare(Vec<Vote>),
}

impl VotesPayload {
    pub fn into_votes(self) -> Vec<Vote> {
        match self {
            VotesPayload::Wrapped { votes } | VotesPayload::Bare(votes) => votes,
        }
    }
}

/// Results as broadcast by a reveal. `votes` stays optional so an absent
/// list can be told apart from an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevealedResults {
    pub votes: Option<Vec<Vote>>,
    pub average: f64,
    #[serde(deserialize_with = "revealed_median")]
    pub median: Option<String>,
    pub consensus: bool,
    pub story_id: String,
}

fn revealed_median<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    crate::models::string_or_number(deserializer).map(Some)
}

impl RevealedResults {
    pub fn to_results(&self) -> VotingResults {
        VotingResults {
            votes: self.votes.clone().unwrap_or_default(),
            average: self.average,
            median: self.median.clone().unwrap_or_else(|| "0".to_string()),
            consensus: self.consensus,
            story_id: self.story_id.clone(),
        }
    }
}

/// `votes-revealed`: `{results}` or a bare results object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResultsPayload {
    Wrapped { results: RevealedResults },
    Bare(RevealedResults),
}

impl ResultsPayload {
    pub fn into_results(self) -> RevealedResults {
        match self {
            ResultsPayload::Wrapped { results } | ResultsPayload::Bare(results) => results,
        }
    }
}

/// `user-joined` / `user-left`: `{user}` or a bare participant.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserPayload {
    Wrapped { user: Participant },
    Bare(Participant),
}

impl UserPayload {
    pub fn into_user(self) -> Participant {
        match self {
            UserPayload::Wrapped { user } | UserPayload::Bare(user) => user,
        }
    }
}

/// Human-readable message from an `error` payload.
///
/// Accepts a bare string or an object with a `message` field.
pub fn error_message(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        Value::Null => "Unknown error".to_string(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => data.to_string(),
        },
        other => other.to_string(),
    }
}
