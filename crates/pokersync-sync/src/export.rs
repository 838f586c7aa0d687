//! JSON export of a revealed round.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::aggregation::{vote_distribution, VoteGroup};
use crate::models::Role;
use crate::store::SessionStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsExport {
    pub session_info: SessionInfo,
    pub results: ResultsSummary,
    pub votes: Vec<ExportedVote>,
    pub vote_distribution: Vec<VoteGroup>,
    pub participants: Vec<ExportedParticipant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub room_name: String,
    pub room_code: String,
    pub date: DateTime<Utc>,
    pub story: Option<StoryInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryInfo {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
    pub consensus: bool,
    pub average: f64,
    pub median: String,
    pub total_votes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedVote {
    pub voter: String,
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedParticipant {
    pub name: String,
    pub role: Role,
    pub voted: bool,
}

impl ResultsExport {
    /// Snapshot the current round. `None` without a room or results.
    ///
    /// Votes come from the results; when the reveal carried no vote list,
    /// the last broadcast vote set is used instead.
    pub fn build(store: &SessionStore, now: DateTime<Utc>) -> Option<Self> {
        let room = store.current_room.get()?;
        let results = store.voting_results.get()?;

        let votes = if results.votes.is_empty() {
            store.current_votes.get()
        } else {
            results.votes.clone()
        };

        Some(Self {
            session_info: SessionInfo {
                room_name: room.name.clone(),
                room_code: room.code.clone(),
                date: now,
                story: room.current_story.as_ref().map(|story| StoryInfo {
                    title: story.title.clone(),
                    description: story.description.clone(),
                }),
            },
            results: ResultsSummary {
                consensus: results.consensus,
                average: results.average,
                median: results.median.clone(),
                total_votes: votes.len(),
            },
            votes: votes
                .iter()
                .map(|vote| ExportedVote {
                    voter: vote.user_name.clone(),
                    value: vote.value.clone(),
                    timestamp: vote.timestamp,
                })
                .collect(),
            vote_distribution: vote_distribution(&votes),
            participants: room
                .participants
                .iter()
                .map(|p| ExportedParticipant {
                    name: p.name.clone(),
                    role: p.role,
                    voted: store.has_voted(&p.id),
                })
                .collect(),
        })
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the pretty-printed document to `path`.
    pub fn write_to(&self, path: &Path) -> pokersync_common::Result<()> {
        let json = self.to_json_pretty()?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

/// `pokersync-results-<CODE>-<YYYY-MM-DD>.json`
pub fn export_file_name(code: &str, date: NaiveDate) -> String {
    format!("pokersync-results-{code}-{}.json", date.format("%Y-%m-%d"))
}
