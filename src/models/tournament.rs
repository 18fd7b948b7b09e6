//! Tournament and TournamentStatus.

use crate::models::game::Match;
use crate::models::player::Player;
use crate::models::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = String;

/// `Active` until every match is completed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Active,
    Completed,
}

/// A single-elimination tournament: roster snapshot plus the flat, round-ordered bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    /// Roster snapshot taken at creation; stats are updated as matches complete.
    pub players: Vec<Player>,
    /// Insertion order is generation order (round 1 first).
    pub matches: Vec<Match>,
    pub status: TournamentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Player>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    /// UI-only state, stored and returned untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_view: Option<String>,
}

impl Tournament {
    /// Create an active tournament from a roster snapshot and a generated bracket.
    pub fn new(players: Vec<Player>, matches: Vec<Match>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            players,
            matches,
            status: TournamentStatus::Active,
            winner: None,
            created_at,
            completed_at: None,
            current_view: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TournamentStatus::Active
    }

    pub fn get_match(&self, id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    /// Whether `player_id` is in the roster snapshot.
    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// Number of rounds in the bracket.
    pub fn round_count(&self) -> u32 {
        self.matches.iter().map(|m| m.round).max().unwrap_or(0)
    }
}
