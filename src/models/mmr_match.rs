//! Ladder (MMR) match record: append-only log entry with the rating deltas it applied.

use crate::models::game::Score;
use crate::models::player::Player;
use crate::models::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rating deltas applied by one ladder match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MmrChange {
    pub player1_change: i32,
    pub player2_change: i32,
    pub player1_new_mmr: i32,
    pub player2_new_mmr: i32,
}

/// One recorded ladder match. Player fields are snapshots taken before the match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MmrMatch {
    pub id: String,
    pub player1: Player,
    pub player2: Player,
    pub winner: Player,
    pub score: Score,
    pub mmr_change: MmrChange,
    #[serde(with = "timestamp")]
    pub completed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

impl MmrMatch {
    /// Delta this match applied to `player_id`, if they took part.
    pub fn change_for(&self, player_id: &str) -> Option<i32> {
        if self.player1.id == player_id {
            Some(self.mmr_change.player1_change)
        } else if self.player2.id == player_id {
            Some(self.mmr_change.player2_change)
        } else {
            None
        }
    }
}
