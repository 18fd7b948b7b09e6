//! Tournament match, its slots, score and status.

use crate::models::error::EngineError;
use crate::models::player::Player;
use crate::models::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deterministic match id: `round-<R>-match-<I>` (R 1-based, I 0-based slot in the round).
pub type MatchId = String;

/// Build the id of the match in `round` at 0-based `slot`.
pub fn match_id(round: u32, slot: usize) -> MatchId {
    format!("round-{}-match-{}", round, slot)
}

/// Parse `(round, slot)` back out of a match id.
pub fn parse_match_id(id: &str) -> Option<(u32, usize)> {
    let rest = id.strip_prefix("round-")?;
    let (round, slot) = rest.split_once("-match-")?;
    Some((round.parse().ok()?, slot.parse().ok()?))
}

/// One of the two slots of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    /// Slot a winner from feeder `slot` takes in the next round: even feeds player1, odd player2.
    pub fn for_feeder(slot: usize) -> Self {
        if slot % 2 == 0 {
            Side::Player1
        } else {
            Side::Player2
        }
    }
}

/// Match lifecycle. `InProgress` is part of the stored format but never set by the engine.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Final score of a 1v1 match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub player1_score: u32,
    pub player2_score: u32,
}

impl Score {
    /// Validate raw scores from the boundary: both must be non-negative.
    pub fn new(player1_score: i64, player2_score: i64) -> Result<Self, EngineError> {
        let p1 = u32::try_from(player1_score).map_err(|_| EngineError::InvalidScore)?;
        let p2 = u32::try_from(player2_score).map_err(|_| EngineError::InvalidScore)?;
        Ok(Self {
            player1_score: p1,
            player2_score: p2,
        })
    }

    /// Side with the higher score; `None` on a tie.
    pub fn leader(&self) -> Option<Side> {
        match self.player1_score.cmp(&self.player2_score) {
            std::cmp::Ordering::Greater => Some(Side::Player1),
            std::cmp::Ordering::Less => Some(Side::Player2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A single bracket match. Later-round slots stay `None` until a feeder completes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Player>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    pub status: MatchStatus,
    pub round: u32,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    pub fn new(round: u32, slot: usize, player1: Option<Player>, player2: Option<Player>) -> Self {
        Self {
            id: match_id(round, slot),
            player1,
            player2,
            winner: None,
            score: None,
            status: MatchStatus::Pending,
            round,
            completed_at: None,
        }
    }

    /// 0-based slot index within the round, parsed from the id.
    pub fn slot_index(&self) -> Option<usize> {
        parse_match_id(&self.id).map(|(_, slot)| slot)
    }

    pub fn player(&self, side: Side) -> Option<&Player> {
        match side {
            Side::Player1 => self.player1.as_ref(),
            Side::Player2 => self.player2.as_ref(),
        }
    }

    pub fn set_player(&mut self, side: Side, player: Player) {
        match side {
            Side::Player1 => self.player1 = Some(player),
            Side::Player2 => self.player2 = Some(player),
        }
    }

    /// Which side `player_id` occupies, if any.
    pub fn side_of(&self, player_id: &str) -> Option<Side> {
        [Side::Player1, Side::Player2]
            .into_iter()
            .find(|&side| self.player(side).is_some_and(|p| p.id == player_id))
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn has_bye(&self) -> bool {
        self.player1.as_ref().is_some_and(Player::is_bye)
            || self.player2.as_ref().is_some_and(Player::is_bye)
    }

    /// Pending, both slots filled, neither a BYE.
    pub fn is_playable(&self) -> bool {
        self.status == MatchStatus::Pending
            && self.player1.is_some()
            && self.player2.is_some()
            && !self.has_bye()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_id_round_trips_through_parser() {
        assert_eq!(match_id(3, 12), "round-3-match-12");
        assert_eq!(parse_match_id("round-3-match-12"), Some((3, 12)));
    }

    #[test]
    fn malformed_ids_do_not_parse() {
        assert_eq!(parse_match_id("match-1"), None);
        assert_eq!(parse_match_id("round-x-match-1"), None);
        assert_eq!(parse_match_id("round-1-match-"), None);
    }

    #[test]
    fn feeder_parity_picks_slot() {
        assert_eq!(Side::for_feeder(0), Side::Player1);
        assert_eq!(Side::for_feeder(3), Side::Player2);
    }

    #[test]
    fn score_rejects_negative_values() {
        assert_eq!(Score::new(-1, 3), Err(EngineError::InvalidScore));
        assert_eq!(Score::new(11, 9).unwrap().leader(), Some(Side::Player1));
        assert_eq!(Score::new(7, 7).unwrap().leader(), None);
    }

    #[test]
    fn status_uses_kebab_case() {
        let json = serde_json::to_string(&MatchStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn placeholder_slots_serialize_as_null() {
        let m = Match::new(2, 0, None, None);
        let v = serde_json::to_value(&m).unwrap();
        assert!(v["player1"].is_null());
        assert_eq!(v["status"], "pending");
        assert!(v.get("completedAt").is_none());
    }
}
