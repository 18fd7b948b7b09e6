//! Elo-style MMR: per-match rating deltas for the ladder.

use crate::models::{EngineError, MmrChange, MmrMatch, Player, Score, Side};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// K-factor used when the caller does not configure one.
pub const DEFAULT_K_FACTOR: i32 = 32;

/// Probability that a player rated `rating_a` beats one rated `rating_b`.
pub fn expected_score(rating_a: i32, rating_b: i32) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf(f64::from(rating_b - rating_a) / 400.0))
}

/// Rating delta for A after a single game against B (rounded half away from zero).
pub fn compute_rating_change(rating_a: i32, rating_b: i32, a_won: bool, k_factor: i32) -> i32 {
    let actual = if a_won { 1.0 } else { 0.0 };
    (f64::from(k_factor) * (actual - expected_score(rating_a, rating_b))).round() as i32
}

/// Output of [`record_match`]: the log entry plus both players with stats applied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedMatch {
    pub mmr_match: MmrMatch,
    pub updated_player1: Player,
    pub updated_player2: Player,
}

/// Score a ladder match and apply it to both players.
///
/// Ratings are floored at zero; the stored change is the delta actually applied,
/// so a later [`recalculate_match`] can reverse it exactly.
pub fn record_match(
    player1: &Player,
    player2: &Player,
    score: Score,
    k_factor: i32,
    now: DateTime<Utc>,
) -> Result<RecordedMatch, EngineError> {
    if player1.id == player2.id {
        return Err(EngineError::SamePlayer);
    }
    let winner_side = score.leader().ok_or(EngineError::InvalidScore)?;
    let mmr_change = rate(player1.mmr, player2.mmr, winner_side, k_factor);

    let mut updated_player1 = player1.clone();
    let mut updated_player2 = player2.clone();
    updated_player1.set_mmr(mmr_change.player1_new_mmr);
    updated_player2.set_mmr(mmr_change.player2_new_mmr);
    match winner_side {
        Side::Player1 => {
            updated_player1.add_win();
            updated_player2.add_loss();
        }
        Side::Player2 => {
            updated_player2.add_win();
            updated_player1.add_loss();
        }
    }

    let winner = match winner_side {
        Side::Player1 => player1.clone(),
        Side::Player2 => player2.clone(),
    };
    let mmr_match = MmrMatch {
        id: Uuid::new_v4().to_string(),
        player1: player1.clone(),
        player2: player2.clone(),
        winner,
        score,
        mmr_change,
        completed_at: now,
        room_id: None,
    };

    Ok(RecordedMatch {
        mmr_match,
        updated_player1,
        updated_player2,
    })
}

/// Recompute an edited match against the ratings both players had before it.
///
/// Base ratings are each player's current rating minus the change the match
/// originally applied. Matches recorded afterwards are NOT recomputed, so the
/// result is only exact when `existing` is the latest match for both players.
pub fn recalculate_match(
    existing: &MmrMatch,
    players: &[Player],
    new_winner_id: &str,
    score: Score,
    k_factor: i32,
) -> Result<MmrMatch, EngineError> {
    let current = |id: &str| {
        players
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::PlayerNotFound(id.to_string()))
    };
    let current1 = current(&existing.player1.id)?;
    let current2 = current(&existing.player2.id)?;

    let winner_side = if new_winner_id == existing.player1.id {
        Side::Player1
    } else if new_winner_id == existing.player2.id {
        Side::Player2
    } else {
        return Err(EngineError::PlayerNotFound(new_winner_id.to_string()));
    };
    if score.leader() != Some(winner_side) {
        return Err(EngineError::InvalidScore);
    }

    let applied = |player: &Player| {
        existing
            .change_for(&player.id)
            .ok_or_else(|| EngineError::PlayerNotFound(player.id.clone()))
    };
    let base1 = current1.mmr - applied(current1)?;
    let base2 = current2.mmr - applied(current2)?;
    let mmr_change = rate(base1, base2, winner_side, k_factor);

    let winner = match winner_side {
        Side::Player1 => existing.player1.clone(),
        Side::Player2 => existing.player2.clone(),
    };
    Ok(MmrMatch {
        winner,
        score,
        mmr_change,
        ..existing.clone()
    })
}

/// Both players' deltas from their own perspective, floor-clamped at zero.
fn rate(rating1: i32, rating2: i32, winner: Side, k_factor: i32) -> MmrChange {
    let change1 = compute_rating_change(rating1, rating2, winner == Side::Player1, k_factor);
    let change2 = compute_rating_change(rating2, rating1, winner == Side::Player2, k_factor);
    let new1 = (rating1 + change1).max(0);
    let new2 = (rating2 + change2).max(0);
    MmrChange {
        player1_change: new1 - rating1,
        player2_change: new2 - rating2,
        player1_new_mmr: new1,
        player2_new_mmr: new2,
    }
}
