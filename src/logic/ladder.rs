//! MMR mode for a group: record, edit and delete ladder matches.

use crate::logic::rating::{recalculate_match, record_match};
use crate::models::{EngineError, Group, MmrMatch, Score, Side};
use chrono::{DateTime, Utc};

/// Record a ladder match between two roster players and store the updated ratings.
pub fn record_mmr_match(
    group: &mut Group,
    player1_id: &str,
    player2_id: &str,
    score: Score,
    k_factor: i32,
    now: DateTime<Utc>,
) -> Result<MmrMatch, EngineError> {
    let player1 = group.get_player(player1_id)?;
    let player2 = group.get_player(player2_id)?;
    let mut recorded = record_match(player1, player2, score, k_factor, now)?;
    recorded.mmr_match.room_id = Some(group.id.clone());

    group.store_players([recorded.updated_player1, recorded.updated_player2]);
    group.mmr_matches.push(recorded.mmr_match.clone());
    log::debug!(
        "group {}: ladder match {} recorded ({:+} / {:+})",
        group.id,
        recorded.mmr_match.id,
        recorded.mmr_match.mmr_change.player1_change,
        recorded.mmr_match.mmr_change.player2_change
    );
    Ok(recorded.mmr_match)
}

/// Correct the winner/score of a ladder match.
///
/// Each player's rating moves by the difference between the new and old delta,
/// and wins/losses are swapped if the winner changed. Later matches keep their
/// original deltas.
pub fn edit_mmr_match(
    group: &mut Group,
    match_id: &str,
    new_winner_id: &str,
    score: Score,
    k_factor: i32,
) -> Result<MmrMatch, EngineError> {
    let existing = group.get_mmr_match(match_id)?.clone();
    let edited = recalculate_match(&existing, &group.players, new_winner_id, score, k_factor)?;
    let winner_changed = existing.winner.id != edited.winner.id;

    for side in [Side::Player1, Side::Player2] {
        let (id, old, new) = match side {
            Side::Player1 => (
                &existing.player1.id,
                existing.mmr_change.player1_change,
                edited.mmr_change.player1_change,
            ),
            Side::Player2 => (
                &existing.player2.id,
                existing.mmr_change.player2_change,
                edited.mmr_change.player2_change,
            ),
        };
        let player = group.get_player_mut(id)?;
        let rating = player.mmr - old + new;
        player.set_mmr(rating);
        if winner_changed {
            if *id == edited.winner.id {
                player.losses = player.losses.saturating_sub(1);
                player.add_win();
            } else {
                player.wins = player.wins.saturating_sub(1);
                player.add_loss();
            }
        }
    }

    if let Some(stored) = group.mmr_matches.iter_mut().find(|m| m.id == match_id) {
        *stored = edited.clone();
    }
    log::debug!("group {}: ladder match {} edited", group.id, match_id);
    Ok(edited)
}

/// Drop a ladder match from the log. Ratings and win/loss counts are left as they are.
pub fn delete_mmr_match(group: &mut Group, match_id: &str) -> Result<MmrMatch, EngineError> {
    let idx = group
        .mmr_matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or_else(|| EngineError::UnknownMatch(match_id.to_string()))?;
    log::debug!("group {}: ladder match {} deleted", group.id, match_id);
    Ok(group.mmr_matches.remove(idx))
}
