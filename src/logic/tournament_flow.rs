//! Tournament mode for a group: start a bracket, record results, crown a champion.

use crate::logic::bracket::{
    advance, apply_result_to_roster, generate_bracket, is_bracket_complete, overall_winner,
};
use crate::models::{EngineError, Group, Match, Score, Tournament, TournamentStatus};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Start a tournament with the group's whole roster. Only one may be active at a time.
pub fn start_tournament<R: Rng + ?Sized>(
    group: &mut Group,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    if group.active_tournament().is_some() {
        return Err(EngineError::TournamentAlreadyActive);
    }
    let matches = generate_bracket(&group.players, rng, now)?;
    let tournament = Tournament::new(group.players.clone(), matches, now);
    log::debug!(
        "group {}: tournament {} started with {} players over {} rounds",
        group.id,
        tournament.id,
        tournament.players.len(),
        tournament.round_count()
    );
    group.tournaments.push(tournament);
    Ok(())
}

/// Record a match of the active tournament and update the stats of both participants.
///
/// Stats go to the tournament's roster snapshot and to the group roster. When
/// the last match completes the tournament is closed and its winner chosen
/// from the snapshot by most wins, then fewest losses.
pub fn record_tournament_match(
    group: &mut Group,
    match_id: &str,
    winner_id: &str,
    score: Score,
    now: DateTime<Utc>,
) -> Result<Match, EngineError> {
    let tournament = group
        .active_tournament_mut()
        .ok_or(EngineError::NoActiveTournament)?;
    let completed = record_result(tournament, match_id, winner_id, score, now)?;
    let finished = tournament.winner.clone().filter(|_| !tournament.is_active());
    let tournament_id = tournament.id.clone();

    group.players = apply_result_to_roster(&group.players, &completed);
    log::debug!(
        "group {}: {} won {} ({}-{})",
        group.id,
        winner_id,
        match_id,
        score.player1_score,
        score.player2_score
    );
    if let Some(champion) = finished {
        log::info!(
            "group {}: tournament {} completed, winner {}",
            group.id,
            tournament_id,
            champion.name
        );
    }
    Ok(completed)
}

/// Advance one tournament's bracket; returns the match as completed.
pub fn record_result(
    tournament: &mut Tournament,
    match_id: &str,
    winner_id: &str,
    score: Score,
    now: DateTime<Utc>,
) -> Result<Match, EngineError> {
    if !tournament.is_active() {
        return Err(EngineError::NoActiveTournament);
    }
    if tournament.get_match(match_id).is_none() {
        return Err(EngineError::UnknownMatch(match_id.to_string()));
    }
    let winner = tournament
        .players
        .iter()
        .find(|p| p.id == winner_id)
        .cloned()
        .ok_or_else(|| EngineError::PlayerNotFound(winner_id.to_string()))?;

    let matches = advance(&tournament.matches, match_id, &winner, score, now)?;
    let completed = matches
        .iter()
        .find(|m| m.id == match_id)
        .cloned()
        .ok_or_else(|| EngineError::UnknownMatch(match_id.to_string()))?;

    tournament.matches = matches;
    tournament.players = apply_result_to_roster(&tournament.players, &completed);
    if is_bracket_complete(&tournament.matches) {
        tournament.status = TournamentStatus::Completed;
        tournament.winner = overall_winner(&tournament.players);
        tournament.completed_at = Some(now);
    }
    Ok(completed)
}
