//! Single-elimination bracket: generation, advancement, BYE resolution.
//!
//! All functions are pure: they take the current bracket and return a new one.
//! Round 1 pairs shuffled players `(0,1), (2,3), ...`; every later round has
//! `ceil(previous / 2)` slots until a single final remains. The winner of slot
//! `i` in round `r` moves to slot `i / 2` of round `r + 1`, as player1 when `i`
//! is even and player2 when odd.
//!
//! BYEs never reach the user. A round-1 match against the BYE sentinel, and a
//! later slot with only one feeder (it gets a BYE as player2), completes as
//! soon as its real player is known, with no score and no stats.

use crate::models::{match_id, EngineError, Match, MatchStatus, Player, Score, Side};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;

/// Build a bracket for `players`. Seeding is a fresh shuffle every call.
pub fn generate_bracket<R: Rng + ?Sized>(
    players: &[Player],
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<Vec<Match>, EngineError> {
    if players.len() < 2 {
        return Err(EngineError::InsufficientPlayers);
    }

    let mut seeded = players.to_vec();
    seeded.shuffle(rng);
    if seeded.len() % 2 == 1 {
        seeded.push(Player::bye());
    }

    let mut matches: Vec<Match> = seeded
        .chunks_exact(2)
        .enumerate()
        .map(|(slot, pair)| Match::new(1, slot, Some(pair[0].clone()), Some(pair[1].clone())))
        .collect();

    let mut round = 1;
    let mut slots = matches.len();
    while slots > 1 {
        let feeders = slots;
        slots = (feeders + 1) / 2;
        round += 1;
        for slot in 0..slots {
            let mut m = Match::new(round, slot, None, None);
            // Last slot after an odd round only has one feeder.
            if 2 * slot + 1 >= feeders {
                m.player2 = Some(Player::bye());
            }
            matches.push(m);
        }
    }

    resolve_byes(matches, now)
}

/// Record `winner` for `match_id` and move them into the next round.
///
/// The match must be pending with two real players, `winner` must be one of
/// them, and `score` must favour the winner.
pub fn advance(
    matches: &[Match],
    match_id: &str,
    winner: &Player,
    score: Score,
    now: DateTime<Utc>,
) -> Result<Vec<Match>, EngineError> {
    let idx = matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or_else(|| EngineError::UnknownMatch(match_id.to_string()))?;
    let target = &matches[idx];
    if !target.is_playable() {
        return Err(EngineError::InvalidMatchState);
    }
    let side = target
        .side_of(&winner.id)
        .ok_or(EngineError::InvalidMatchState)?;
    if score.leader() != Some(side) {
        return Err(EngineError::InvalidScore);
    }
    let slot = target.slot_index().ok_or(EngineError::InvalidMatchState)?;
    let round = target.round;

    let mut next = matches.to_vec();
    complete(&mut next[idx], winner.clone(), Some(score), now);
    promote(&mut next, round, slot, winner);
    resolve_byes(next, now)
}

/// Complete every pending match that pits a real player against a BYE, cascading forward.
pub fn resolve_byes(mut matches: Vec<Match>, now: DateTime<Utc>) -> Result<Vec<Match>, EngineError> {
    while let Some(idx) = matches.iter().position(is_walkover) {
        let m = &matches[idx];
        let winner = [m.player1.as_ref(), m.player2.as_ref()]
            .into_iter()
            .flatten()
            .find(|p| !p.is_bye())
            .cloned()
            .ok_or(EngineError::InvalidMatchState)?;
        let slot = m.slot_index().ok_or(EngineError::InvalidMatchState)?;
        let round = m.round;
        complete(&mut matches[idx], winner.clone(), None, now);
        promote(&mut matches, round, slot, &winner);
    }
    Ok(matches)
}

/// Pending, both slots filled, exactly one of them the BYE.
fn is_walkover(m: &Match) -> bool {
    match (&m.player1, &m.player2) {
        (Some(p1), Some(p2)) => m.status == MatchStatus::Pending && p1.is_bye() != p2.is_bye(),
        _ => false,
    }
}

fn complete(m: &mut Match, winner: Player, score: Option<Score>, now: DateTime<Utc>) {
    m.status = MatchStatus::Completed;
    m.winner = Some(winner);
    m.score = score;
    m.completed_at = Some(now);
}

/// Place `winner` of `(round, slot)` into its next-round slot. No-op after the final.
fn promote(matches: &mut [Match], round: u32, slot: usize, winner: &Player) {
    let next_id = match_id(round + 1, slot / 2);
    if let Some(next) = matches.iter_mut().find(|m| m.id == next_id) {
        next.set_player(Side::for_feeder(slot), winner.clone());
    }
}

/// First pending match with two real players, in bracket order.
pub fn next_playable_match(matches: &[Match]) -> Option<&Match> {
    matches.iter().find(|m| m.is_playable())
}

/// True once every match in a non-empty bracket is completed.
pub fn is_bracket_complete(matches: &[Match]) -> bool {
    !matches.is_empty() && matches.iter().all(Match::is_completed)
}

/// Roster with a completed match's result applied: winner +1 win, the other participant +1 loss.
pub fn apply_result_to_roster(players: &[Player], completed: &Match) -> Vec<Player> {
    let Some(winner) = completed.winner.as_ref() else {
        return players.to_vec();
    };
    players
        .iter()
        .cloned()
        .map(|mut p| {
            if p.id == winner.id {
                p.add_win();
            } else if completed.side_of(&p.id).is_some() {
                p.add_loss();
            }
            p
        })
        .collect()
}

/// Overall champion: most wins, ties broken by fewest losses, then roster order.
pub fn overall_winner(players: &[Player]) -> Option<Player> {
    let mut best: Option<&Player> = None;
    for p in players.iter().filter(|p| !p.is_bye()) {
        let better = match best {
            None => true,
            Some(b) => (p.wins, Reverse(p.losses)) > (b.wins, Reverse(b.losses)),
        };
        if better {
            best = Some(p);
        }
    }
    best.cloned()
}
