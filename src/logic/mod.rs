//! Business logic: bracket and rating engines, plus the group-level flows built on them.

mod bracket;
mod ladder;
mod leaderboard;
mod rating;
mod tournament_flow;

pub use bracket::{
    advance, apply_result_to_roster, generate_bracket, is_bracket_complete, next_playable_match,
    overall_winner, resolve_byes,
};
pub use ladder::{delete_mmr_match, edit_mmr_match, record_mmr_match};
pub use leaderboard::{leaderboard, leaderboard_csv, LeaderboardEntry};
pub use rating::{
    compute_rating_change, expected_score, recalculate_match, record_match, RecordedMatch,
    DEFAULT_K_FACTOR,
};
pub use tournament_flow::{record_result, record_tournament_match, start_tournament};
