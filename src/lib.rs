//! Table tennis group manager: library with models, the bracket and MMR engines, and group flows.

pub mod logic;
pub mod models;

pub use logic::{
    advance, apply_result_to_roster, compute_rating_change, delete_mmr_match, edit_mmr_match,
    expected_score, generate_bracket, is_bracket_complete, leaderboard, leaderboard_csv,
    next_playable_match, overall_winner, recalculate_match, record_match, record_mmr_match,
    record_result, record_tournament_match, resolve_byes, start_tournament, LeaderboardEntry,
    RecordedMatch, DEFAULT_K_FACTOR,
};
pub use models::{
    match_id, parse_match_id, EngineError, Group, GroupId, Match, MatchId, MatchStatus, MmrChange,
    MmrMatch, Player, PlayerId, Score, Side, Tournament, TournamentId,
    TournamentStatus, BYE_ID, DEFAULT_MMR,
};
