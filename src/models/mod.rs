//! Data structures: players, bracket matches, tournaments, ladder matches, groups.

mod error;
mod game;
mod group;
mod mmr_match;
mod player;
pub mod timestamp;
mod tournament;

pub use error::EngineError;
pub use game::{match_id, parse_match_id, Match, MatchId, MatchStatus, Score, Side};
pub use group::{Group, GroupId};
pub use mmr_match::{MmrChange, MmrMatch};
pub use player::{Player, PlayerId, BYE_ID, DEFAULT_MMR};
pub use tournament::{Tournament, TournamentId, TournamentStatus};
