//! Errors reported by the bracket and rating engines and the group aggregate.

use crate::models::player::PlayerId;

/// Every precondition violation is reported as one of these; nothing is retried.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EngineError {
    /// Bracket generation needs at least 2 players.
    InsufficientPlayers,
    /// Match is already completed, has an unresolved participant, or the winner is not in it.
    InvalidMatchState,
    /// No match with this id in the supplied collection.
    UnknownMatch(String),
    /// A rating match names the same player on both sides.
    SamePlayer,
    /// Negative, tied, or winner-inconsistent scores.
    InvalidScore,
    /// Player not found in the roster.
    PlayerNotFound(PlayerId),
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// Player name is empty after trimming.
    InvalidPlayerName,
    /// Stored rating is negative, or the peak is below the current rating.
    InvalidPlayerRating,
    /// A roster player uses the id reserved for the BYE sentinel.
    ReservedPlayerId,
    /// The group already has an active tournament.
    TournamentAlreadyActive,
    /// The group has no active tournament.
    NoActiveTournament,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InsufficientPlayers => write!(f, "Need at least 2 players for a tournament"),
            EngineError::InvalidMatchState => write!(f, "Match cannot be recorded in its current state"),
            EngineError::UnknownMatch(id) => write!(f, "Match {} not found", id),
            EngineError::SamePlayer => write!(f, "A player cannot play against themselves"),
            EngineError::InvalidScore => write!(f, "Scores must be non-negative and not tied"),
            EngineError::PlayerNotFound(id) => write!(f, "Player {} not found", id),
            EngineError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            EngineError::InvalidPlayerName => write!(f, "Player name cannot be empty"),
            EngineError::InvalidPlayerRating => {
                write!(f, "Rating must be non-negative and not above the peak rating")
            }
            EngineError::ReservedPlayerId => write!(f, "Player id is reserved for the BYE"),
            EngineError::TournamentAlreadyActive => write!(f, "A tournament is already in progress"),
            EngineError::NoActiveTournament => write!(f, "No tournament in progress"),
        }
    }
}

impl std::error::Error for EngineError {}
