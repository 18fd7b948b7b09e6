//! Player data and the BYE sentinel.

use crate::models::error::EngineError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable, opaque player identifier (unique within a group).
pub type PlayerId = String;

/// Id of the BYE sentinel that pads odd-sized brackets.
pub const BYE_ID: &str = "bye";

/// Rating every new player starts from.
pub const DEFAULT_MMR: i32 = 1000;

/// A player in a group roster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredPlayer")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub mmr: i32,
    pub peak_mmr: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Player as found in stored documents, before the rating invariants are checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPlayer {
    id: PlayerId,
    name: String,
    #[serde(default)]
    wins: u32,
    #[serde(default)]
    losses: u32,
    mmr: Option<i32>,
    peak_mmr: Option<i32>,
    #[serde(default)]
    avatar: Option<String>,
}

impl TryFrom<StoredPlayer> for Player {
    type Error = EngineError;

    /// A missing rating is the seed; a missing peak is the best of the rating and the seed.
    fn try_from(stored: StoredPlayer) -> Result<Self, Self::Error> {
        let mmr = stored.mmr.unwrap_or(DEFAULT_MMR);
        let peak_mmr = stored.peak_mmr.unwrap_or(mmr.max(DEFAULT_MMR));
        if mmr < 0 || peak_mmr < mmr {
            return Err(EngineError::InvalidPlayerRating);
        }
        Ok(Self {
            id: stored.id,
            name: stored.name,
            wins: stored.wins,
            losses: stored.losses,
            mmr,
            peak_mmr,
            avatar: stored.avatar,
        })
    }
}

impl Player {
    /// Create a new player with the given name, a fresh id and the seed rating.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name)
    }

    /// Create a player with a caller-chosen id (imports, tests).
    pub fn with_id(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            wins: 0,
            losses: 0,
            mmr: DEFAULT_MMR,
            peak_mmr: DEFAULT_MMR,
            avatar: None,
        }
    }

    /// The sentinel opponent used to balance odd brackets. Never accrues stats.
    pub fn bye() -> Self {
        Self::with_id(BYE_ID, "BYE")
    }

    pub fn is_bye(&self) -> bool {
        self.id == BYE_ID
    }

    /// Record a win for this player. No-op for the BYE sentinel.
    pub fn add_win(&mut self) {
        if !self.is_bye() {
            self.wins += 1;
        }
    }

    /// Record a loss for this player. No-op for the BYE sentinel.
    pub fn add_loss(&mut self) {
        if !self.is_bye() {
            self.losses += 1;
        }
    }

    /// Set a new rating, clamped at zero, and raise the peak if needed.
    pub fn set_mmr(&mut self, mmr: i32) {
        self.mmr = mmr.max(0);
        self.peak_mmr = self.peak_mmr.max(self.mmr);
    }
}
