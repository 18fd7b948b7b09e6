//! Group (room): the aggregate that owns a roster, its tournaments and its ladder log.

use crate::models::error::EngineError;
use crate::models::mmr_match::MmrMatch;
use crate::models::player::{Player, PlayerId};
use crate::models::timestamp;
use crate::models::tournament::Tournament;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = String;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(deserialize_with = "roster")]
    pub players: Vec<Player>,
    /// Oldest first. At most one is active.
    #[serde(default)]
    pub tournaments: Vec<Tournament>,
    /// Append-only ladder log, oldest first.
    #[serde(default)]
    pub mmr_matches: Vec<MmrMatch>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Load a stored roster. The BYE id is reserved for bracket padding.
fn roster<'de, D>(deserializer: D) -> Result<Vec<Player>, D::Error>
where
    D: Deserializer<'de>,
{
    let players = Vec::<Player>::deserialize(deserializer)?;
    if players.iter().any(Player::is_bye) {
        return Err(serde::de::Error::custom(EngineError::ReservedPlayerId));
    }
    Ok(players)
}

impl Group {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            players: Vec::new(),
            tournaments: Vec::new(),
            mmr_matches: Vec::new(),
            created_at,
        }
    }

    pub fn get_player(&self, id: &str) -> Result<&Player, EngineError> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::PlayerNotFound(id.to_string()))
    }

    pub fn get_player_mut(&mut self, id: &str) -> Result<&mut Player, EngineError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::PlayerNotFound(id.to_string()))
    }

    /// Replace stored players with updated copies, matched by id.
    pub fn store_players(&mut self, updated: impl IntoIterator<Item = Player>) {
        for player in updated {
            if let Some(slot) = self.players.iter_mut().find(|p| p.id == player.id) {
                *slot = player;
            }
        }
    }

    /// Add a player. Names are trimmed and unique (case-insensitive).
    pub fn add_player(&mut self, name: &str) -> Result<PlayerId, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidPlayerName);
        }
        let lowered = name.to_lowercase();
        if self.players.iter().any(|p| p.name.to_lowercase() == lowered) {
            return Err(EngineError::DuplicatePlayerName);
        }
        let player = Player::new(name);
        let id = player.id.clone();
        self.players.push(player);
        Ok(id)
    }

    /// Remove a player by id. Players in the active tournament cannot be removed.
    pub fn remove_player(&mut self, player_id: &str) -> Result<Player, EngineError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| EngineError::PlayerNotFound(player_id.to_string()))?;
        if self
            .active_tournament()
            .is_some_and(|t| t.has_player(player_id))
        {
            return Err(EngineError::TournamentAlreadyActive);
        }
        Ok(self.players.remove(idx))
    }

    pub fn active_tournament(&self) -> Option<&Tournament> {
        self.tournaments.iter().find(|t| t.is_active())
    }

    pub fn active_tournament_mut(&mut self) -> Option<&mut Tournament> {
        self.tournaments.iter_mut().find(|t| t.is_active())
    }

    pub fn get_mmr_match(&self, id: &str) -> Result<&MmrMatch, EngineError> {
        self.mmr_matches
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| EngineError::UnknownMatch(id.to_string()))
    }
}
