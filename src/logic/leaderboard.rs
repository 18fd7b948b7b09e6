//! Ladder standings and CSV export.

use crate::models::{Player, PlayerId};
use serde::Serialize;

/// One row of the standings.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub mmr: i32,
    pub peak_mmr: i32,
    pub wins: u32,
    pub losses: u32,
    /// Percentage of games won; 0 when none played.
    pub win_rate: f64,
}

/// Players ordered by mmr (desc), then wins (desc), then name.
pub fn leaderboard(players: &[Player]) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&Player> = players.iter().filter(|p| !p.is_bye()).collect();
    sorted.sort_by(|a, b| {
        b.mmr
            .cmp(&a.mmr)
            .then(b.wins.cmp(&a.wins))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let games = p.wins + p.losses;
            let win_rate = if games == 0 {
                0.0
            } else {
                f64::from(p.wins) * 100.0 / f64::from(games)
            };
            LeaderboardEntry {
                rank: i + 1,
                player_id: p.id.clone(),
                name: p.name.clone(),
                mmr: p.mmr,
                peak_mmr: p.peak_mmr,
                wins: p.wins,
                losses: p.losses,
                win_rate,
            }
        })
        .collect()
}

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    name: &'a str,
    mmr: i32,
    peak_mmr: i32,
    wins: u32,
    losses: u32,
    win_rate: String,
}

/// Standings as CSV with a header row (written even for an empty roster).
pub fn leaderboard_csv(players: &[Player]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(["rank", "name", "mmr", "peak_mmr", "wins", "losses", "win_rate"])?;
    for entry in leaderboard(players) {
        wtr.serialize(CsvRow {
            rank: entry.rank,
            name: &entry.name,
            mmr: entry.mmr,
            peak_mmr: entry.peak_mmr,
            wins: entry.wins,
            losses: entry.losses,
            win_rate: format!("{:.1}", entry.win_rate),
        })?;
    }
    let bytes = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
