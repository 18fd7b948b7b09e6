//! Integration tests for the group aggregate: roster, tournament mode, MMR mode.

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use table_tennis_web::{
    delete_mmr_match, edit_mmr_match, leaderboard, next_playable_match, record_mmr_match,
    record_tournament_match, start_tournament, EngineError, Group, Score, Side, Tournament,
    TournamentStatus,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 12, 20, 0, 0).unwrap()
}

fn group_with_players(names: &[&str]) -> Group {
    let mut g = Group::new("Office", now());
    for name in names {
        g.add_player(name).unwrap();
    }
    g
}

fn id_of(group: &Group, name: &str) -> String {
    group.players.iter().find(|p| p.name == name).unwrap().id.clone()
}

/// Play the active tournament to the end, player1 always winning.
fn play_active_tournament(group: &mut Group) {
    loop {
        let next = {
            let t = group.active_tournament().unwrap();
            next_playable_match(&t.matches).cloned()
        };
        let Some(m) = next else { break };
        let winner = m.player(Side::Player1).unwrap().id.clone();
        record_tournament_match(group, &m.id, &winner, Score::new(11, 8).unwrap(), now()).unwrap();
        if group.active_tournament().is_none() {
            break;
        }
    }
}

#[test]
fn add_player_trims_and_rejects_duplicates() {
    let mut g = group_with_players(&["Ann"]);
    assert_eq!(g.add_player("  ann "), Err(EngineError::DuplicatePlayerName));
    assert_eq!(g.add_player("   "), Err(EngineError::InvalidPlayerName));
    g.add_player("  Bob ").unwrap();
    assert_eq!(g.players[1].name, "Bob");
    assert_eq!(g.players[1].mmr, 1000);
    assert_eq!(g.players[1].peak_mmr, 1000);
}

#[test]
fn remove_player_by_id() {
    let mut g = group_with_players(&["Ann", "Bob"]);
    let ann = id_of(&g, "Ann");
    assert_eq!(g.remove_player(&ann).unwrap().name, "Ann");
    assert_eq!(
        g.remove_player(&ann),
        Err(EngineError::PlayerNotFound(ann.clone()))
    );
    assert_eq!(g.players.len(), 1);
}

#[test]
fn start_requires_two_players_and_no_active_tournament() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut g = group_with_players(&["Ann"]);
    assert_eq!(
        start_tournament(&mut g, &mut rng, now()),
        Err(EngineError::InsufficientPlayers)
    );
    assert!(g.tournaments.is_empty());

    g.add_player("Bob").unwrap();
    start_tournament(&mut g, &mut rng, now()).unwrap();
    assert_eq!(
        start_tournament(&mut g, &mut rng, now()),
        Err(EngineError::TournamentAlreadyActive)
    );
    assert_eq!(g.tournaments.len(), 1);
    assert_eq!(g.tournaments[0].created_at, now());
}

#[test]
fn players_in_active_tournament_cannot_be_removed() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut g = group_with_players(&["Ann", "Bob", "Cat"]);
    start_tournament(&mut g, &mut rng, now()).unwrap();
    let ann = id_of(&g, "Ann");
    assert_eq!(g.remove_player(&ann), Err(EngineError::TournamentAlreadyActive));
}

#[test]
fn recording_without_tournament_fails() {
    let mut g = group_with_players(&["Ann", "Bob"]);
    let ann = id_of(&g, "Ann");
    assert_eq!(
        record_tournament_match(&mut g, "round-1-match-0", &ann, Score::new(11, 3).unwrap(), now()),
        Err(EngineError::NoActiveTournament)
    );
}

#[test]
fn two_player_tournament_completes_after_the_final() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut g = group_with_players(&["Ann", "Bob"]);
    start_tournament(&mut g, &mut rng, now()).unwrap();
    let final_match = g.tournaments[0].matches[0].clone();
    let winner = final_match.player2.clone().unwrap();

    let done = record_tournament_match(&mut g, &final_match.id, &winner.id, Score::new(7, 11).unwrap(), now())
        .unwrap();
    assert_eq!(done.winner.as_ref().map(|p| p.id.as_str()), Some(winner.id.as_str()));

    let t = &g.tournaments[0];
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.winner.as_ref().unwrap().id, winner.id);
    assert_eq!(t.completed_at, Some(now()));
    assert!(g.active_tournament().is_none());

    let stored = g.get_player(&winner.id).unwrap();
    assert_eq!((stored.wins, stored.losses), (1, 0));
    // Tournament results leave ratings alone.
    assert_eq!(stored.mmr, 1000);
}

#[test]
fn full_tournament_updates_roster_and_allows_a_new_one() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut g = group_with_players(&["Ann", "Bob", "Cat", "Dan", "Eve"]);
    start_tournament(&mut g, &mut rng, now()).unwrap();
    play_active_tournament(&mut g);

    let t = &g.tournaments[0];
    assert_eq!(t.status, TournamentStatus::Completed);
    assert!(t.matches.iter().all(|m| m.is_completed()));
    let champion = t.winner.clone().unwrap();
    assert!(!champion.is_bye());

    let total_wins: u32 = g.players.iter().map(|p| p.wins).sum();
    let total_losses: u32 = g.players.iter().map(|p| p.losses).sum();
    assert_eq!(total_wins, 4);
    assert_eq!(total_losses, 4);
    // Snapshot and roster agree.
    for p in &t.players {
        let stored = g.get_player(&p.id).unwrap();
        assert_eq!((p.wins, p.losses), (stored.wins, stored.losses));
    }

    start_tournament(&mut g, &mut rng, now()).unwrap();
    assert_eq!(g.tournaments.len(), 2);
    assert!(g.tournaments[1].is_active());
}

#[test]
fn unknown_winner_or_match_is_reported() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut g = group_with_players(&["Ann", "Bob", "Cat", "Dan"]);
    start_tournament(&mut g, &mut rng, now()).unwrap();
    let m = g.tournaments[0].matches[0].clone();
    let p1 = m.player1.clone().unwrap();

    assert_eq!(
        record_tournament_match(&mut g, "round-7-match-0", &p1.id, Score::new(11, 3).unwrap(), now()),
        Err(EngineError::UnknownMatch("round-7-match-0".to_string()))
    );
    assert_eq!(
        record_tournament_match(&mut g, &m.id, "ghost", Score::new(11, 3).unwrap(), now()),
        Err(EngineError::PlayerNotFound("ghost".to_string()))
    );
    // Nothing changed.
    assert!(g.players.iter().all(|p| p.wins == 0 && p.losses == 0));
}

#[test]
fn ladder_match_updates_both_players_and_log() {
    let mut g = group_with_players(&["Ann", "Bob"]);
    let (ann, bob) = (id_of(&g, "Ann"), id_of(&g, "Bob"));
    let m = record_mmr_match(&mut g, &ann, &bob, Score::new(11, 4).unwrap(), 32, now()).unwrap();

    assert_eq!(m.room_id.as_deref(), Some(g.id.as_str()));
    assert_eq!(g.mmr_matches.len(), 1);
    let a = g.get_player(&ann).unwrap();
    let b = g.get_player(&bob).unwrap();
    assert_eq!((a.mmr, a.peak_mmr, a.wins), (1016, 1016, 1));
    assert_eq!((b.mmr, b.peak_mmr, b.losses), (984, 1000, 1));

    assert_eq!(
        record_mmr_match(&mut g, &ann, &ann, Score::new(11, 4).unwrap(), 32, now()),
        Err(EngineError::SamePlayer)
    );
    assert_eq!(
        record_mmr_match(&mut g, &ann, "ghost", Score::new(11, 4).unwrap(), 32, now()),
        Err(EngineError::PlayerNotFound("ghost".to_string()))
    );
    assert_eq!(g.mmr_matches.len(), 1);
}

#[test]
fn editing_a_ladder_match_swaps_result() {
    let mut g = group_with_players(&["Ann", "Bob"]);
    let (ann, bob) = (id_of(&g, "Ann"), id_of(&g, "Bob"));
    let m = record_mmr_match(&mut g, &ann, &bob, Score::new(11, 4).unwrap(), 32, now()).unwrap();

    let edited = edit_mmr_match(&mut g, &m.id, &bob, Score::new(9, 11).unwrap(), 32).unwrap();
    assert_eq!(edited.winner.id, bob);
    assert_eq!(g.get_mmr_match(&m.id).unwrap(), &edited);

    let a = g.get_player(&ann).unwrap();
    let b = g.get_player(&bob).unwrap();
    assert_eq!((a.mmr, a.wins, a.losses), (984, 0, 1));
    assert_eq!((b.mmr, b.wins, b.losses), (1016, 1, 0));
    // Peak keeps the earlier high.
    assert_eq!(a.peak_mmr, 1016);
    assert_eq!(b.peak_mmr, 1016);

    assert_eq!(
        edit_mmr_match(&mut g, "nope", &bob, Score::new(9, 11).unwrap(), 32),
        Err(EngineError::UnknownMatch("nope".to_string()))
    );
}

#[test]
fn deleting_a_ladder_match_keeps_ratings() {
    let mut g = group_with_players(&["Ann", "Bob"]);
    let (ann, bob) = (id_of(&g, "Ann"), id_of(&g, "Bob"));
    let m = record_mmr_match(&mut g, &ann, &bob, Score::new(11, 4).unwrap(), 32, now()).unwrap();
    let removed = delete_mmr_match(&mut g, &m.id).unwrap();
    assert_eq!(removed.id, m.id);
    assert!(g.mmr_matches.is_empty());
    assert_eq!(g.get_player(&ann).unwrap().mmr, 1016);
    assert_eq!(
        delete_mmr_match(&mut g, &m.id),
        Err(EngineError::UnknownMatch(m.id.clone()))
    );
}

#[test]
fn leaderboard_reflects_ladder_results() {
    let mut g = group_with_players(&["Ann", "Bob", "Cat"]);
    let (ann, bob, cat) = (id_of(&g, "Ann"), id_of(&g, "Bob"), id_of(&g, "Cat"));
    record_mmr_match(&mut g, &bob, &ann, Score::new(11, 2).unwrap(), 32, now()).unwrap();
    record_mmr_match(&mut g, &bob, &cat, Score::new(11, 9).unwrap(), 32, now()).unwrap();
    let board = leaderboard(&g.players);
    assert_eq!(board[0].name, "Bob");
    assert_eq!(board[0].wins, 2);
    assert_eq!(board.len(), 3);
}

#[test]
fn stored_tournament_documents_load() {
    let json = r#"{
        "id": "t1",
        "players": [
            {"id": "a", "name": "Ann", "wins": 0, "losses": 0, "mmr": 1000, "peakMmr": 1000},
            {"id": "b", "name": "Bob", "wins": 0, "losses": 0, "mmr": 1010, "peakMmr": 1030, "avatar": "pig"}
        ],
        "matches": [
            {"id": "round-1-match-0",
             "player1": {"id": "a", "name": "Ann", "wins": 0, "losses": 0, "mmr": 1000, "peakMmr": 1000},
             "player2": {"id": "b", "name": "Bob", "wins": 0, "losses": 0, "mmr": 1010, "peakMmr": 1030},
             "status": "pending", "round": 1}
        ],
        "status": "active",
        "createdAt": {"seconds": 1720814400, "nanoseconds": 0},
        "currentView": "bracket"
    }"#;
    let t: Tournament = serde_json::from_str(json).unwrap();
    assert_eq!(t.created_at, now());
    assert_eq!(t.players[1].avatar.as_deref(), Some("pig"));
    assert!(t.matches[0].is_playable());
    assert_eq!(t.current_view.as_deref(), Some("bracket"));

    let back = serde_json::to_value(&t).unwrap();
    assert_eq!(back["createdAt"], "2024-07-12T20:00:00Z");
    assert_eq!(back["currentView"], "bracket");
    assert!(back.get("winner").is_none());
}

#[test]
fn group_json_uses_camel_case() {
    let mut g = group_with_players(&["Ann", "Bob"]);
    let (ann, bob) = (id_of(&g, "Ann"), id_of(&g, "Bob"));
    record_mmr_match(&mut g, &ann, &bob, Score::new(11, 4).unwrap(), 32, now()).unwrap();
    let v = serde_json::to_value(&g).unwrap();
    assert!(v["mmrMatches"].is_array());
    assert_eq!(v["players"][0]["peakMmr"], 1016);
    assert_eq!(v["mmrMatches"][0]["roomId"], g.id.as_str());
}

#[test]
fn stored_roster_cannot_use_the_bye_id() {
    let bye_in_bracket = r#"{
        "id": "g1",
        "name": "Office",
        "players": [
            {"id": "a", "name": "Ann"},
            {"id": "b", "name": "Bob"},
            {"id": "c", "name": "Cat"}
        ],
        "tournaments": [{
            "id": "t1",
            "players": [{"id": "a", "name": "Ann"}, {"id": "b", "name": "Bob"}, {"id": "c", "name": "Cat"}],
            "matches": [
                {"id": "round-1-match-1",
                 "player1": {"id": "c", "name": "Cat"},
                 "player2": {"id": "bye", "name": "BYE"},
                 "winner": {"id": "c", "name": "Cat"},
                 "status": "completed", "round": 1}
            ],
            "status": "active",
            "createdAt": {"seconds": 1720814400, "nanoseconds": 0}
        }],
        "createdAt": {"seconds": 1720814400, "nanoseconds": 0}
    }"#;
    let g: Group = serde_json::from_str(bye_in_bracket).unwrap();
    assert!(g.tournaments[0].matches[0].has_bye());
    assert_eq!(g.players.len(), 3);

    let bye_in_roster = r#"{
        "id": "g1",
        "name": "Office",
        "players": [{"id": "a", "name": "Ann"}, {"id": "bye", "name": "Bye Bye"}],
        "createdAt": {"seconds": 1720814400, "nanoseconds": 0}
    }"#;
    let err = serde_json::from_str::<Group>(bye_in_roster).unwrap_err();
    assert!(err.to_string().contains("reserved"), "{}", err);
}

#[test]
fn stored_players_with_broken_ratings_do_not_load() {
    let json = r#"{
        "id": "g1",
        "name": "Office",
        "players": [{"id": "a", "name": "Ann", "mmr": 1200, "peakMmr": 1100}],
        "createdAt": {"seconds": 1720814400, "nanoseconds": 0}
    }"#;
    assert!(serde_json::from_str::<Group>(json).is_err());
}
