//! Single binary web server: REST API over in-memory groups.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, MMR_K_FACTOR.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use table_tennis_web::{
    delete_mmr_match, edit_mmr_match, leaderboard, leaderboard_csv, next_playable_match,
    record_mmr_match, record_tournament_match, start_tournament, EngineError, Group, GroupId,
    Score, DEFAULT_K_FACTOR,
};

/// Per-group entry: group data + last activity time (for auto-cleanup).
struct GroupEntry {
    group: Group,
    last_activity: Instant,
}

/// In-memory state standing in for the document store. Entries are removed after inactivity.
type AppState = Data<RwLock<HashMap<GroupId, GroupEntry>>>;

/// Inactivity threshold: groups not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Settings read from the environment at startup.
#[derive(Clone, Debug)]
struct AppConfig {
    host: String,
    port: u16,
    k_factor: i32,
}

impl AppConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let k_factor = std::env::var("MMR_K_FACTOR")
            .ok()
            .and_then(|k| k.parse().ok())
            .filter(|k: &i32| *k > 0)
            .unwrap_or(DEFAULT_K_FACTOR);
        Self {
            host,
            port,
            k_factor,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateGroupBody {
    name: String,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TournamentResultBody {
    winner_id: String,
    player1_score: i64,
    player2_score: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordMmrMatchBody {
    player1_id: String,
    player2_id: String,
    player1_score: i64,
    player2_score: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditMmrMatchBody {
    winner_id: String,
    player1_score: i64,
    player2_score: i64,
}

/// Path segment: group id (e.g. /api/groups/{id})
#[derive(Deserialize)]
struct GroupPath {
    id: GroupId,
}

/// Path segments: group id and player id
#[derive(Deserialize)]
struct GroupPlayerPath {
    id: GroupId,
    player_id: String,
}

/// Path segments: group id and match id (bracket or ladder)
#[derive(Deserialize)]
struct GroupMatchPath {
    id: GroupId,
    match_id: String,
}

fn error_response(e: &EngineError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        EngineError::UnknownMatch(_) | EngineError::PlayerNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        _ => HttpResponse::BadRequest().json(body),
    }
}

/// Look up a group and refresh its activity time, so the cleanup task keeps it.
fn touch_group<'a>(
    groups: &'a mut HashMap<GroupId, GroupEntry>,
    id: &str,
) -> Option<&'a mut Group> {
    let entry = groups.get_mut(id)?;
    entry.last_activity = Instant::now();
    Some(&mut entry.group)
}

fn is_expired(entry: &GroupEntry) -> bool {
    entry.last_activity.elapsed() >= INACTIVITY_TIMEOUT
}

/// Look up a group, refresh its activity time and run `f` on it; the result becomes the response body.
fn with_group<T, F>(state: &AppState, id: &str, f: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(&mut Group) -> Result<T, EngineError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let group = match touch_group(&mut g, id) {
        Some(group) => group,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No group" })),
    };
    match f(group) {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            log::debug!("group {}: request rejected: {}", id, e);
            error_response(&e)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "table-tennis-web",
    })
}

/// Create a new group (returns it with id; client stores id for subsequent requests).
#[post("/api/groups")]
async fn api_create_group(state: AppState, body: Json<CreateGroupBody>) -> HttpResponse {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "Group name cannot be empty" }));
    }
    let group = Group::new(name, Utc::now());
    let id = group.id.clone();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    log::info!("Created group {} ({})", id, group.name);
    let response = HttpResponse::Ok().json(&group);
    g.insert(
        id,
        GroupEntry {
            group,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a group by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/groups/{id}")]
async fn api_get_group(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    with_group(&state, &path.id, |group| Ok(group.clone()))
}

/// Add a player to the roster.
#[post("/api/groups/{id}/players")]
async fn api_add_player(
    state: AppState,
    path: Path<GroupPath>,
    body: Json<AddPlayerBody>,
) -> HttpResponse {
    with_group(&state, &path.id, |group| {
        group.add_player(&body.name)?;
        Ok(group.clone())
    })
}

/// Remove a player by id.
#[delete("/api/groups/{id}/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<GroupPlayerPath>) -> HttpResponse {
    with_group(&state, &path.id, |group| {
        group.remove_player(&path.player_id)?;
        Ok(group.clone())
    })
}

/// Start a tournament with the whole roster (fails if one is already active).
#[post("/api/groups/{id}/tournaments")]
async fn api_start_tournament(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    with_group(&state, &path.id, |group| {
        start_tournament(group, &mut rand::thread_rng(), Utc::now())?;
        group
            .active_tournament()
            .cloned()
            .ok_or(EngineError::NoActiveTournament)
    })
}

/// Next playable match of the active tournament (`null` when waiting on nothing).
#[get("/api/groups/{id}/tournaments/active/next")]
async fn api_next_match(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    with_group(&state, &path.id, |group| {
        let tournament = group
            .active_tournament()
            .ok_or(EngineError::NoActiveTournament)?;
        Ok(next_playable_match(&tournament.matches).cloned())
    })
}

/// Record the result of one bracket match; returns the tournament (possibly completed).
#[post("/api/groups/{id}/tournaments/active/matches/{match_id}")]
async fn api_record_tournament_match(
    state: AppState,
    path: Path<GroupMatchPath>,
    body: Json<TournamentResultBody>,
) -> HttpResponse {
    with_group(&state, &path.id, |group| {
        let score = Score::new(body.player1_score, body.player2_score)?;
        let tournament_id = group
            .active_tournament()
            .map(|t| t.id.clone())
            .ok_or(EngineError::NoActiveTournament)?;
        record_tournament_match(group, &path.match_id, &body.winner_id, score, Utc::now())?;
        group
            .tournaments
            .iter()
            .find(|t| t.id == tournament_id)
            .cloned()
            .ok_or(EngineError::NoActiveTournament)
    })
}

/// Record a ladder match between two players.
#[post("/api/groups/{id}/mmr-matches")]
async fn api_record_mmr_match(
    state: AppState,
    config: Data<AppConfig>,
    path: Path<GroupPath>,
    body: Json<RecordMmrMatchBody>,
) -> HttpResponse {
    with_group(&state, &path.id, |group| {
        let score = Score::new(body.player1_score, body.player2_score)?;
        record_mmr_match(
            group,
            &body.player1_id,
            &body.player2_id,
            score,
            config.k_factor,
            Utc::now(),
        )
    })
}

/// Correct winner/score of a ladder match.
#[put("/api/groups/{id}/mmr-matches/{match_id}")]
async fn api_edit_mmr_match(
    state: AppState,
    config: Data<AppConfig>,
    path: Path<GroupMatchPath>,
    body: Json<EditMmrMatchBody>,
) -> HttpResponse {
    with_group(&state, &path.id, |group| {
        let score = Score::new(body.player1_score, body.player2_score)?;
        edit_mmr_match(group, &path.match_id, &body.winner_id, score, config.k_factor)
    })
}

/// Delete a ladder match from the log.
#[delete("/api/groups/{id}/mmr-matches/{match_id}")]
async fn api_delete_mmr_match(state: AppState, path: Path<GroupMatchPath>) -> HttpResponse {
    with_group(&state, &path.id, |group| {
        delete_mmr_match(group, &path.match_id)
    })
}

/// Standings as JSON.
#[get("/api/groups/{id}/leaderboard")]
async fn api_leaderboard(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    with_group(&state, &path.id, |group| Ok(leaderboard(&group.players)))
}

/// Standings as a CSV download.
#[get("/api/groups/{id}/leaderboard.csv")]
async fn api_leaderboard_csv(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let group = match touch_group(&mut g, &path.id) {
        Some(group) => group,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No group" })),
    };
    match leaderboard_csv(&group.players) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                "attachment; filename=\"leaderboard.csv\"",
            ))
            .body(csv),
        Err(e) => {
            log::error!("group {}: leaderboard export failed: {}", path.id, e);
            HttpResponse::InternalServerError().body("export error")
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    log::info!(
        "Starting server at http://{}:{} (k-factor {})",
        config.host,
        config.port,
        config.k_factor
    );

    let state = Data::new(RwLock::new(HashMap::<GroupId, GroupEntry>::new()));
    let config_data = Data::new(config.clone());

    // Background task: every 30 minutes, remove groups inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| !is_expired(entry));
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive group(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config_data.clone())
            .service(api_health)
            .service(api_create_group)
            .service(api_leaderboard_csv)
            .service(api_leaderboard)
            .service(api_get_group)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_start_tournament)
            .service(api_next_match)
            .service(api_record_tournament_match)
            .service(api_record_mmr_match)
            .service(api_edit_mmr_match)
            .service(api_delete_mmr_match)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
