//! Single binary web server: JSON API over the bracket engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use padel_bracket::config::ServerConfig;
use padel_bracket::{
    calculate_group_standings, calculate_optimal_group_configuration, cancel_match,
    check_existing_matches, classify_teams_to_elimination_phase, clear_match_result,
    generate_bracket, get_bracket, import_teams_csv, record_match_result, register_team,
    start_match, validate_bracket_generation, BracketError, BracketFormat, BracketResult,
    BracketStore, Category, CategoryId, ErrorKind, MatchId, MatchResult, MemoryStore, NewTeam,
    Tournament, TournamentId, TournamentStatus, ZoneId,
};
use serde::{Deserialize, Serialize};

/// In-memory state shared by all workers.
type AppState = Data<MemoryStore>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
}

#[derive(Deserialize)]
struct SetStatusBody {
    status: TournamentStatus,
}

#[derive(Deserialize)]
struct CreateCategoryBody {
    name: String,
    #[serde(default)]
    format: BracketFormat,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and category id.
#[derive(Deserialize)]
struct CategoryPath {
    id: TournamentId,
    category_id: CategoryId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct ZonePath {
    id: ZoneId,
}

#[derive(Deserialize)]
struct TeamCountPath {
    team_count: usize,
}

/// Map an engine error to a status code with `{"error": message}`.
fn error_response(e: BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "kind": e.kind() });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Invariant | ErrorKind::State => HttpResponse::Conflict().json(body),
        ErrorKind::Storage => {
            log::error!("Storage failure: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T: Serialize>(result: BracketResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "padel-bracket",
    })
}

/// Create a new tournament in Draft status.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let tournament = Tournament::new(body.name.trim());
    respond(
        state
            .insert_tournament(tournament.clone())
            .map(|()| tournament)
            .map_err(BracketError::from),
    )
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(
        state
            .tournament(path.id)
            .map_err(BracketError::from)
            .and_then(|t| t.ok_or(BracketError::TournamentNotFound(path.id))),
    )
}

#[put("/api/tournaments/{id}/status")]
async fn api_set_status(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<SetStatusBody>,
) -> HttpResponse {
    let result = state
        .tournament(path.id)
        .map_err(BracketError::from)
        .and_then(|t| t.ok_or(BracketError::TournamentNotFound(path.id)))
        .and_then(|mut t| {
            state.set_tournament_status(t.id, body.status)?;
            t.status = body.status;
            Ok(t)
        });
    respond(result)
}

#[post("/api/tournaments/{id}/categories")]
async fn api_create_category(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<CreateCategoryBody>,
) -> HttpResponse {
    let category = Category::new(path.id, body.name.trim(), body.format);
    let result = match state.tournament(path.id) {
        Ok(Some(_)) => state
            .insert_category(category.clone())
            .map(|()| category)
            .map_err(BracketError::from),
        Ok(None) => Err(BracketError::TournamentNotFound(path.id)),
        Err(e) => Err(e.into()),
    };
    respond(result)
}

/// Register one team.
#[post("/api/tournaments/{id}/categories/{category_id}/teams")]
async fn api_register_team(
    state: AppState,
    path: Path<CategoryPath>,
    body: Json<NewTeam>,
) -> HttpResponse {
    respond(register_team(state.get_ref(), path.id, path.category_id, body.into_inner()))
}

/// Bulk registration from a CSV body with header `player_1,player_2,seed`.
#[post("/api/tournaments/{id}/categories/{category_id}/teams/import")]
async fn api_import_teams(state: AppState, path: Path<CategoryPath>, body: String) -> HttpResponse {
    respond(import_teams_csv(state.get_ref(), path.id, path.category_id, body.as_bytes()))
}

#[get("/api/tournaments/{id}/categories/{category_id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<CategoryPath>) -> HttpResponse {
    respond(get_bracket(state.get_ref(), path.id, path.category_id))
}

/// (Re)generate the bracket; existing matches and groups are replaced.
#[post("/api/tournaments/{id}/categories/{category_id}/bracket")]
async fn api_generate_bracket(state: AppState, path: Path<CategoryPath>) -> HttpResponse {
    respond(generate_bracket(state.get_ref(), path.id, path.category_id))
}

#[get("/api/tournaments/{id}/categories/{category_id}/bracket/validate")]
async fn api_validate_bracket(state: AppState, path: Path<CategoryPath>) -> HttpResponse {
    respond(validate_bracket_generation(state.get_ref(), path.id, path.category_id))
}

/// Counts by status of the current matches (what a regeneration would delete).
#[get("/api/tournaments/{id}/categories/{category_id}/bracket/status")]
async fn api_bracket_status(state: AppState, path: Path<CategoryPath>) -> HttpResponse {
    respond(check_existing_matches(state.get_ref(), path.id, path.category_id))
}

/// Move group qualifiers into the elimination phase.
#[post("/api/tournaments/{id}/categories/{category_id}/classify")]
async fn api_classify(state: AppState, path: Path<CategoryPath>) -> HttpResponse {
    respond(classify_teams_to_elimination_phase(state.get_ref(), path.id, path.category_id))
}

/// Record (or correct) a match result; winners advance automatically.
#[put("/api/matches/{id}/result")]
async fn api_record_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<MatchResult>,
) -> HttpResponse {
    respond(record_match_result(state.get_ref(), path.id, body.into_inner()))
}

#[delete("/api/matches/{id}/result")]
async fn api_clear_result(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    respond(clear_match_result(state.get_ref(), path.id))
}

#[post("/api/matches/{id}/start")]
async fn api_start_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    respond(start_match(state.get_ref(), path.id))
}

#[post("/api/matches/{id}/cancel")]
async fn api_cancel_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    respond(cancel_match(state.get_ref(), path.id))
}

/// Calculate and store the standings of a group.
#[post("/api/zones/{id}/standings")]
async fn api_zone_standings(state: AppState, path: Path<ZonePath>) -> HttpResponse {
    respond(calculate_group_standings(state.get_ref(), path.id))
}

/// Preview the group layout for a team count.
#[get("/api/group-configuration/{team_count}")]
async fn api_group_configuration(path: Path<TeamCountPath>) -> HttpResponse {
    respond(calculate_optimal_group_configuration(path.team_count))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(MemoryStore::new());

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_set_status)
            .service(api_create_category)
            .service(api_register_team)
            .service(api_import_teams)
            .service(api_get_bracket)
            .service(api_generate_bracket)
            .service(api_validate_bracket)
            .service(api_bracket_status)
            .service(api_classify)
            .service(api_record_result)
            .service(api_clear_result)
            .service(api_start_match)
            .service(api_cancel_match)
            .service(api_zone_standings)
            .service(api_group_configuration)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
