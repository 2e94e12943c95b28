use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::health::{HealthReport, HealthState};
use crate::engine::{LeagueEngine, ResultEntry};
use crate::error::AppError;
use crate::fixtures::service::{FixturePrediction, UpcomingFixtures};
use crate::standings::service::LeaguePrize;
use crate::state::StandingsCache;
use crate::types::{CompetitionId, Fixture, FixtureId, LeagueId, PersonalisedStanding, PlayerId, PrizeSlot};

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<LeagueEngine>,
    pub cache: Arc<StandingsCache>,
    pub health: Arc<HealthState>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/leagues/:id/prizes", get(get_league_prizes))
        .route("/leagues/:id/standings/recompute", post(recompute_league_standings))
        .route("/leagues/:id/standings/:slot", get(get_standings))
        .route("/competitions/:id/fixtures/upcoming", get(get_upcoming_fixtures))
        .route("/competitions/:id/fixtures/awaiting-result", get(get_awaiting_result))
        .route("/competitions/:id/results", get(get_results))
        .route("/competitions/:id/recalculate", post(recalculate_competition))
        .route("/fixtures/:id/result", post(post_result))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct StandingsQuery {
    pub player: PlayerId,
    /// Defaults to true.
    pub abbreviated: Option<bool>,
}

#[derive(Deserialize)]
pub struct PlayerQuery {
    pub player: Option<PlayerId>,
}

#[derive(Deserialize)]
pub struct ResultsQuery {
    pub recent: Option<bool>,
    pub player: Option<PlayerId>,
}

#[derive(Deserialize)]
pub struct ResultBody {
    pub result: String,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct RecalculateResponse {
    pub leagues: usize,
}

#[derive(Serialize)]
pub struct RecomputeResponse {
    pub league_id: LeagueId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<HealthReport> {
    Json(state.health.report(state.cache.league_count()))
}

async fn get_league_prizes(
    State(state): State<ApiState>,
    Path(league_id): Path<LeagueId>,
) -> Result<Json<Vec<LeaguePrize>>, AppError> {
    Ok(Json(state.engine.standings.league_prizes(league_id).await?))
}

async fn get_standings(
    State(state): State<ApiState>,
    Path((league_id, slot)): Path<(LeagueId, u8)>,
    Query(params): Query<StandingsQuery>,
) -> Result<Json<Vec<PersonalisedStanding>>, AppError> {
    let slot = PrizeSlot::from_number(slot)?;
    let standings = &state.engine.standings;
    let view = if params.abbreviated.unwrap_or(true) {
        standings.abbreviated_standings(league_id, slot, params.player).await?
    } else {
        standings.full_standings(league_id, slot, params.player).await?
    };
    Ok(Json(view))
}

async fn recompute_league_standings(
    State(state): State<ApiState>,
    Path(league_id): Path<LeagueId>,
) -> Result<Json<RecomputeResponse>, AppError> {
    state.engine.standings.recalculate_league_standings(league_id).await?;
    Ok(Json(RecomputeResponse { league_id }))
}

async fn get_upcoming_fixtures(
    State(state): State<ApiState>,
    Path(competition_id): Path<CompetitionId>,
    Query(params): Query<PlayerQuery>,
) -> Result<Json<UpcomingFixtures>, AppError> {
    Ok(Json(state.engine.fixtures.upcoming_fixtures(competition_id, params.player).await?))
}

async fn get_awaiting_result(
    State(state): State<ApiState>,
    Path(competition_id): Path<CompetitionId>,
) -> Result<Json<Vec<Fixture>>, AppError> {
    Ok(Json(state.engine.fixtures.awaiting_result(competition_id).await?))
}

async fn get_results(
    State(state): State<ApiState>,
    Path(competition_id): Path<CompetitionId>,
    Query(params): Query<ResultsQuery>,
) -> Result<Json<Vec<FixturePrediction>>, AppError> {
    let recent = params.recent.unwrap_or(false);
    Ok(Json(state.engine.fixtures.results(competition_id, recent, params.player).await?))
}

async fn recalculate_competition(
    State(state): State<ApiState>,
    Path(competition_id): Path<CompetitionId>,
) -> Result<Json<RecalculateResponse>, AppError> {
    let leagues = state.engine.refresh_competition(competition_id).await?;
    Ok(Json(RecalculateResponse { leagues }))
}

async fn post_result(
    State(state): State<ApiState>,
    Path(fixture_id): Path<FixtureId>,
    Json(body): Json<ResultBody>,
) -> Result<Json<ResultEntry>, AppError> {
    let entry = state.engine.enter_result(fixture_id, &body.result).await?;
    state.health.inc_results_entered();
    Ok(Json(entry))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
