//! Handlers for match days ("fechas"), draws ("sorteos") and match results.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use padel_core::draw::{draw, DrawEntrant, DrawMode};
use padel_core::error::CoreError;
use padel_core::scoring::{validate_result, Side};
use padel_core::stage::{ensure_stage_active, ensure_stage_open, MATCH_DAY_SCHEDULED};
use padel_core::types::DbId;
use padel_db::models::circuit_match::{CircuitMatch, NewMatch, RecordResult};
use padel_db::models::match_day::{CreateMatchDay, MatchDay, MatchDayWithMatches};
use padel_db::models::notification::{NewNotification, KIND_DRAW_PUBLISHED};
use padel_db::repositories::{EnrollmentRepo, MatchDayRepo, MatchRepo};
use padel_db::DbPool;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::notifications::dispatch;
use crate::handlers::standings::{find_division, find_stage, DivisionTable};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /circuit/match-days/{id}/draw`.
#[derive(Debug, Deserialize)]
pub struct DrawRequest {
    pub mode: DrawMode,
    /// Fixes the shuffle of a random draw.
    pub seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// Match days
// ---------------------------------------------------------------------------

/// GET /api/v1/circuit/divisions/{id}/match-days
pub async fn list_match_days(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(division_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<MatchDay>>>> {
    find_division(&state.pool, division_id).await?;
    let days = MatchDayRepo::list_for_division(&state.pool, division_id).await?;
    Ok(Json(DataResponse::new(days)))
}

/// POST /api/v1/circuit/divisions/{id}/match-days
///
/// Round numbers are unique per division; a duplicate is 409.
pub async fn create_match_day(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(division_id): Path<DbId>,
    Json(input): Json<CreateMatchDay>,
) -> AppResult<(StatusCode, Json<DataResponse<MatchDay>>)> {
    let division = find_division(&state.pool, division_id).await?;
    let stage = find_stage(&state.pool, division.stage_id).await?;
    ensure_stage_open(&stage.status)?;
    if matches!(input.round_number, Some(n) if n < 1) {
        return Err(AppError::Core(CoreError::Validation(
            "round_number must be at least 1".into(),
        )));
    }

    let day = MatchDayRepo::create(&state.pool, division_id, &input).await?;
    tracing::info!(
        match_day_id = day.id,
        division_id,
        round = day.round_number,
        user_id = user.user_id,
        "Match day created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(day))))
}

/// GET /api/v1/circuit/match-days/{id}
pub async fn get_match_day(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MatchDayWithMatches>>> {
    let day = find_match_day(&state.pool, id).await?;
    let matches = MatchRepo::list_details(&state.pool, id).await?;

    let byes = if day.status == MATCH_DAY_SCHEDULED {
        Vec::new()
    } else {
        let drawn: HashSet<DbId> = matches
            .iter()
            .flat_map(|m| {
                [
                    m.team_a_player1,
                    m.team_a_player2,
                    m.team_b_player1,
                    m.team_b_player2,
                ]
            })
            .collect();
        EnrollmentRepo::list_active_for_division(&state.pool, day.division_id)
            .await?
            .into_iter()
            .map(|e| e.id)
            .filter(|id| !drawn.contains(id))
            .collect()
    };

    Ok(Json(DataResponse::new(MatchDayWithMatches {
        match_day: day,
        matches,
        byes,
    })))
}

// ---------------------------------------------------------------------------
// Draw
// ---------------------------------------------------------------------------

/// POST /api/v1/circuit/match-days/{id}/draw
///
/// Pair the division's active players into doubles matches. `ranking` mode
/// uses the current standings order. Redrawing replaces the previous draw
/// until a result has been recorded.
pub async fn draw_match_day(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<DrawRequest>,
) -> AppResult<Json<DataResponse<MatchDayWithMatches>>> {
    let day = find_match_day(&state.pool, id).await?;
    let division = find_division(&state.pool, day.division_id).await?;
    let stage = find_stage(&state.pool, division.stage_id).await?;
    ensure_stage_active(&stage.status)?;

    let table = DivisionTable::load(&state.pool, division.id).await?;
    let entrants = table
        .rank(stage.min_matches)
        .into_iter()
        .map(|row| DrawEntrant {
            enrollment_id: row.enrollment_id,
            matches_played: row.played,
        })
        .collect();
    let plan = draw(entrants, input.mode, input.seed)?;

    let new_matches: Vec<NewMatch> = plan
        .matches
        .iter()
        .map(|m| NewMatch {
            court: m.court,
            team_a: m.team_a,
            team_b: m.team_b,
        })
        .collect();

    let (day, created) =
        MatchRepo::publish_draw(&state.pool, id, input.mode.as_str(), &new_matches)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "Match day already has results and cannot be redrawn".into(),
                ))
            })?;

    tracing::info!(
        match_day_id = id,
        division_id = division.id,
        mode = input.mode.as_str(),
        matches = created.len(),
        byes = plan.byes.len(),
        user_id = user.user_id,
        "Draw published"
    );

    let notifications = table
        .enrollments
        .iter()
        .filter_map(|e| e.user_id)
        .map(|user_id| NewNotification {
            user_id,
            kind: KIND_DRAW_PUBLISHED,
            title: format!("Round {} drawn", day.round_number),
            body: format!(
                "The draw for round {} of {} has been published.",
                day.round_number, division.name
            ),
        })
        .collect();
    dispatch(&state, notifications).await;

    let matches = MatchRepo::list_details(&state.pool, id).await?;
    Ok(Json(DataResponse::new(MatchDayWithMatches {
        match_day: day,
        matches,
        byes: plan.byes,
    })))
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// PUT /api/v1/circuit/matches/{id}/result
///
/// Record or correct a result. `forfeited_side` marks a walkover by that
/// pair.
pub async fn record_result(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<RecordResult>,
) -> AppResult<Json<DataResponse<CircuitMatch>>> {
    let existing = MatchRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Match",
            id,
        }))?;
    let day = find_match_day(&state.pool, existing.match_day_id).await?;
    let division = find_division(&state.pool, day.division_id).await?;
    let stage = find_stage(&state.pool, division.stage_id).await?;
    ensure_stage_active(&stage.status)?;

    let forfeited = match input.forfeited_side.as_deref() {
        Some(raw) => Some(Side::parse(raw).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "forfeited_side must be 'a' or 'b', got '{raw}'"
            )))
        })?),
        None => None,
    };
    validate_result(input.games_a, input.games_b, forfeited)?;

    let updated = MatchRepo::record_result(
        &state.pool,
        id,
        input.games_a,
        input.games_b,
        forfeited.map(Side::as_str),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Match",
        id,
    }))?;

    tracing::info!(
        match_id = id,
        games_a = input.games_a,
        games_b = input.games_b,
        forfeited = forfeited.map(Side::as_str),
        user_id = user.user_id,
        "Match result recorded"
    );
    Ok(Json(DataResponse::new(updated)))
}

async fn find_match_day(pool: &DbPool, id: DbId) -> AppResult<MatchDay> {
    MatchDayRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MatchDay",
            id,
        }))
}
