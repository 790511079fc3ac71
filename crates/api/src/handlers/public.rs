//! Read-only endpoints for the public website. No authentication.
//!
//! Stages still being planned are hidden.

use axum::extract::{Path, Query, State};
use axum::Json;
use padel_core::error::CoreError;
use padel_core::stage::STAGE_PLANNED;
use padel_core::types::DbId;
use padel_db::models::stage::Stage;
use padel_db::models::tournament::Tournament;
use padel_db::repositories::{StageRepo, TournamentRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::standings::{find_stage, stage_standings, DivisionStandings};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/public/tournaments
///
/// Upcoming tournaments open for registration, soonest first.
pub async fn public_tournaments(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Tournament>>>> {
    let (limit, _) = params.resolve();
    let tournaments = TournamentRepo::list_public(&state.pool, limit).await?;
    Ok(Json(DataResponse::new(tournaments)))
}

/// GET /api/v1/public/circuit/stages
pub async fn public_stages(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Stage>>>> {
    let (limit, offset) = params.resolve();
    let stages = StageRepo::list(&state.pool, None, limit, offset)
        .await?
        .into_iter()
        .filter(|s| s.status != STAGE_PLANNED)
        .collect();
    Ok(Json(DataResponse::new(stages)))
}

/// GET /api/v1/public/circuit/stages/{id}/standings
pub async fn public_stage_standings(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<DivisionStandings>>>> {
    let stage = find_stage(&state.pool, id).await?;
    if stage.status == STAGE_PLANNED {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Stage",
            id,
        }));
    }
    let standings = stage_standings(&state.pool, &stage).await?;
    Ok(Json(DataResponse::new(standings)))
}
