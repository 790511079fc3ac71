//! Handlers for the divisions of a stage.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use padel_core::error::CoreError;
use padel_core::stage::{ensure_stage_open, validate_division_level};
use padel_core::types::DbId;
use padel_core::validation::validate_non_empty;
use padel_db::models::division::{CreateDivision, Division, DivisionSummary, UpdateDivision};
use padel_db::repositories::{DivisionRepo, EnrollmentRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::standings::{find_division, find_stage};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/circuit/stages/{id}/divisions
///
/// Divisions of a stage, top first, with their active player counts.
pub async fn list_divisions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(stage_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<DivisionSummary>>>> {
    find_stage(&state.pool, stage_id).await?;
    let divisions = DivisionRepo::list_summaries(&state.pool, stage_id).await?;
    Ok(Json(DataResponse::new(divisions)))
}

/// POST /api/v1/circuit/stages/{id}/divisions
///
/// Levels are unique per stage; a duplicate is 409.
pub async fn create_division(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(stage_id): Path<DbId>,
    Json(input): Json<CreateDivision>,
) -> AppResult<(StatusCode, Json<DataResponse<Division>>)> {
    let stage = find_stage(&state.pool, stage_id).await?;
    ensure_stage_open(&stage.status)?;
    validate_non_empty(&input.name, "name")?;
    validate_division_level(input.level)?;

    let division = DivisionRepo::create(&state.pool, stage_id, &input).await?;
    tracing::info!(
        division_id = division.id,
        stage_id,
        level = division.level,
        user_id = user.user_id,
        "Division created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(division))))
}

/// PUT /api/v1/circuit/divisions/{id}
pub async fn update_division(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDivision>,
) -> AppResult<Json<DataResponse<Division>>> {
    let existing = find_division(&state.pool, id).await?;
    let stage = find_stage(&state.pool, existing.stage_id).await?;
    ensure_stage_open(&stage.status)?;

    if let Some(name) = input.name.as_deref() {
        validate_non_empty(name, "name")?;
    }
    if let Some(level) = input.level {
        validate_division_level(level)?;
    }

    let division = DivisionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Division",
            id,
        }))?;

    tracing::info!(division_id = id, user_id = user.user_id, "Division updated");
    Ok(Json(DataResponse::new(division)))
}

/// DELETE /api/v1/circuit/divisions/{id}
///
/// Refused while the division has active players. Match days are deleted
/// with it; substitutes who preferred it lose the preference.
pub async fn delete_division(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let active = EnrollmentRepo::list_active_for_division(&state.pool, id).await?;
    if !active.is_empty() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Division still has {} active players; move or withdraw them first",
            active.len()
        ))));
    }

    if !DivisionRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Division",
            id,
        }));
    }
    tracing::info!(division_id = id, admin_id = admin.user_id, "Division deleted");
    Ok(StatusCode::NO_CONTENT)
}
