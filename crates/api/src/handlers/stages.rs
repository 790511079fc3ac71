//! Handlers for circuit stages ("etapas").
//!
//! Reads require authentication; writes require staff; deletes require admin.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use padel_core::error::CoreError;
use padel_core::promotion::{validate_quota_config, QuotaMode};
use padel_core::stage::{
    ensure_stage_open, validate_min_matches, validate_stage_dates, validate_stage_transition,
    VALID_STAGE_STATUSES,
};
use padel_core::types::DbId;
use padel_core::validation::{validate_non_empty, validate_one_of};
use padel_db::models::stage::{
    CreateStage, Stage, StageListParams, StageStatusUpdate, UpdateStage,
};
use padel_db::repositories::StageRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::standings::find_stage;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::resolve_page;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_PROMOTION_QUOTA: i32 = 2;
const DEFAULT_RELEGATION_QUOTA: i32 = 2;

/// GET /api/v1/circuit/stages
pub async fn list_stages(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<StageListParams>,
) -> AppResult<Json<DataResponse<Vec<Stage>>>> {
    if let Some(status) = params.status.as_deref() {
        validate_one_of(status, VALID_STAGE_STATUSES, "status")?;
    }
    let (limit, offset) = resolve_page(params.limit, params.offset);
    let stages = StageRepo::list(&state.pool, params.status.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse::new(stages)))
}

/// POST /api/v1/circuit/stages
///
/// Create a stage in `planned` status. Quotas default to two promotions and
/// two relegations per division (`fixed` mode) and no minimum matches.
pub async fn create_stage(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<CreateStage>,
) -> AppResult<(StatusCode, Json<DataResponse<Stage>>)> {
    validate_non_empty(&input.name, "name")?;
    validate_stage_dates(input.starts_on, input.ends_on)?;
    let mode = match input.quota_mode.as_deref() {
        Some(m) => QuotaMode::parse(m)?,
        None => QuotaMode::Fixed,
    };
    validate_quota_config(
        mode,
        input.promotion_quota.unwrap_or(DEFAULT_PROMOTION_QUOTA),
        input.relegation_quota.unwrap_or(DEFAULT_RELEGATION_QUOTA),
    )?;
    if let Some(min) = input.min_matches {
        validate_min_matches(min)?;
    }

    let stage = StageRepo::create(&state.pool, &input).await?;
    tracing::info!(stage_id = stage.id, user_id = user.user_id, "Stage created");

    Ok((StatusCode::CREATED, Json(DataResponse::new(stage))))
}

/// GET /api/v1/circuit/stages/{id}
pub async fn get_stage(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Stage>>> {
    let stage = find_stage(&state.pool, id).await?;
    Ok(Json(DataResponse::new(stage)))
}

/// PUT /api/v1/circuit/stages/{id}
///
/// Edit a stage that has not finished. Quota and date checks run against
/// the merged (existing + patch) values.
pub async fn update_stage(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStage>,
) -> AppResult<Json<DataResponse<Stage>>> {
    let existing = find_stage(&state.pool, id).await?;
    ensure_stage_open(&existing.status)?;

    if let Some(name) = input.name.as_deref() {
        validate_non_empty(name, "name")?;
    }
    validate_stage_dates(
        input.starts_on.unwrap_or(existing.starts_on),
        input.ends_on.unwrap_or(existing.ends_on),
    )?;
    let mode = QuotaMode::parse(input.quota_mode.as_deref().unwrap_or(&existing.quota_mode))?;
    validate_quota_config(
        mode,
        input.promotion_quota.unwrap_or(existing.promotion_quota),
        input.relegation_quota.unwrap_or(existing.relegation_quota),
    )?;
    if let Some(min) = input.min_matches {
        validate_min_matches(min)?;
    }

    let stage = StageRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Stage",
            id,
        }))?;

    tracing::info!(stage_id = id, user_id = user.user_id, "Stage updated");
    Ok(Json(DataResponse::new(stage)))
}

/// DELETE /api/v1/circuit/stages/{id}
///
/// Delete a stage with its divisions, enrollments, match days and results.
pub async fn delete_stage(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !StageRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Stage",
            id,
        }));
    }
    tracing::info!(stage_id = id, admin_id = admin.user_id, "Stage deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/circuit/stages/{id}/status
///
/// `planned -> active -> finished`. Anything else is 409.
pub async fn update_stage_status(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<StageStatusUpdate>,
) -> AppResult<Json<DataResponse<Stage>>> {
    let existing = find_stage(&state.pool, id).await?;
    validate_stage_transition(&existing.status, &input.status)?;

    let stage = StageRepo::update_status(&state.pool, id, &existing.status, &input.status)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Stage status changed concurrently; reload and retry".into(),
            ))
        })?;

    tracing::info!(
        stage_id = id,
        from = %existing.status,
        to = %stage.status,
        user_id = user.user_id,
        "Stage status changed"
    );
    Ok(Json(DataResponse::new(stage)))
}
