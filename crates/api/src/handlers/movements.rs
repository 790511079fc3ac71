//! Handlers for end-of-stage promotions and relegations
//! ("ascensos / descensos").

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use padel_core::error::CoreError;
use padel_core::promotion::{
    plan_movements, DivisionStanding, MovementKind, MovementPlan, QuotaMode,
};
use padel_core::stage::{ensure_stage_open, ENROLLMENT_ACTIVE, STAGE_FINISHED};
use padel_core::types::DbId;
use padel_db::models::movement::{ApplyMovements, NewMovement, StageMovement};
use padel_db::models::notification::{NewNotification, KIND_MOVEMENT_APPLIED};
use padel_db::models::stage::Stage;
use padel_db::repositories::{DivisionRepo, EnrollmentRepo, MovementRepo};
use padel_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::notifications::dispatch;
use crate::handlers::standings::{find_stage, stage_standings};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/circuit/stages/{id}/movements/preview
///
/// Compute the movements the current standings would produce, without
/// writing anything.
pub async fn preview_movements(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(stage_id): Path<DbId>,
) -> AppResult<Json<DataResponse<MovementPlan>>> {
    let stage = find_stage(&state.pool, stage_id).await?;
    let plan = plan_for_stage(&state.pool, &stage).await?;
    Ok(Json(DataResponse::new(plan)))
}

/// POST /api/v1/circuit/stages/{id}/movements/apply
///
/// Record the movements of a finished stage and enroll every ranked player
/// in the matching division of `target_stage_id`. A stage can only be
/// applied once.
pub async fn apply_movements(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(stage_id): Path<DbId>,
    Json(input): Json<ApplyMovements>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<StageMovement>>>)> {
    let stage = find_stage(&state.pool, stage_id).await?;
    if stage.status != STAGE_FINISHED {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Stage must be '{STAGE_FINISHED}' before applying movements (currently '{}')",
            stage.status
        ))));
    }
    if input.target_stage_id == stage_id {
        return Err(AppError::Core(CoreError::Validation(
            "target_stage_id must differ from the finished stage".into(),
        )));
    }
    let target = find_stage(&state.pool, input.target_stage_id).await?;
    ensure_stage_open(&target.status)?;

    if MovementRepo::exists_for_stage(&state.pool, stage_id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Movements of stage {stage_id} have already been applied"
        ))));
    }

    let plan = plan_for_stage(&state.pool, &stage).await?;

    let target_divisions: HashMap<i32, DbId> =
        DivisionRepo::list_for_stage(&state.pool, target.id)
            .await?
            .into_iter()
            .map(|d| (d.level, d.id))
            .collect();

    let mut new_movements = Vec::with_capacity(plan.movements.len());
    for m in &plan.movements {
        let to_division_id = *target_divisions.get(&m.to_level).ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Target stage {} has no division with level {}",
                target.id, m.to_level
            )))
        })?;
        new_movements.push(NewMovement {
            enrollment_id: m.enrollment_id,
            player_id: m.player_id,
            from_division_id: m.from_division_id,
            to_division_id,
            from_level: m.from_level,
            to_level: m.to_level,
            position: m.position as i32,
            kind: m.kind.as_str(),
        });
    }

    let applied = MovementRepo::apply(&state.pool, stage_id, target.id, &new_movements).await?;

    let promoted = plan
        .movements
        .iter()
        .filter(|m| m.kind == MovementKind::Promotion)
        .count();
    let relegated = plan
        .movements
        .iter()
        .filter(|m| m.kind == MovementKind::Relegation)
        .count();
    tracing::info!(
        stage_id,
        target_stage_id = target.id,
        movements = applied.len(),
        promoted,
        relegated,
        user_id = user.user_id,
        "Stage movements applied"
    );

    let users: HashMap<DbId, DbId> =
        EnrollmentRepo::list_for_stage(&state.pool, stage_id, None, Some(ENROLLMENT_ACTIVE))
            .await?
            .into_iter()
            .filter_map(|e| e.user_id.map(|u| (e.id, u)))
            .collect();
    let notifications = plan
        .movements
        .iter()
        .filter_map(|m| {
            let user_id = *users.get(&m.enrollment_id)?;
            let body = match m.kind {
                MovementKind::Promotion => format!("You were promoted to level {}.", m.to_level),
                MovementKind::Relegation => {
                    format!("You were relegated to level {}.", m.to_level)
                }
                MovementKind::Stay => format!("You stay in level {}.", m.to_level),
            };
            Some(NewNotification {
                user_id,
                kind: KIND_MOVEMENT_APPLIED,
                title: format!("{} results", stage.name),
                body,
            })
        })
        .collect();
    dispatch(&state, notifications).await;

    Ok((StatusCode::CREATED, Json(DataResponse::new(applied))))
}

/// GET /api/v1/circuit/stages/{id}/movements
pub async fn list_movements(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(stage_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StageMovement>>>> {
    find_stage(&state.pool, stage_id).await?;
    let movements = MovementRepo::list_for_stage(&state.pool, stage_id).await?;
    Ok(Json(DataResponse::new(movements)))
}

async fn plan_for_stage(pool: &DbPool, stage: &Stage) -> AppResult<MovementPlan> {
    let mode = QuotaMode::parse(&stage.quota_mode)?;
    let divisions: Vec<DivisionStanding> = stage_standings(pool, stage)
        .await?
        .into_iter()
        .map(|d| DivisionStanding {
            division_id: d.division_id,
            level: d.level,
            rows: d.rows,
        })
        .collect();
    Ok(plan_movements(
        mode,
        stage.promotion_quota,
        stage.relegation_quota,
        &divisions,
    ))
}
