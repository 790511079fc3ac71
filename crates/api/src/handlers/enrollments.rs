//! Handlers for stage enrollments, withdrawals and replacements
//! ("reemplazos").

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use padel_core::averages::tally_matches;
use padel_core::error::CoreError;
use padel_core::replacement::{
    inheritance, rank_candidates, select_replacement, ReplacementCandidate,
};
use padel_core::stage::{
    ensure_stage_open, validate_enrollment_placement, ENROLLMENT_ACTIVE, ENROLLMENT_SUBSTITUTE,
    ENROLLMENT_WITHDRAWN, VALID_ENROLLMENT_STATUSES,
};
use padel_core::types::DbId;
use padel_core::validation::validate_one_of;
use padel_db::models::enrollment::{
    CreateEnrollment, Enrollment, EnrollmentDetail, EnrollmentListParams, UpdateEnrollment,
    WithdrawEnrollment, WithdrawalResult,
};
use padel_db::repositories::{EnrollmentRepo, MatchRepo, PlayerRepo};
use padel_db::DbPool;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::standings::{find_division, find_stage, DivisionTable};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /circuit/stages/{id}/replacement-candidates`.
#[derive(Debug, Deserialize)]
pub struct CandidateParams {
    /// Division whose slot needs filling.
    pub division_id: DbId,
}

// ---------------------------------------------------------------------------
// Enrollments
// ---------------------------------------------------------------------------

/// GET /api/v1/circuit/stages/{id}/enrollments
///
/// Optional `?division_id=` and `?status=` filters.
pub async fn list_enrollments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(stage_id): Path<DbId>,
    Query(params): Query<EnrollmentListParams>,
) -> AppResult<Json<DataResponse<Vec<EnrollmentDetail>>>> {
    find_stage(&state.pool, stage_id).await?;
    if let Some(status) = params.status.as_deref() {
        validate_one_of(status, VALID_ENROLLMENT_STATUSES, "status")?;
    }
    let enrollments = EnrollmentRepo::list_for_stage(
        &state.pool,
        stage_id,
        params.division_id,
        params.status.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse::new(enrollments)))
}

/// POST /api/v1/circuit/stages/{id}/enrollments
///
/// Enroll a player as `active` (division required) or `substitute`
/// (division optional, recorded as a preference). One enrollment per player
/// per stage; a duplicate is 409.
pub async fn create_enrollment(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(stage_id): Path<DbId>,
    Json(input): Json<CreateEnrollment>,
) -> AppResult<(StatusCode, Json<DataResponse<Enrollment>>)> {
    let stage = find_stage(&state.pool, stage_id).await?;
    ensure_stage_open(&stage.status)?;

    let status = input.status.as_deref().unwrap_or(ENROLLMENT_ACTIVE);
    validate_one_of(status, &[ENROLLMENT_ACTIVE, ENROLLMENT_SUBSTITUTE], "status")?;
    validate_enrollment_placement(status, input.division_id)?;
    if let Some(division_id) = input.division_id {
        ensure_division_in_stage(&state.pool, division_id, stage_id).await?;
    }

    let player = PlayerRepo::find_by_id(&state.pool, input.player_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Player",
            id: input.player_id,
        }))?;
    if !player.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Player {} is inactive",
            player.id
        ))));
    }

    let enrollment = EnrollmentRepo::create(&state.pool, stage_id, &input).await?;
    tracing::info!(
        enrollment_id = enrollment.id,
        stage_id,
        player_id = player.id,
        status = %enrollment.status,
        user_id = user.user_id,
        "Player enrolled"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(enrollment))))
}

/// PUT /api/v1/circuit/enrollments/{id}
///
/// Move a player between divisions or between `active` and `substitute`.
/// Withdrawals go through the withdraw endpoint. Refused while the player
/// has pending matches.
pub async fn update_enrollment(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEnrollment>,
) -> AppResult<Json<DataResponse<Enrollment>>> {
    let existing = find_enrollment(&state.pool, id).await?;
    let stage = find_stage(&state.pool, existing.stage_id).await?;
    ensure_stage_open(&stage.status)?;

    if existing.status == ENROLLMENT_WITHDRAWN {
        return Err(AppError::Core(CoreError::Conflict(
            "A withdrawn enrollment cannot be changed".into(),
        )));
    }
    let status = input.status.as_deref().unwrap_or(&existing.status);
    validate_one_of(status, &[ENROLLMENT_ACTIVE, ENROLLMENT_SUBSTITUTE], "status")?;
    let division_id = input.division_id.or(existing.division_id);
    validate_enrollment_placement(status, division_id)?;
    if let Some(division_id) = input.division_id {
        ensure_division_in_stage(&state.pool, division_id, existing.stage_id).await?;
    }

    // Pending matches stay in the old division's draw; the player must
    // finish them or be replaced through a withdrawal first.
    if status != existing.status || division_id != existing.division_id {
        let pending = MatchRepo::count_pending_for_enrollment(&state.pool, id).await?;
        if pending > 0 {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Enrollment {id} still has {pending} pending matches"
            ))));
        }
    }

    let enrollment = EnrollmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id,
        }))?;

    tracing::info!(enrollment_id = id, user_id = user.user_id, "Enrollment updated");
    Ok(Json(DataResponse::new(enrollment)))
}

/// DELETE /api/v1/circuit/enrollments/{id}
///
/// Only possible while the player has not been drawn into any match;
/// afterwards the reference from the match makes it a 409.
pub async fn delete_enrollment(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !EnrollmentRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id,
        }));
    }
    tracing::info!(enrollment_id = id, admin_id = admin.user_id, "Enrollment deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Withdrawal and replacement
// ---------------------------------------------------------------------------

/// POST /api/v1/circuit/enrollments/{id}/withdraw
///
/// Withdraw an active player. Unless `skip_replacement` is set, the chosen
/// (or best-ranked) substitute takes over the slot and, with `inherit`
/// (default), the withdrawn player's points and matches. Pending matches
/// are reassigned to the substitute.
pub async fn withdraw_enrollment(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    input: Option<Json<WithdrawEnrollment>>,
) -> AppResult<Json<DataResponse<WithdrawalResult>>> {
    let input = input.map(|Json(i)| i).unwrap_or_default();

    let withdrawn = EnrollmentRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id,
        }))?;
    if withdrawn.status != ENROLLMENT_ACTIVE {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Only active enrollments can withdraw (status '{}')",
            withdrawn.status
        ))));
    }
    let stage = find_stage(&state.pool, withdrawn.stage_id).await?;
    ensure_stage_open(&stage.status)?;

    let (Some(division_id), Some(level)) = (withdrawn.division_id, withdrawn.division_level) else {
        return Err(AppError::Core(CoreError::Conflict(
            "Active enrollment has no division".into(),
        )));
    };

    let substitute = if input.skip_replacement {
        None
    } else if let Some(sub_id) = input.replacement_enrollment_id {
        let sub = EnrollmentRepo::find_detail(&state.pool, sub_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Enrollment",
                id: sub_id,
            }))?;
        if sub.stage_id != withdrawn.stage_id || sub.status != ENROLLMENT_SUBSTITUTE {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Enrollment {sub_id} is not a substitute of this stage"
            ))));
        }
        Some(sub.id)
    } else {
        let candidates = load_candidates(&state.pool, withdrawn.stage_id).await?;
        select_replacement(level, candidates).map(|c| c.enrollment_id)
    };

    let replacement = match substitute {
        Some(sub_id) => {
            let table = DivisionTable::load(&state.pool, division_id).await?;
            let tally = tally_matches(withdrawn.id, &table.matches)
                .with_inherited(withdrawn.inherited_points, withdrawn.inherited_matches);
            Some((
                sub_id,
                division_id,
                inheritance(&tally, input.inherit.unwrap_or(true)),
            ))
        }
        None => None,
    };

    let result = EnrollmentRepo::withdraw(&state.pool, id, replacement)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Enrollment or substitute changed concurrently; reload and retry".into(),
            ))
        })?;

    tracing::info!(
        enrollment_id = id,
        stage_id = withdrawn.stage_id,
        replacement_id = result.replacement.as_ref().map(|r| r.id),
        reassigned_matches = result.reassigned_matches,
        user_id = user.user_id,
        "Player withdrawn"
    );
    Ok(Json(DataResponse::new(result)))
}

/// GET /api/v1/circuit/stages/{id}/replacement-candidates?division_id=
///
/// Substitutes of the stage, best candidate for the division first.
pub async fn list_replacement_candidates(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(stage_id): Path<DbId>,
    Query(params): Query<CandidateParams>,
) -> AppResult<Json<DataResponse<Vec<ReplacementCandidate>>>> {
    find_stage(&state.pool, stage_id).await?;
    let division = ensure_division_in_stage(&state.pool, params.division_id, stage_id).await?;

    let candidates = load_candidates(&state.pool, stage_id).await?;
    Ok(Json(DataResponse::new(rank_candidates(
        division.level,
        candidates,
    ))))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_enrollment(pool: &DbPool, id: DbId) -> AppResult<Enrollment> {
    EnrollmentRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id,
        }))
}

async fn ensure_division_in_stage(
    pool: &DbPool,
    division_id: DbId,
    stage_id: DbId,
) -> AppResult<padel_db::models::division::Division> {
    let division = find_division(pool, division_id).await?;
    if division.stage_id != stage_id {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Division {division_id} does not belong to stage {stage_id}"
        ))));
    }
    Ok(division)
}

async fn load_candidates(pool: &DbPool, stage_id: DbId) -> AppResult<Vec<ReplacementCandidate>> {
    Ok(EnrollmentRepo::list_substitutes(pool, stage_id)
        .await?
        .into_iter()
        .map(|e| ReplacementCandidate {
            enrollment_id: e.id,
            player_id: e.player_id,
            player_name: e.player_name,
            preferred_level: e.division_level,
            enrolled_at: e.created_at,
        })
        .collect())
}
