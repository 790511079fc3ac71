//! Handlers for the `/tournaments` resource.
//!
//! Reads require authentication; writes require staff, deletes require admin.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use padel_core::error::CoreError;
use padel_core::tournament::{
    validate_max_pairs, validate_tournament_dates, validate_tournament_transition,
    TOURNAMENT_CANCELLED, TOURNAMENT_FINISHED, VALID_TOURNAMENT_STATUSES,
};
use padel_core::types::DbId;
use padel_core::validation::{validate_non_empty, validate_non_negative, validate_one_of};
use padel_db::models::tournament::{
    CreateTournament, Tournament, TournamentListParams, TournamentStatusUpdate, UpdateTournament,
};
use padel_db::repositories::TournamentRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::resolve_page;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tournaments
///
/// List tournaments, newest start date first. Optional `?status=` filter.
pub async fn list_tournaments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<TournamentListParams>,
) -> AppResult<Json<DataResponse<Vec<Tournament>>>> {
    if let Some(status) = params.status.as_deref() {
        validate_one_of(status, VALID_TOURNAMENT_STATUSES, "status")?;
    }
    let (limit, offset) = resolve_page(params.limit, params.offset);
    let tournaments =
        TournamentRepo::list(&state.pool, params.status.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse::new(tournaments)))
}

/// POST /api/v1/tournaments
///
/// Create a tournament in `draft` status.
pub async fn create_tournament(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<CreateTournament>,
) -> AppResult<(StatusCode, Json<DataResponse<Tournament>>)> {
    validate_non_empty(&input.name, "name")?;
    validate_tournament_dates(input.starts_on, input.ends_on)?;
    validate_max_pairs(input.max_pairs)?;
    if let Some(fee) = input.entry_fee_cents {
        validate_non_negative(fee, "entry_fee_cents")?;
    }

    let tournament = TournamentRepo::create(&state.pool, &input).await?;
    tracing::info!(
        tournament_id = tournament.id,
        user_id = user.user_id,
        "Tournament created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(tournament))))
}

/// GET /api/v1/tournaments/{id}
pub async fn get_tournament(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Tournament>>> {
    let tournament = find_tournament(&state, id).await?;
    Ok(Json(DataResponse::new(tournament)))
}

/// PUT /api/v1/tournaments/{id}
///
/// Edit tournament details. Finished or cancelled tournaments are read-only.
pub async fn update_tournament(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTournament>,
) -> AppResult<Json<DataResponse<Tournament>>> {
    let existing = find_tournament(&state, id).await?;
    if existing.status == TOURNAMENT_FINISHED || existing.status == TOURNAMENT_CANCELLED {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A {} tournament cannot be edited",
            existing.status
        ))));
    }

    if let Some(name) = input.name.as_deref() {
        validate_non_empty(name, "name")?;
    }
    validate_tournament_dates(
        input.starts_on.unwrap_or(existing.starts_on),
        input.ends_on.or(existing.ends_on),
    )?;
    validate_max_pairs(input.max_pairs)?;
    if let Some(fee) = input.entry_fee_cents {
        validate_non_negative(fee, "entry_fee_cents")?;
    }

    let tournament = TournamentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tournament",
            id,
        }))?;

    tracing::info!(tournament_id = id, user_id = user.user_id, "Tournament updated");
    Ok(Json(DataResponse::new(tournament)))
}

/// DELETE /api/v1/tournaments/{id}
///
/// Delete a tournament together with its registrations and payments.
pub async fn delete_tournament(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TournamentRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Tournament",
            id,
        }));
    }
    tracing::info!(tournament_id = id, admin_id = admin.user_id, "Tournament deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tournaments/{id}/status
///
/// Move a tournament through its lifecycle. Illegal transitions are 409.
pub async fn update_tournament_status(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<TournamentStatusUpdate>,
) -> AppResult<Json<DataResponse<Tournament>>> {
    let existing = find_tournament(&state, id).await?;
    validate_tournament_transition(&existing.status, &input.status)?;

    let tournament =
        TournamentRepo::update_status(&state.pool, id, &existing.status, &input.status)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "Tournament status changed concurrently; reload and retry".into(),
                ))
            })?;

    tracing::info!(
        tournament_id = id,
        from = %existing.status,
        to = %tournament.status,
        user_id = user.user_id,
        "Tournament status changed"
    );
    Ok(Json(DataResponse::new(tournament)))
}

pub(crate) async fn find_tournament(state: &AppState, id: DbId) -> AppResult<Tournament> {
    TournamentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tournament",
            id,
        }))
}
