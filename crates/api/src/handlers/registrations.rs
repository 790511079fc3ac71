//! Handlers for tournament registrations.
//!
//! Staff see and manage every registration. Players register themselves
//! and only see the registrations they take part in (as player or partner).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use padel_core::error::CoreError;
use padel_core::tournament::{
    check_registration_open, validate_partner, RegistrationWindow, PAYMENT_STATUS_PENDING,
    PAYMENT_STATUS_UNPAID, REGISTRATION_CANCELLED, REGISTRATION_CONFIRMED, REGISTRATION_PENDING,
    VALID_REGISTRATION_STATUSES,
};
use padel_core::types::DbId;
use padel_core::validation::validate_one_of;
use padel_db::models::player::Player;
use padel_db::models::registration::{
    CreateRegistration, NewRegistration, Registration, RegistrationCreated,
    RegistrationWithPlayers, UpdateRegistrationStatus,
};
use padel_db::repositories::{PlayerRepo, RegistrationRepo, TournamentRepo};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::tournaments::find_tournament;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tournaments/{id}/registrations
pub async fn list_registrations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tournament_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<RegistrationWithPlayers>>>> {
    find_tournament(&state, tournament_id).await?;

    let registrations = if auth.is_staff() {
        RegistrationRepo::list_for_tournament(&state.pool, tournament_id, None).await?
    } else {
        match PlayerRepo::find_by_user_id(&state.pool, auth.user_id).await? {
            Some(player) => {
                RegistrationRepo::list_for_tournament(&state.pool, tournament_id, Some(player.id))
                    .await?
            }
            None => Vec::new(),
        }
    };

    Ok(Json(DataResponse::new(registrations)))
}

/// POST /api/v1/tournaments/{id}/registrations
///
/// Register a pair. The tournament must be open, before its deadline and
/// not full. A tournament with an entry fee leaves the registration
/// `pending` with a pending payment to complete at the gateway; a free one
/// is confirmed immediately.
pub async fn create_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tournament_id): Path<DbId>,
    Json(input): Json<CreateRegistration>,
) -> AppResult<(StatusCode, Json<DataResponse<RegistrationCreated>>)> {
    let tournament = find_tournament(&state, tournament_id).await?;

    let player = if auth.is_staff() {
        match input.player_id {
            Some(id) => find_player(&state, id, "Player").await?,
            None => own_player(&state, &auth).await?,
        }
    } else {
        let own = own_player(&state, &auth).await?;
        if input.player_id.is_some_and(|id| id != own.id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Players can only register themselves".into(),
            )));
        }
        own
    };

    if !player.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Player {} is inactive",
            player.id
        ))));
    }
    validate_partner(player.id, input.partner_id)?;
    if let Some(partner_id) = input.partner_id {
        find_player(&state, partner_id, "Partner").await?;
    }

    let registered = TournamentRepo::count_registered(&state.pool, tournament_id).await?;
    check_registration_open(
        &RegistrationWindow {
            status: &tournament.status,
            registration_deadline: tournament.registration_deadline,
            max_pairs: tournament.max_pairs,
            registered,
        },
        Utc::now(),
    )?;

    let paid = tournament.entry_fee_cents > 0;
    let new_registration = NewRegistration {
        tournament_id,
        player_id: player.id,
        partner_id: input.partner_id,
        notes: input.notes.as_deref(),
        status: if paid {
            REGISTRATION_PENDING
        } else {
            REGISTRATION_CONFIRMED
        },
        payment_status: if paid {
            PAYMENT_STATUS_PENDING
        } else {
            PAYMENT_STATUS_UNPAID
        },
    };
    let payment = paid.then(|| (Uuid::new_v4(), tournament.entry_fee_cents));

    let (registration, payment) =
        RegistrationRepo::create(&state.pool, &new_registration, payment)
            .await?
            .ok_or_else(tournament_full)?;

    tracing::info!(
        registration_id = registration.id,
        tournament_id,
        player_id = player.id,
        paid,
        "Tournament registration created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(RegistrationCreated {
            registration,
            payment,
        })),
    ))
}

/// PUT /api/v1/registrations/{id}/status
///
/// Manually confirm or cancel a registration (e.g. cash payments).
///
/// Reviving a cancelled registration takes a slot again, so it is subject to
/// the same open, deadline and capacity checks as a new one.
pub async fn update_registration_status(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRegistrationStatus>,
) -> AppResult<Json<DataResponse<Registration>>> {
    validate_one_of(&input.status, VALID_REGISTRATION_STATUSES, "status")?;

    let existing = RegistrationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Registration",
            id,
        }))?;

    let registration = if existing.status == REGISTRATION_CANCELLED
        && input.status != REGISTRATION_CANCELLED
    {
        let tournament = find_tournament(&state, existing.tournament_id).await?;
        let registered =
            TournamentRepo::count_registered(&state.pool, existing.tournament_id).await?;
        check_registration_open(
            &RegistrationWindow {
                status: &tournament.status,
                registration_deadline: tournament.registration_deadline,
                max_pairs: tournament.max_pairs,
                registered,
            },
            Utc::now(),
        )?;
        RegistrationRepo::reinstate(&state.pool, id, existing.tournament_id, &input.status)
            .await?
            .ok_or_else(tournament_full)?
    } else {
        RegistrationRepo::update_status(&state.pool, id, &input.status)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Registration",
                id,
            }))?
    };

    tracing::info!(
        registration_id = id,
        status = %registration.status,
        user_id = user.user_id,
        "Registration status changed"
    );
    Ok(Json(DataResponse::new(registration)))
}

/// DELETE /api/v1/registrations/{id}
pub async fn delete_registration(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !RegistrationRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Registration",
            id,
        }));
    }
    tracing::info!(registration_id = id, admin_id = admin.user_id, "Registration deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tournament_full() -> AppError {
    AppError::Core(CoreError::Conflict("Tournament is full".into()))
}

async fn find_player(state: &AppState, id: DbId, entity: &'static str) -> AppResult<Player> {
    PlayerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity, id }))
}

async fn own_player(state: &AppState, auth: &AuthUser) -> AppResult<Player> {
    PlayerRepo::find_by_user_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Create a player profile before registering".into(),
            ))
        })
}

/// Fetch a registration the caller may see: staff see all, players only
/// those where they are player or partner.
pub(crate) async fn find_visible_registration(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<Registration> {
    let registration = RegistrationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Registration",
            id,
        }))?;

    if auth.is_staff() {
        return Ok(registration);
    }
    let own = PlayerRepo::find_by_user_id(&state.pool, auth.user_id).await?;
    match own {
        Some(p) if p.id == registration.player_id || Some(p.id) == registration.partner_id => {
            Ok(registration)
        }
        _ => Err(AppError::Core(CoreError::Forbidden(
            "You can only access your own registrations".into(),
        ))),
    }
}
