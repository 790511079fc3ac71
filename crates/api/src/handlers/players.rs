//! Handlers for the `/players` resource.
//!
//! Staff manage every profile. Other users can create, read and edit the
//! profile linked to their own account.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use padel_core::error::CoreError;
use padel_core::types::DbId;
use padel_db::models::player::{CreatePlayer, Player, PlayerListParams, UpdatePlayer};
use padel_db::repositories::PlayerRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::resolve_page;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/players
///
/// List players. Supports `?search=`, `?include_inactive=true`, `limit` and
/// `offset`.
pub async fn list_players(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<PlayerListParams>,
) -> AppResult<Json<DataResponse<Vec<Player>>>> {
    let (limit, offset) = resolve_page(params.limit, params.offset);
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let players =
        PlayerRepo::list(&state.pool, search, params.include_inactive, limit, offset).await?;
    Ok(Json(DataResponse::new(players)))
}

/// POST /api/v1/players
///
/// Create a player profile. Staff may link any user (or none); everyone
/// else creates the profile for their own account, once.
pub async fn create_player(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut input): Json<CreatePlayer>,
) -> AppResult<(StatusCode, Json<DataResponse<Player>>)> {
    input.validate()?;

    if !auth.is_staff() {
        if PlayerRepo::find_by_user_id(&state.pool, auth.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::Core(CoreError::Conflict(
                "A player profile already exists for this account".into(),
            )));
        }
        input.user_id = Some(auth.user_id);
    }

    let player = PlayerRepo::create(&state.pool, &input).await?;
    tracing::info!(player_id = player.id, user_id = auth.user_id, "Player created");

    Ok((StatusCode::CREATED, Json(DataResponse::new(player))))
}

/// GET /api/v1/players/me
///
/// The profile linked to the authenticated account.
pub async fn get_my_player(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Player>>> {
    let player = PlayerRepo::find_by_user_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Player profile for user",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse::new(player)))
}

/// GET /api/v1/players/{id}
pub async fn get_player(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Player>>> {
    let player = find_player(&state, id).await?;
    ensure_owner_or_staff(&auth, &player)?;
    Ok(Json(DataResponse::new(player)))
}

/// PUT /api/v1/players/{id}
///
/// Update a profile. Only staff may change `is_active`.
pub async fn update_player(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlayer>,
) -> AppResult<Json<DataResponse<Player>>> {
    input.validate()?;

    let existing = find_player(&state, id).await?;
    ensure_owner_or_staff(&auth, &existing)?;
    if !auth.is_staff() && input.is_active.is_some() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only staff can change a player's active flag".into(),
        )));
    }

    let player = PlayerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Player",
            id,
        }))?;

    tracing::info!(player_id = id, user_id = auth.user_id, "Player updated");
    Ok(Json(DataResponse::new(player)))
}

/// DELETE /api/v1/players/{id}
///
/// Soft-deactivate a player. History (registrations, circuit results) is kept.
pub async fn deactivate_player(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PlayerRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Player",
            id,
        }));
    }
    tracing::info!(player_id = id, admin_id = admin.user_id, "Player deactivated");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_player(state: &AppState, id: DbId) -> AppResult<Player> {
    PlayerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Player",
            id,
        }))
}

fn ensure_owner_or_staff(auth: &AuthUser, player: &Player) -> AppResult<()> {
    if auth.is_staff() || player.user_id == Some(auth.user_id) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "You can only access your own player profile".into(),
        )))
    }
}
