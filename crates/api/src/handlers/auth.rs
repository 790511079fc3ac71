//! Login, token refresh and logout.
//!
//! A login opens a row in `user_sessions`; refreshing rotates it (the old
//! row is revoked, a new one created) and logout revokes every open session
//! of the caller.

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Duration, Utc};
use padel_core::error::CoreError;
use padel_core::types::DbId;
use padel_db::models::session::CreateSession;
use padel_db::models::user::User;
use padel_db::repositories::{PlayerRepo, RoleRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{issue_access_token, refresh_token_hash, RefreshToken};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Failed logins in a row that lock the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

const BAD_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    pub user: SessionUser,
}

/// The signed-in user and their linked player profile, if any.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub player_id: Option<DbId>,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let user = UserRepo::find_by_login(&state.pool, input.username.trim())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(BAD_CREDENTIALS.into())))?;

    ensure_can_sign_in(&user)?;

    let matches = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !matches {
        record_failed_attempt(&state, &user).await?;
        return Err(AppError::Core(CoreError::Unauthorized(BAD_CREDENTIALS.into())));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    SessionRepo::cleanup_for_user(&state.pool, user.id).await?;

    let response = open_session(&state, &user, client_info(&headers)).await?;
    tracing::info!(user_id = user.id, role = %response.user.role, "User logged in");
    Ok(Json(DataResponse::new(response)))
}

/// POST /api/v1/auth/refresh
///
/// Rotates the session: the presented refresh token stops working.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let hash = refresh_token_hash(&input.refresh_token);
    let session = SessionRepo::consume_refresh_token(&state.pool, &hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response = open_session(&state, &user, client_info(&headers)).await?;
    Ok(Json(DataResponse::new(response)))
}

/// POST /api/v1/auth/logout
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ensure_can_sign_in(user: &User) -> AppResult<()> {
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }
    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }
    Ok(())
}

async fn record_failed_attempt(state: &AppState, user: &User) -> AppResult<()> {
    let until = Utc::now() + Duration::minutes(LOCK_DURATION_MINS);
    let locked =
        UserRepo::record_failed_login(&state.pool, user.id, MAX_FAILED_ATTEMPTS, until).await?;
    if locked {
        tracing::warn!(user_id = user.id, %until, "Account locked after repeated failed logins");
    }
    Ok(())
}

/// User agent and forwarded client address, kept on the session row.
fn client_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let text = |value: Option<&axum::http::HeaderValue>| {
        value
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    };
    let user_agent = text(headers.get(USER_AGENT));
    let ip_address = text(headers.get("x-forwarded-for"))
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_owned()));
    (user_agent, ip_address)
}

/// Issue a token pair and persist the session behind the refresh token.
async fn open_session(
    state: &AppState,
    user: &User,
    (user_agent, ip_address): (Option<String>, Option<String>),
) -> AppResult<AuthResponse> {
    let role = RoleRepo::name_of(&state.pool, user.role_id).await?;
    let jwt = &state.config.jwt;

    let access_token = issue_access_token(user.id, &role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;
    let refresh = RefreshToken::generate();

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh.hash,
            expires_at: Utc::now() + jwt.refresh_ttl(),
            user_agent,
            ip_address,
        },
    )
    .await?;

    let player_id = PlayerRepo::find_by_user_id(&state.pool, user.id)
        .await?
        .map(|p| p.id);

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: jwt.access_ttl().num_seconds(),
        user: SessionUser {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role,
            player_id,
        },
    })
}
