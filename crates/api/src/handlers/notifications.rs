//! Handlers for the `/notifications` resource, plus best-effort dispatch
//! used by the draw, movement and payment flows.
//!
//! All endpoints require authentication via [`AuthUser`].

use axum::extract::{Path, Query, State};
use axum::Json;
use padel_core::error::CoreError;
use padel_core::types::DbId;
use padel_db::models::notification::{NewNotification, Notification, NotificationListParams};
use padel_db::repositories::NotificationRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::resolve_page;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body of `GET /notifications`.
#[derive(Debug, Serialize)]
pub struct NotificationList {
    pub unread_count: i64,
    pub items: Vec<Notification>,
}

/// Response body of `POST /notifications/read-all`.
#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

/// GET /api/v1/notifications
///
/// List the authenticated user's notifications, newest first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationListParams>,
) -> AppResult<Json<DataResponse<NotificationList>>> {
    let (limit, offset) = resolve_page(params.limit, params.offset);

    let items = NotificationRepo::list_for_user(
        &state.pool,
        auth.user_id,
        params.unread_only,
        limit,
        offset,
    )
    .await?;
    let unread_count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;

    Ok(Json(DataResponse::new(NotificationList {
        unread_count,
        items,
    })))
}

/// POST /api/v1/notifications/{id}/read
///
/// Safe to repeat. 404 when the notification belongs to someone else.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Notification>>> {
    let notification = NotificationRepo::mark_read(&state.pool, notification_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }))?;
    Ok(Json(DataResponse::new(notification)))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked_read = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse::new(MarkedRead { marked_read })))
}

/// Insert notifications after the triggering change has committed.
///
/// Failures are logged and swallowed: the change itself already succeeded.
pub(crate) async fn dispatch(state: &AppState, notifications: Vec<NewNotification>) {
    if notifications.is_empty() {
        return;
    }
    match NotificationRepo::create_many(&state.pool, &notifications).await {
        Ok(count) => tracing::debug!(count, "Notifications dispatched"),
        Err(e) => tracing::warn!(error = %e, "Failed to dispatch notifications"),
    }
}
