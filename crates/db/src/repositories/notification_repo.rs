//! Repository for the `notifications` table.

use padel_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{NewNotification, Notification};

const COLUMNS: &str = "id, user_id, kind, title, body, is_read, read_at, created_at";

/// In-app notifications. Rows are written by the draw, movement and payment
/// flows and only ever read or marked read afterwards.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a batch with one statement. Returns the number inserted.
    pub async fn create_many(
        pool: &PgPool,
        notifications: &[NewNotification],
    ) -> Result<u64, sqlx::Error> {
        if notifications.is_empty() {
            return Ok(0);
        }
        let user_ids: Vec<DbId> = notifications.iter().map(|n| n.user_id).collect();
        let kinds: Vec<&str> = notifications.iter().map(|n| n.kind).collect();
        let titles: Vec<&str> = notifications.iter().map(|n| n.title.as_str()).collect();
        let bodies: Vec<&str> = notifications.iter().map(|n| n.body.as_str()).collect();

        let result = sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, body)
             SELECT * FROM UNNEST($1::BIGINT[], $2::TEXT[], $3::TEXT[], $4::TEXT[])",
        )
        .bind(&user_ids)
        .bind(&kinds)
        .bind(&titles)
        .bind(&bodies)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// A user's notifications, newest first, optionally unread only.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark one of the user's notifications read. Idempotent: an already
    /// read notification keeps its original `read_at`.
    ///
    /// `None` when the id does not exist or belongs to someone else.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications
             SET is_read = true, read_at = COALESCE(read_at, NOW())
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(notification_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Returns how many were unread.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        sqlx::query(
            "UPDATE notifications SET is_read = true, read_at = NOW()
             WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(pool)
        .await
        .map(|r| r.rows_affected())
    }

    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
