//! Repository for the `circuit_stages` table.

use padel_core::types::DbId;
use sqlx::PgPool;

use crate::models::stage::{CreateStage, Stage, UpdateStage};

const COLUMNS: &str = "id, name, starts_on, ends_on, status, quota_mode, promotion_quota, \
                        relegation_quota, min_matches, created_at, updated_at";

/// Provides CRUD operations for circuit stages.
pub struct StageRepo;

impl StageRepo {
    /// Insert a new stage. Omitted quota settings take the column defaults.
    pub async fn create(pool: &PgPool, input: &CreateStage) -> Result<Stage, sqlx::Error> {
        let query = format!(
            "INSERT INTO circuit_stages
                (name, starts_on, ends_on, quota_mode, promotion_quota, relegation_quota, min_matches)
             VALUES ($1, $2, $3,
                     COALESCE($4, 'fixed'), COALESCE($5, 2), COALESCE($6, 2), COALESCE($7, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Stage>(&query)
            .bind(input.name.trim())
            .bind(input.starts_on)
            .bind(input.ends_on)
            .bind(&input.quota_mode)
            .bind(input.promotion_quota)
            .bind(input.relegation_quota)
            .bind(input.min_matches)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Stage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM circuit_stages WHERE id = $1");
        sqlx::query_as::<_, Stage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List stages, most recent first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Stage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM circuit_stages
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY starts_on DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Stage>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a stage. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStage,
    ) -> Result<Option<Stage>, sqlx::Error> {
        let query = format!(
            "UPDATE circuit_stages SET
                name = COALESCE($2, name),
                starts_on = COALESCE($3, starts_on),
                ends_on = COALESCE($4, ends_on),
                quota_mode = COALESCE($5, quota_mode),
                promotion_quota = COALESCE($6, promotion_quota),
                relegation_quota = COALESCE($7, relegation_quota),
                min_matches = COALESCE($8, min_matches)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Stage>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.starts_on)
            .bind(input.ends_on)
            .bind(&input.quota_mode)
            .bind(input.promotion_quota)
            .bind(input.relegation_quota)
            .bind(input.min_matches)
            .fetch_optional(pool)
            .await
    }

    /// Move a stage from `from` to `to`.
    ///
    /// Returns `None` if the stage no longer has status `from`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<Stage>, sqlx::Error> {
        let query = format!(
            "UPDATE circuit_stages SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Stage>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    /// Delete a stage with its divisions, enrollments and match days.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM circuit_stages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
