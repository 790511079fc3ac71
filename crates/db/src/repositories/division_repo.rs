//! Repository for the `divisions` table.

use padel_core::stage::ENROLLMENT_ACTIVE;
use padel_core::types::DbId;
use sqlx::PgPool;

use crate::models::division::{CreateDivision, Division, DivisionSummary, UpdateDivision};

const COLUMNS: &str = "id, stage_id, name, level, created_at, updated_at";

/// Provides CRUD operations for divisions.
pub struct DivisionRepo;

impl DivisionRepo {
    pub async fn create(
        pool: &PgPool,
        stage_id: DbId,
        input: &CreateDivision,
    ) -> Result<Division, sqlx::Error> {
        let query = format!(
            "INSERT INTO divisions (stage_id, name, level)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Division>(&query)
            .bind(stage_id)
            .bind(input.name.trim())
            .bind(input.level)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Division>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM divisions WHERE id = $1");
        sqlx::query_as::<_, Division>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Divisions of a stage, top division first.
    pub async fn list_for_stage(
        pool: &PgPool,
        stage_id: DbId,
    ) -> Result<Vec<Division>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM divisions WHERE stage_id = $1 ORDER BY level ASC"
        );
        sqlx::query_as::<_, Division>(&query)
            .bind(stage_id)
            .fetch_all(pool)
            .await
    }

    /// Divisions of a stage with their active player counts, top first.
    pub async fn list_summaries(
        pool: &PgPool,
        stage_id: DbId,
    ) -> Result<Vec<DivisionSummary>, sqlx::Error> {
        sqlx::query_as::<_, DivisionSummary>(
            "SELECT d.id, d.stage_id, d.name, d.level,
                    COUNT(e.id) AS active_players
             FROM divisions d
             LEFT JOIN stage_enrollments e ON e.division_id = d.id AND e.status = $2
             WHERE d.stage_id = $1
             GROUP BY d.id
             ORDER BY d.level ASC",
        )
        .bind(stage_id)
        .bind(ENROLLMENT_ACTIVE)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDivision,
    ) -> Result<Option<Division>, sqlx::Error> {
        let query = format!(
            "UPDATE divisions SET
                name = COALESCE($2, name),
                level = COALESCE($3, level)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Division>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.level)
            .fetch_optional(pool)
            .await
    }

    /// Delete a division and its match days. Enrollments in it lose their
    /// division.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM divisions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
