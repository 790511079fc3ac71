//! Repository for the `stage_movements` table.

use padel_core::stage::ENROLLMENT_ACTIVE;
use padel_core::types::DbId;
use sqlx::PgPool;

use crate::models::movement::{NewMovement, StageMovement};

const COLUMNS: &str = "id, stage_id, target_stage_id, enrollment_id, player_id, \
                        from_division_id, to_division_id, from_level, to_level, position, \
                        kind, created_at";

/// Records promotion/relegation results and seeds the next stage.
pub struct MovementRepo;

impl MovementRepo {
    /// Persist the movements of `stage_id` and enroll every player in the
    /// resolved division of `target_stage_id`, in one transaction.
    ///
    /// Players already enrolled in the target stage are moved to their new
    /// division and reactivated, dropping any credit inherited from a
    /// replacement. Applying a stage twice fails on
    /// `uq_stage_movements_enrollment`.
    pub async fn apply(
        pool: &PgPool,
        stage_id: DbId,
        target_stage_id: DbId,
        movements: &[NewMovement],
    ) -> Result<Vec<StageMovement>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            "INSERT INTO stage_movements
                (stage_id, target_stage_id, enrollment_id, player_id, from_division_id,
                 to_division_id, from_level, to_level, position, kind)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let mut applied = Vec::with_capacity(movements.len());
        for m in movements {
            let row = sqlx::query_as::<_, StageMovement>(&insert)
                .bind(stage_id)
                .bind(target_stage_id)
                .bind(m.enrollment_id)
                .bind(m.player_id)
                .bind(m.from_division_id)
                .bind(m.to_division_id)
                .bind(m.from_level)
                .bind(m.to_level)
                .bind(m.position)
                .bind(m.kind)
                .fetch_one(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT INTO stage_enrollments (stage_id, player_id, division_id, status)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT ON CONSTRAINT uq_stage_enrollments_player
                 DO UPDATE SET
                    division_id = EXCLUDED.division_id,
                    status = EXCLUDED.status,
                    inherited_points = 0,
                    inherited_matches = 0,
                    replaces_enrollment_id = NULL",
            )
            .bind(target_stage_id)
            .bind(m.player_id)
            .bind(m.to_division_id)
            .bind(ENROLLMENT_ACTIVE)
            .execute(&mut *tx)
            .await?;

            applied.push(row);
        }

        tx.commit().await?;
        Ok(applied)
    }

    /// Applied movements of a stage, by origin level then position.
    pub async fn list_for_stage(
        pool: &PgPool,
        stage_id: DbId,
    ) -> Result<Vec<StageMovement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stage_movements
             WHERE stage_id = $1
             ORDER BY from_level, position"
        );
        sqlx::query_as::<_, StageMovement>(&query)
            .bind(stage_id)
            .fetch_all(pool)
            .await
    }

    pub async fn exists_for_stage(pool: &PgPool, stage_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM stage_movements WHERE stage_id = $1)")
            .bind(stage_id)
            .fetch_one(pool)
            .await
    }
}
