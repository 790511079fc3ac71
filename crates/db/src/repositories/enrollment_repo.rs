//! Repository for the `stage_enrollments` table.

use padel_core::replacement::Inheritance;
use padel_core::stage::{
    ENROLLMENT_ACTIVE, ENROLLMENT_SUBSTITUTE, ENROLLMENT_WITHDRAWN, MATCH_PENDING,
};
use padel_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::{
    CreateEnrollment, Enrollment, EnrollmentDetail, UpdateEnrollment, WithdrawalResult,
};

const COLUMNS: &str = "id, stage_id, player_id, division_id, status, inherited_points, \
                        inherited_matches, replaces_enrollment_id, created_at, updated_at";

/// Select list and joins for [`EnrollmentDetail`].
const DETAIL_SELECT: &str = "SELECT e.id, e.stage_id, e.player_id,
        p.first_name || ' ' || p.last_name AS player_name, p.user_id,
        e.division_id, d.level AS division_level, e.status,
        e.inherited_points, e.inherited_matches, e.replaces_enrollment_id, e.created_at
     FROM stage_enrollments e
     JOIN players p ON p.id = e.player_id
     LEFT JOIN divisions d ON d.id = e.division_id";

/// Provides CRUD operations and withdrawals for stage enrollments.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    pub async fn create(
        pool: &PgPool,
        stage_id: DbId,
        input: &CreateEnrollment,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO stage_enrollments (stage_id, player_id, division_id, status)
             VALUES ($1, $2, $3, COALESCE($4, '{ENROLLMENT_ACTIVE}'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(stage_id)
            .bind(input.player_id)
            .bind(input.division_id)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stage_enrollments WHERE id = $1");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EnrollmentDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE e.id = $1");
        sqlx::query_as::<_, EnrollmentDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Enrollments of a stage, optionally filtered by division and status.
    pub async fn list_for_stage(
        pool: &PgPool,
        stage_id: DbId,
        division_id: Option<DbId>,
        status: Option<&str>,
    ) -> Result<Vec<EnrollmentDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE e.stage_id = $1
               AND ($2::BIGINT IS NULL OR e.division_id = $2)
               AND ($3::TEXT IS NULL OR e.status = $3)
             ORDER BY d.level ASC NULLS LAST, p.last_name, p.first_name, e.id"
        );
        sqlx::query_as::<_, EnrollmentDetail>(&query)
            .bind(stage_id)
            .bind(division_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Active players of a division, by enrollment id.
    pub async fn list_active_for_division(
        pool: &PgPool,
        division_id: DbId,
    ) -> Result<Vec<EnrollmentDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE e.division_id = $1 AND e.status = $2
             ORDER BY e.id"
        );
        sqlx::query_as::<_, EnrollmentDetail>(&query)
            .bind(division_id)
            .bind(ENROLLMENT_ACTIVE)
            .fetch_all(pool)
            .await
    }

    /// Substitutes of a stage waiting for a slot, oldest enrollment first.
    pub async fn list_substitutes(
        pool: &PgPool,
        stage_id: DbId,
    ) -> Result<Vec<EnrollmentDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE e.stage_id = $1 AND e.status = $2
             ORDER BY e.created_at, e.id"
        );
        sqlx::query_as::<_, EnrollmentDetail>(&query)
            .bind(stage_id)
            .bind(ENROLLMENT_SUBSTITUTE)
            .fetch_all(pool)
            .await
    }

    /// Update division and/or status. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEnrollment,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "UPDATE stage_enrollments SET
                division_id = COALESCE($2, division_id),
                status = COALESCE($3, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(input.division_id)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Withdraw an active enrollment and optionally hand its slot to a
    /// substitute, in one transaction.
    ///
    /// The substitute becomes active in `division_id`, records which
    /// enrollment it replaces, receives `inheritance` and takes the
    /// withdrawn player's place in that division's pending matches.
    ///
    /// Returns `None` (and writes nothing) if the enrollment is no longer
    /// active or the substitute is no longer waiting.
    pub async fn withdraw(
        pool: &PgPool,
        id: DbId,
        replacement: Option<(DbId, DbId, Inheritance)>,
    ) -> Result<Option<WithdrawalResult>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE stage_enrollments SET status = $2
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let Some(withdrawn) = sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(ENROLLMENT_WITHDRAWN)
            .bind(ENROLLMENT_ACTIVE)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let Some((substitute_id, division_id, inheritance)) = replacement else {
            tx.commit().await?;
            return Ok(Some(WithdrawalResult {
                withdrawn,
                replacement: None,
                reassigned_matches: 0,
            }));
        };

        let query = format!(
            "UPDATE stage_enrollments SET
                status = $2,
                division_id = $3,
                inherited_points = $4,
                inherited_matches = $5,
                replaces_enrollment_id = $6
             WHERE id = $1 AND status = $7 AND stage_id = $8
             RETURNING {COLUMNS}"
        );
        let Some(substitute) = sqlx::query_as::<_, Enrollment>(&query)
            .bind(substitute_id)
            .bind(ENROLLMENT_ACTIVE)
            .bind(division_id)
            .bind(inheritance.points)
            .bind(inheritance.matches)
            .bind(withdrawn.id)
            .bind(ENROLLMENT_SUBSTITUTE)
            .bind(withdrawn.stage_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let reassigned = sqlx::query(
            "UPDATE circuit_matches SET
                team_a_player1 = CASE WHEN team_a_player1 = $1 THEN $2 ELSE team_a_player1 END,
                team_a_player2 = CASE WHEN team_a_player2 = $1 THEN $2 ELSE team_a_player2 END,
                team_b_player1 = CASE WHEN team_b_player1 = $1 THEN $2 ELSE team_b_player1 END,
                team_b_player2 = CASE WHEN team_b_player2 = $1 THEN $2 ELSE team_b_player2 END
             WHERE status = $3
               AND $1 IN (team_a_player1, team_a_player2, team_b_player1, team_b_player2)",
        )
        .bind(withdrawn.id)
        .bind(substitute.id)
        .bind(MATCH_PENDING)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(Some(WithdrawalResult {
            withdrawn,
            replacement: Some(substitute),
            reassigned_matches: reassigned,
        }))
    }

    /// Remove an enrollment. Fails with a foreign key violation once the
    /// player appears in a drawn match.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stage_enrollments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
