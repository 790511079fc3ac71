//! Repository for the `tournaments` table.

use padel_core::tournament::{REGISTRATION_CANCELLED, TOURNAMENT_OPEN};
use padel_core::types::DbId;
use sqlx::PgPool;

use crate::models::tournament::{CreateTournament, Tournament, UpdateTournament};

const COLUMNS: &str = "id, name, description, category, starts_on, ends_on, \
                        registration_deadline, max_pairs, entry_fee_cents, status, \
                        created_at, updated_at";

/// Provides CRUD operations for tournaments.
pub struct TournamentRepo;

impl TournamentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateTournament,
    ) -> Result<Tournament, sqlx::Error> {
        let query = format!(
            "INSERT INTO tournaments
                (name, description, category, starts_on, ends_on,
                 registration_deadline, max_pairs, entry_fee_cents)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tournament>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.starts_on)
            .bind(input.ends_on)
            .bind(input.registration_deadline)
            .bind(input.max_pairs)
            .bind(input.entry_fee_cents)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tournament>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tournaments WHERE id = $1");
        sqlx::query_as::<_, Tournament>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tournaments by start date, newest first, optionally by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Tournament>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tournaments
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY starts_on DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Tournament>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Open tournaments that have not started yet, soonest first.
    pub async fn list_public(pool: &PgPool, limit: i64) -> Result<Vec<Tournament>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tournaments
             WHERE status = $1 AND starts_on >= CURRENT_DATE
             ORDER BY starts_on ASC, id ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, Tournament>(&query)
            .bind(TOURNAMENT_OPEN)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update a tournament. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTournament,
    ) -> Result<Option<Tournament>, sqlx::Error> {
        let query = format!(
            "UPDATE tournaments SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                starts_on = COALESCE($5, starts_on),
                ends_on = COALESCE($6, ends_on),
                registration_deadline = COALESCE($7, registration_deadline),
                max_pairs = COALESCE($8, max_pairs),
                entry_fee_cents = COALESCE($9, entry_fee_cents)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tournament>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.starts_on)
            .bind(input.ends_on)
            .bind(input.registration_deadline)
            .bind(input.max_pairs)
            .bind(input.entry_fee_cents)
            .fetch_optional(pool)
            .await
    }

    /// Move a tournament from `from` to `to`.
    ///
    /// Returns `None` if the tournament no longer has status `from`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<Tournament>, sqlx::Error> {
        let query = format!(
            "UPDATE tournaments SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tournament>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    /// Delete a tournament and, by cascade, its registrations and payments.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tournaments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of registrations that still hold a slot.
    pub async fn count_registered(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM tournament_registrations
             WHERE tournament_id = $1 AND status <> $2",
        )
        .bind(id)
        .bind(REGISTRATION_CANCELLED)
        .fetch_one(pool)
        .await
    }
}
