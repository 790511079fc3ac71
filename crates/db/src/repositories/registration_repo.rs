//! Repository for the `tournament_registrations` table.

use padel_core::tournament::REGISTRATION_CANCELLED;
use padel_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::payment::{CreatePayment, Payment};
use crate::models::registration::{NewRegistration, Registration, RegistrationWithPlayers};
use crate::repositories::payment_repo;

const COLUMNS: &str = "id, tournament_id, player_id, partner_id, status, payment_status, \
                        notes, created_at, updated_at";

/// Lock the tournament row and report whether it still has a free slot.
///
/// Concurrent writers for the same tournament queue on the lock, so the
/// count stays valid until the transaction ends.
async fn lock_free_slot(
    tx: &mut Transaction<'_, Postgres>,
    tournament_id: DbId,
) -> Result<bool, sqlx::Error> {
    let max_pairs: Option<i32> =
        sqlx::query_scalar("SELECT max_pairs FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_one(&mut **tx)
            .await?;
    let Some(max_pairs) = max_pairs else {
        return Ok(true);
    };

    let registered: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM tournament_registrations
         WHERE tournament_id = $1 AND status <> $2",
    )
    .bind(tournament_id)
    .bind(REGISTRATION_CANCELLED)
    .fetch_one(&mut **tx)
    .await?;
    Ok(registered < i64::from(max_pairs))
}

/// Provides CRUD operations for tournament registrations.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Insert a registration and, when `payment` is given, its pending
    /// payment, in one transaction.
    ///
    /// Returns `None` (and writes nothing) when the tournament is full.
    pub async fn create(
        pool: &PgPool,
        input: &NewRegistration<'_>,
        payment: Option<(uuid::Uuid, i64)>,
    ) -> Result<Option<(Registration, Option<Payment>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if !lock_free_slot(&mut tx, input.tournament_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO tournament_registrations
                (tournament_id, player_id, partner_id, notes, status, payment_status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let registration = sqlx::query_as::<_, Registration>(&query)
            .bind(input.tournament_id)
            .bind(input.player_id)
            .bind(input.partner_id)
            .bind(input.notes)
            .bind(input.status)
            .bind(input.payment_status)
            .fetch_one(&mut *tx)
            .await?;

        let payment = match payment {
            Some((external_reference, amount_cents)) => Some(
                payment_repo::insert(
                    &mut tx,
                    &CreatePayment {
                        registration_id: registration.id,
                        external_reference,
                        amount_cents,
                    },
                )
                .await?,
            ),
            None => None,
        };

        tx.commit().await?;
        Ok(Some((registration, payment)))
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tournament_registrations WHERE id = $1");
        sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Registrations of a tournament with player names, oldest first.
    ///
    /// When `player_id` is set only that player's registrations (as player or
    /// partner) are returned.
    pub async fn list_for_tournament(
        pool: &PgPool,
        tournament_id: DbId,
        player_id: Option<DbId>,
    ) -> Result<Vec<RegistrationWithPlayers>, sqlx::Error> {
        sqlx::query_as::<_, RegistrationWithPlayers>(
            "SELECT r.id, r.tournament_id, r.player_id,
                    p.first_name || ' ' || p.last_name AS player_name,
                    r.partner_id,
                    CASE WHEN q.id IS NULL THEN NULL
                         ELSE q.first_name || ' ' || q.last_name END AS partner_name,
                    r.status, r.payment_status, r.notes, r.created_at
             FROM tournament_registrations r
             JOIN players p ON p.id = r.player_id
             LEFT JOIN players q ON q.id = r.partner_id
             WHERE r.tournament_id = $1
               AND ($2::BIGINT IS NULL OR r.player_id = $2 OR r.partner_id = $2)
             ORDER BY r.created_at ASC, r.id ASC",
        )
        .bind(tournament_id)
        .bind(player_id)
        .fetch_all(pool)
        .await
    }

    /// Set the registration status. Returns `None` if not found.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!(
            "UPDATE tournament_registrations SET status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Move a cancelled registration back to `status`, if its tournament
    /// still has a free slot.
    ///
    /// Returns `None` (and writes nothing) when the tournament is full or
    /// the registration is no longer cancelled.
    pub async fn reinstate(
        pool: &PgPool,
        id: DbId,
        tournament_id: DbId,
        status: &str,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if !lock_free_slot(&mut tx, tournament_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "UPDATE tournament_registrations SET status = $2
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let registration = sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .bind(status)
            .bind(REGISTRATION_CANCELLED)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(registration)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tournament_registrations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
