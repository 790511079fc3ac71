//! Repository for the `payments` table.

use padel_core::payment::RegistrationEffect;
use padel_core::tournament::REGISTRATION_CANCELLED;
use padel_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::payment::{CreatePayment, Payment};

const COLUMNS: &str = "id, registration_id, external_reference, external_id, amount_cents, \
                        status, created_at, updated_at";

/// Insert a pending payment inside an open transaction.
pub(crate) async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    input: &CreatePayment,
) -> Result<Payment, sqlx::Error> {
    let query = format!(
        "INSERT INTO payments (registration_id, external_reference, amount_cents)
         VALUES ($1, $2, $3)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Payment>(&query)
        .bind(input.registration_id)
        .bind(input.external_reference)
        .bind(input.amount_cents)
        .fetch_one(&mut **tx)
        .await
}

/// Provides lookups and webhook-driven updates of payments.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Find the payment a webhook refers to: by gateway id first, then by
    /// the reference handed to checkout.
    pub async fn find_for_webhook(
        pool: &PgPool,
        external_id: &str,
        external_reference: Option<Uuid>,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments
             WHERE external_id = $1 OR external_reference = $2
             ORDER BY (external_id = $1) DESC NULLS LAST
             LIMIT 1"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(external_id)
            .bind(external_reference)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_registration(
        pool: &PgPool,
        registration_id: DbId,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments WHERE registration_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(registration_id)
            .fetch_all(pool)
            .await
    }

    /// Move a payment from `expected` to `next` and apply `effect` to its
    /// registration, in one transaction.
    ///
    /// Returns `None` when the payment is no longer in status `expected`
    /// (a concurrent delivery won); nothing is written in that case.
    pub async fn apply_transition(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        next: &str,
        external_id: &str,
        effect: RegistrationEffect,
        payload: &serde_json::Value,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE payments SET
                status = $3,
                external_id = COALESCE(external_id, $4),
                last_payload = $5
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        let Some(payment) = sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(expected)
            .bind(next)
            .bind(external_id)
            .bind(payload)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        // A cancelled registration only comes back through a staff
        // reinstatement, which checks capacity.
        sqlx::query(
            "UPDATE tournament_registrations SET
                payment_status = $2,
                status = CASE WHEN status = $4 THEN status ELSE COALESCE($3, status) END
             WHERE id = $1",
        )
        .bind(payment.registration_id)
        .bind(effect.payment_status)
        .bind(effect.status)
        .bind(REGISTRATION_CANCELLED)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(payment))
    }

    /// Record the payload of a redelivered or stale event without changing
    /// the status.
    pub async fn touch_payload(
        pool: &PgPool,
        id: DbId,
        external_id: &str,
        payload: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE payments SET external_id = COALESCE(external_id, $2), last_payload = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(external_id)
        .bind(payload)
        .execute(pool)
        .await?;
        Ok(())
    }
}
