//! Payment model.

use padel_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub registration_id: DbId,
    /// Reference handed to the gateway checkout.
    pub external_reference: Uuid,
    /// Gateway payment id, known after the first webhook.
    pub external_id: Option<String>,
    pub amount_cents: i64,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a payment.
#[derive(Debug)]
pub struct CreatePayment {
    pub registration_id: DbId,
    pub external_reference: Uuid,
    pub amount_cents: i64,
}

/// Outcome of processing a webhook, returned to the gateway.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// `applied`, `unchanged`, `stale` or `ignored`.
    pub result: &'static str,
    pub payment_id: Option<DbId>,
    pub status: Option<String>,
}
