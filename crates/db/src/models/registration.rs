//! Tournament registration model and DTOs.

use padel_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tournament_registrations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Registration {
    pub id: DbId,
    pub tournament_id: DbId,
    pub player_id: DbId,
    pub partner_id: Option<DbId>,
    pub status: String,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A registration joined with player and partner names, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RegistrationWithPlayers {
    pub id: DbId,
    pub tournament_id: DbId,
    pub player_id: DbId,
    pub player_name: String,
    pub partner_id: Option<DbId>,
    pub partner_name: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// Body of `POST /tournaments/{id}/registrations`.
///
/// Staff may register any player; players register themselves and leave
/// `player_id` empty.
#[derive(Debug, Deserialize)]
pub struct CreateRegistration {
    pub player_id: Option<DbId>,
    pub partner_id: Option<DbId>,
    pub notes: Option<String>,
}

/// A registration to insert, after the open/deadline/capacity checks.
#[derive(Debug)]
pub struct NewRegistration<'a> {
    pub tournament_id: DbId,
    pub player_id: DbId,
    pub partner_id: Option<DbId>,
    pub notes: Option<&'a str>,
    pub status: &'static str,
    pub payment_status: &'static str,
}

/// Body of `PUT /registrations/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateRegistrationStatus {
    pub status: String,
}

/// Response of a successful registration: the row plus the payment to
/// complete at the gateway, when the tournament has a fee.
#[derive(Debug, Serialize)]
pub struct RegistrationCreated {
    pub registration: Registration,
    pub payment: Option<crate::models::payment::Payment>,
}
