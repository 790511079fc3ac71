//! Tournament model and DTOs.

use chrono::NaiveDate;
use padel_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tournaments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tournament {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub registration_deadline: Option<Timestamp>,
    pub max_pairs: Option<i32>,
    pub entry_fee_cents: i64,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a tournament. New tournaments start as `draft`.
#[derive(Debug, Deserialize)]
pub struct CreateTournament {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub registration_deadline: Option<Timestamp>,
    pub max_pairs: Option<i32>,
    pub entry_fee_cents: Option<i64>,
}

/// DTO for updating a tournament. Status changes go through
/// [`TournamentStatusUpdate`].
#[derive(Debug, Deserialize)]
pub struct UpdateTournament {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub registration_deadline: Option<Timestamp>,
    pub max_pairs: Option<i32>,
    pub entry_fee_cents: Option<i64>,
}

/// Body of `POST /tournaments/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct TournamentStatusUpdate {
    pub status: String,
}

/// Query parameters for `GET /tournaments`.
#[derive(Debug, Deserialize)]
pub struct TournamentListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
