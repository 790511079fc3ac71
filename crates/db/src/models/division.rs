//! Division model and DTOs.

use padel_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `divisions` table. Level 1 is the top division.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Division {
    pub id: DbId,
    pub stage_id: DbId,
    pub name: String,
    pub level: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A division with its number of active players, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DivisionSummary {
    pub id: DbId,
    pub stage_id: DbId,
    pub name: String,
    pub level: i32,
    pub active_players: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateDivision {
    pub name: String,
    pub level: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDivision {
    pub name: Option<String>,
    pub level: Option<i32>,
}
