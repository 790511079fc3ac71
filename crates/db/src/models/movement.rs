//! Applied promotion/relegation movement model.

use padel_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `stage_movements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StageMovement {
    pub id: DbId,
    pub stage_id: DbId,
    pub target_stage_id: DbId,
    pub enrollment_id: DbId,
    pub player_id: DbId,
    pub from_division_id: Option<DbId>,
    pub to_division_id: Option<DbId>,
    pub from_level: i32,
    pub to_level: i32,
    pub position: i32,
    pub kind: String,
    pub created_at: Timestamp,
}

/// A movement to persist, resolved against the target stage's divisions.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub enrollment_id: DbId,
    pub player_id: DbId,
    pub from_division_id: DbId,
    pub to_division_id: DbId,
    pub from_level: i32,
    pub to_level: i32,
    pub position: i32,
    pub kind: &'static str,
}

/// Body of `POST /circuit/stages/{id}/movements/apply`.
#[derive(Debug, Deserialize)]
pub struct ApplyMovements {
    pub target_stage_id: DbId,
}
