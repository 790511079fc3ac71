//! Match day ("fecha") model and DTOs.

use chrono::NaiveDate;
use padel_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::circuit_match::MatchDetail;

/// A row from the `match_days` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MatchDay {
    pub id: DbId,
    pub division_id: DbId,
    pub round_number: i32,
    pub played_on: Option<NaiveDate>,
    pub status: String,
    pub draw_mode: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for scheduling a match day. `round_number` defaults to the next round.
#[derive(Debug, Deserialize)]
pub struct CreateMatchDay {
    pub round_number: Option<i32>,
    pub played_on: Option<NaiveDate>,
}

/// A match day with its matches and the players sitting out.
#[derive(Debug, Serialize)]
pub struct MatchDayWithMatches {
    #[serde(flatten)]
    pub match_day: MatchDay,
    pub matches: Vec<MatchDetail>,
    pub byes: Vec<DbId>,
}
