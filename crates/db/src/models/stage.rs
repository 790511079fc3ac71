//! Circuit stage ("etapa") model and DTOs.

use chrono::NaiveDate;
use padel_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `circuit_stages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Stage {
    pub id: DbId,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub status: String,
    pub quota_mode: String,
    pub promotion_quota: i32,
    pub relegation_quota: i32,
    /// Matches a player needs to be eligible for promotion.
    pub min_matches: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a stage. New stages start as `planned`.
#[derive(Debug, Deserialize)]
pub struct CreateStage {
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub quota_mode: Option<String>,
    pub promotion_quota: Option<i32>,
    pub relegation_quota: Option<i32>,
    pub min_matches: Option<i32>,
}

/// DTO for updating a stage. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateStage {
    pub name: Option<String>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub quota_mode: Option<String>,
    pub promotion_quota: Option<i32>,
    pub relegation_quota: Option<i32>,
    pub min_matches: Option<i32>,
}

/// Body of `POST /circuit/stages/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StageStatusUpdate {
    pub status: String,
}

/// Query parameters for stage listings.
#[derive(Debug, Deserialize)]
pub struct StageListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
