//! Stage enrollment model and DTOs.

use padel_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `stage_enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub stage_id: DbId,
    pub player_id: DbId,
    /// `None` for substitutes without a preferred division.
    pub division_id: Option<DbId>,
    pub status: String,
    pub inherited_points: i32,
    pub inherited_matches: i32,
    pub replaces_enrollment_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An enrollment joined with the player's name, user account and the
/// division level.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentDetail {
    pub id: DbId,
    pub stage_id: DbId,
    pub player_id: DbId,
    pub player_name: String,
    #[serde(skip_serializing)]
    pub user_id: Option<DbId>,
    pub division_id: Option<DbId>,
    pub division_level: Option<i32>,
    pub status: String,
    pub inherited_points: i32,
    pub inherited_matches: i32,
    pub replaces_enrollment_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for enrolling a player in a stage.
#[derive(Debug, Deserialize)]
pub struct CreateEnrollment {
    pub player_id: DbId,
    pub division_id: Option<DbId>,
    /// `active` (default) or `substitute`.
    pub status: Option<String>,
}

/// DTO for moving an enrollment between divisions or changing its status.
#[derive(Debug, Deserialize)]
pub struct UpdateEnrollment {
    pub division_id: Option<DbId>,
    pub status: Option<String>,
}

/// Body of `POST /circuit/enrollments/{id}/withdraw`.
#[derive(Debug, Default, Deserialize)]
pub struct WithdrawEnrollment {
    /// Whether the substitute inherits the withdrawn record. Defaults to true.
    pub inherit: Option<bool>,
    /// Pick a specific substitute instead of the best-ranked candidate.
    pub replacement_enrollment_id: Option<DbId>,
    /// Withdraw without bringing in a substitute.
    #[serde(default)]
    pub skip_replacement: bool,
}

/// Query parameters for `GET /circuit/stages/{id}/enrollments`.
#[derive(Debug, Deserialize)]
pub struct EnrollmentListParams {
    pub division_id: Option<DbId>,
    pub status: Option<String>,
}

/// Outcome of a withdrawal.
#[derive(Debug, Serialize)]
pub struct WithdrawalResult {
    pub withdrawn: Enrollment,
    pub replacement: Option<Enrollment>,
    /// Pending matches where the substitute took the withdrawn player's place.
    pub reassigned_matches: u64,
}
