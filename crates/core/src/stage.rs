//! Circuit stage ("etapa") lifecycle and related status vocabularies.

use chrono::NaiveDate;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Stage status
// ---------------------------------------------------------------------------

/// Created, divisions and enrollments being set up.
pub const STAGE_PLANNED: &str = "planned";
/// Match days are being drawn and played.
pub const STAGE_ACTIVE: &str = "active";
/// Closed; movements have been (or may be) applied.
pub const STAGE_FINISHED: &str = "finished";

pub const VALID_STAGE_STATUSES: &[&str] = &[STAGE_PLANNED, STAGE_ACTIVE, STAGE_FINISHED];

/// Validate a requested stage status transition.
///
/// Only `planned -> active` and `active -> finished` are allowed.
pub fn validate_stage_transition(from: &str, to: &str) -> Result<(), CoreError> {
    if !VALID_STAGE_STATUSES.contains(&to) {
        return Err(CoreError::Validation(format!(
            "Invalid stage status '{to}'. Must be one of: {}",
            VALID_STAGE_STATUSES.join(", ")
        )));
    }
    match (from, to) {
        (STAGE_PLANNED, STAGE_ACTIVE) | (STAGE_ACTIVE, STAGE_FINISHED) => Ok(()),
        _ => Err(CoreError::Conflict(format!(
            "Stage cannot move from '{from}' to '{to}'"
        ))),
    }
}

/// Draws and results are only accepted while the stage is active.
pub fn ensure_stage_active(status: &str) -> Result<(), CoreError> {
    if status != STAGE_ACTIVE {
        return Err(CoreError::Conflict(format!(
            "Stage must be '{STAGE_ACTIVE}' for this operation (currently '{status}')"
        )));
    }
    Ok(())
}

/// Divisions, enrollments and quotas can only change before the stage ends.
pub fn ensure_stage_open(status: &str) -> Result<(), CoreError> {
    if status == STAGE_FINISHED {
        return Err(CoreError::Conflict("Stage is already finished".into()));
    }
    Ok(())
}

pub fn validate_stage_dates(starts_on: NaiveDate, ends_on: NaiveDate) -> Result<(), CoreError> {
    if ends_on < starts_on {
        return Err(CoreError::Validation(
            "ends_on must not be before starts_on".into(),
        ));
    }
    Ok(())
}

pub fn validate_min_matches(min_matches: i32) -> Result<(), CoreError> {
    if min_matches < 0 {
        return Err(CoreError::Validation(
            "min_matches must be non-negative".into(),
        ));
    }
    Ok(())
}

/// Division levels start at 1 (the top division).
pub fn validate_division_level(level: i32) -> Result<(), CoreError> {
    if level < 1 {
        return Err(CoreError::Validation(format!(
            "Division level must be at least 1, got {level}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Enrollment status
// ---------------------------------------------------------------------------

pub const ENROLLMENT_ACTIVE: &str = "active";
pub const ENROLLMENT_SUBSTITUTE: &str = "substitute";
pub const ENROLLMENT_WITHDRAWN: &str = "withdrawn";

pub const VALID_ENROLLMENT_STATUSES: &[&str] =
    &[ENROLLMENT_ACTIVE, ENROLLMENT_SUBSTITUTE, ENROLLMENT_WITHDRAWN];

/// An active enrollment must be placed in a division.
pub fn validate_enrollment_placement(
    status: &str,
    division_id: Option<i64>,
) -> Result<(), CoreError> {
    if !VALID_ENROLLMENT_STATUSES.contains(&status) {
        return Err(CoreError::Validation(format!(
            "Invalid enrollment status '{status}'. Must be one of: {}",
            VALID_ENROLLMENT_STATUSES.join(", ")
        )));
    }
    if status == ENROLLMENT_ACTIVE && division_id.is_none() {
        return Err(CoreError::Validation(
            "An active enrollment requires a division_id".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Match day / match status
// ---------------------------------------------------------------------------

pub const MATCH_DAY_SCHEDULED: &str = "scheduled";
pub const MATCH_DAY_DRAWN: &str = "drawn";
pub const MATCH_DAY_PLAYED: &str = "played";

pub const MATCH_PENDING: &str = "pending";
pub const MATCH_PLAYED: &str = "played";
