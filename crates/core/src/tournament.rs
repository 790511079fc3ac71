//! Tournament lifecycle and registration rules.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Tournament status
// ---------------------------------------------------------------------------

pub const TOURNAMENT_DRAFT: &str = "draft";
pub const TOURNAMENT_OPEN: &str = "open";
pub const TOURNAMENT_CLOSED: &str = "closed";
pub const TOURNAMENT_FINISHED: &str = "finished";
pub const TOURNAMENT_CANCELLED: &str = "cancelled";

pub const VALID_TOURNAMENT_STATUSES: &[&str] = &[
    TOURNAMENT_DRAFT,
    TOURNAMENT_OPEN,
    TOURNAMENT_CLOSED,
    TOURNAMENT_FINISHED,
    TOURNAMENT_CANCELLED,
];

/// Validate a tournament status transition.
///
/// The only path is `draft -> open -> closed -> finished`. Anything not yet
/// finished may be cancelled.
pub fn validate_tournament_transition(from: &str, to: &str) -> Result<(), CoreError> {
    if !VALID_TOURNAMENT_STATUSES.contains(&to) {
        return Err(CoreError::Validation(format!(
            "Invalid tournament status '{to}'. Must be one of: {}",
            VALID_TOURNAMENT_STATUSES.join(", ")
        )));
    }
    let allowed = matches!(
        (from, to),
        (TOURNAMENT_DRAFT, TOURNAMENT_OPEN)
            | (TOURNAMENT_OPEN, TOURNAMENT_CLOSED)
            | (TOURNAMENT_CLOSED, TOURNAMENT_FINISHED)
    ) || (to == TOURNAMENT_CANCELLED
        && from != TOURNAMENT_FINISHED
        && from != TOURNAMENT_CANCELLED);

    if allowed {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Tournament cannot move from '{from}' to '{to}'"
        )))
    }
}

pub fn validate_tournament_dates(
    starts_on: NaiveDate,
    ends_on: Option<NaiveDate>,
) -> Result<(), CoreError> {
    if let Some(ends_on) = ends_on {
        if ends_on < starts_on {
            return Err(CoreError::Validation(
                "ends_on must not be before starts_on".into(),
            ));
        }
    }
    Ok(())
}

pub fn validate_max_pairs(max_pairs: Option<i32>) -> Result<(), CoreError> {
    match max_pairs {
        Some(n) if n < 1 => Err(CoreError::Validation(
            "max_pairs must be at least 1".into(),
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

pub const REGISTRATION_PENDING: &str = "pending";
pub const REGISTRATION_CONFIRMED: &str = "confirmed";
pub const REGISTRATION_CANCELLED: &str = "cancelled";

pub const VALID_REGISTRATION_STATUSES: &[&str] = &[
    REGISTRATION_PENDING,
    REGISTRATION_CONFIRMED,
    REGISTRATION_CANCELLED,
];

pub const PAYMENT_STATUS_UNPAID: &str = "unpaid";
pub const PAYMENT_STATUS_PENDING: &str = "pending";
pub const PAYMENT_STATUS_PAID: &str = "paid";
pub const PAYMENT_STATUS_REJECTED: &str = "rejected";
pub const PAYMENT_STATUS_REFUNDED: &str = "refunded";

/// Snapshot of the tournament values that decide whether it accepts entries.
#[derive(Debug, Clone)]
pub struct RegistrationWindow<'a> {
    pub status: &'a str,
    pub registration_deadline: Option<Timestamp>,
    pub max_pairs: Option<i32>,
    /// Current non-cancelled registrations.
    pub registered: i64,
}

/// Check that a new registration can be accepted at `now`.
pub fn check_registration_open(
    window: &RegistrationWindow<'_>,
    now: Timestamp,
) -> Result<(), CoreError> {
    if window.status != TOURNAMENT_OPEN {
        return Err(CoreError::Conflict(format!(
            "Tournament is not open for registration (status '{}')",
            window.status
        )));
    }
    if let Some(deadline) = window.registration_deadline {
        if now > deadline {
            return Err(CoreError::Conflict(
                "Registration deadline has passed".into(),
            ));
        }
    }
    if let Some(max) = window.max_pairs {
        if window.registered >= i64::from(max) {
            return Err(CoreError::Conflict("Tournament is full".into()));
        }
    }
    Ok(())
}

/// A player cannot register with themselves as partner.
pub fn validate_partner(player_id: i64, partner_id: Option<i64>) -> Result<(), CoreError> {
    if partner_id == Some(player_id) {
        return Err(CoreError::Validation(
            "partner_id must differ from player_id".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn window(status: &str) -> RegistrationWindow<'_> {
        RegistrationWindow {
            status,
            registration_deadline: None,
            max_pairs: None,
            registered: 0,
        }
    }

    #[test]
    fn lifecycle_forward_path() {
        assert!(validate_tournament_transition(TOURNAMENT_DRAFT, TOURNAMENT_OPEN).is_ok());
        assert!(validate_tournament_transition(TOURNAMENT_OPEN, TOURNAMENT_CLOSED).is_ok());
        assert!(validate_tournament_transition(TOURNAMENT_CLOSED, TOURNAMENT_FINISHED).is_ok());
    }

    #[test]
    fn closed_tournament_does_not_reopen() {
        assert!(matches!(
            validate_tournament_transition(TOURNAMENT_CLOSED, TOURNAMENT_OPEN),
            Err(CoreError::Conflict(_))
        ));
    }

    #[test]
    fn cancellation_allowed_until_finished() {
        assert!(validate_tournament_transition(TOURNAMENT_OPEN, TOURNAMENT_CANCELLED).is_ok());
        assert!(
            validate_tournament_transition(TOURNAMENT_FINISHED, TOURNAMENT_CANCELLED).is_err()
        );
        assert!(
            validate_tournament_transition(TOURNAMENT_CANCELLED, TOURNAMENT_CANCELLED).is_err()
        );
    }

    #[test]
    fn illegal_jumps_are_conflicts() {
        assert!(matches!(
            validate_tournament_transition(TOURNAMENT_DRAFT, TOURNAMENT_FINISHED),
            Err(CoreError::Conflict(_))
        ));
    }

    #[test]
    fn registration_requires_open_status() {
        let now = Utc::now();
        assert!(check_registration_open(&window(TOURNAMENT_DRAFT), now).is_err());
        assert!(check_registration_open(&window(TOURNAMENT_OPEN), now).is_ok());
    }

    #[test]
    fn registration_after_deadline_rejected() {
        let now = Utc::now();
        let mut w = window(TOURNAMENT_OPEN);
        w.registration_deadline = Some(now - Duration::hours(1));
        assert!(check_registration_open(&w, now).is_err());
    }

    #[test]
    fn full_tournament_rejects_registration() {
        let mut w = window(TOURNAMENT_OPEN);
        w.max_pairs = Some(2);
        w.registered = 2;
        let err = check_registration_open(&w, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("full"));
    }

    #[test]
    fn partner_checks() {
        assert!(validate_partner(1, Some(1)).is_err());
        assert!(validate_partner(1, Some(2)).is_ok());
        assert!(validate_partner(1, None).is_ok());
        assert!(validate_max_pairs(Some(0)).is_err());
    }
}
