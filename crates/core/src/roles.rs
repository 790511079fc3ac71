//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_users_and_roles.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_COACH: &str = "coach";
pub const ROLE_PLAYER: &str = "player";

/// Staff roles may manage tournaments and the circuit.
pub fn is_staff(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_COACH
}
