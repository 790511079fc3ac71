//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod circuit_match;
pub mod dashboard;
pub mod division;
pub mod enrollment;
pub mod match_day;
pub mod movement;
pub mod notification;
pub mod payment;
pub mod player;
pub mod registration;
pub mod role;
pub mod session;
pub mod stage;
pub mod tournament;
pub mod user;
