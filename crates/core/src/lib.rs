//! Domain core for the padel academy platform.
//!
//! Pure logic only: status vocabularies, validation helpers and the circuit
//! engine (scoring, averages, standings, draws, promotions, replacements).
//! Nothing in this crate performs I/O.

pub mod averages;
pub mod draw;
pub mod error;
pub mod hashing;
pub mod pagination;
pub mod payment;
pub mod promotion;
pub mod replacement;
pub mod roles;
pub mod scoring;
pub mod stage;
pub mod standings;
pub mod tournament;
pub mod types;
pub mod validation;
