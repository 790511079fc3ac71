pub mod admin;
pub mod auth;
pub mod divisions;
pub mod enrollments;
pub mod match_days;
pub mod movements;
pub mod notifications;
pub mod payments;
pub mod players;
pub mod public;
pub mod registrations;
pub mod stages;
pub mod standings;
pub mod tournaments;
