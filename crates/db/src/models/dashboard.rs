//! Admin dashboard aggregates.

use serde::Serialize;
use sqlx::FromRow;

/// Headline counters for the back-office dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardStats {
    pub active_players: i64,
    pub open_tournaments: i64,
    pub pending_registrations: i64,
    pub active_stages: i64,
    pub approved_payments_cents: i64,
}
