//! Aggregate queries for the admin dashboard.

use padel_core::payment::PAYMENT_APPROVED;
use padel_core::stage::STAGE_ACTIVE;
use padel_core::tournament::{REGISTRATION_PENDING, TOURNAMENT_OPEN};
use sqlx::PgPool;

use crate::models::dashboard::DashboardStats;

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn stats(pool: &PgPool) -> Result<DashboardStats, sqlx::Error> {
        sqlx::query_as::<_, DashboardStats>(
            "SELECT
                (SELECT COUNT(*) FROM players WHERE is_active = true) AS active_players,
                (SELECT COUNT(*) FROM tournaments WHERE status = $1) AS open_tournaments,
                (SELECT COUNT(*) FROM tournament_registrations WHERE status = $2)
                    AS pending_registrations,
                (SELECT COUNT(*) FROM circuit_stages WHERE status = $3) AS active_stages,
                (SELECT COALESCE(SUM(amount_cents), 0)::BIGINT FROM payments WHERE status = $4)
                    AS approved_payments_cents",
        )
        .bind(TOURNAMENT_OPEN)
        .bind(REGISTRATION_PENDING)
        .bind(STAGE_ACTIVE)
        .bind(PAYMENT_APPROVED)
        .fetch_one(pool)
        .await
    }
}
