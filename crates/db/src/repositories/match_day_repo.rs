//! Repository for the `match_days` table.

use padel_core::types::DbId;
use sqlx::PgPool;

use crate::models::match_day::{CreateMatchDay, MatchDay};

const COLUMNS: &str =
    "id, division_id, round_number, played_on, status, draw_mode, created_at, updated_at";

/// Provides CRUD operations for match days.
pub struct MatchDayRepo;

impl MatchDayRepo {
    /// Schedule a match day. Without an explicit round number the next
    /// round of the division is used.
    pub async fn create(
        pool: &PgPool,
        division_id: DbId,
        input: &CreateMatchDay,
    ) -> Result<MatchDay, sqlx::Error> {
        let query = format!(
            "INSERT INTO match_days (division_id, round_number, played_on)
             VALUES ($1,
                     COALESCE($2, (SELECT COALESCE(MAX(round_number), 0) + 1
                                   FROM match_days WHERE division_id = $1)),
                     $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MatchDay>(&query)
            .bind(division_id)
            .bind(input.round_number)
            .bind(input.played_on)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MatchDay>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM match_days WHERE id = $1");
        sqlx::query_as::<_, MatchDay>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Match days of a division in round order.
    pub async fn list_for_division(
        pool: &PgPool,
        division_id: DbId,
    ) -> Result<Vec<MatchDay>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM match_days WHERE division_id = $1 ORDER BY round_number"
        );
        sqlx::query_as::<_, MatchDay>(&query)
            .bind(division_id)
            .fetch_all(pool)
            .await
    }
}
