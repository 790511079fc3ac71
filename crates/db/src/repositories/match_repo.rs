//! Repository for the `circuit_matches` table.

use padel_core::stage::{MATCH_DAY_DRAWN, MATCH_DAY_PLAYED, MATCH_PENDING, MATCH_PLAYED};
use padel_core::types::DbId;
use sqlx::PgPool;

use crate::models::circuit_match::{CircuitMatch, MatchDetail, NewMatch};
use crate::models::match_day::MatchDay;

const COLUMNS: &str = "id, match_day_id, court, team_a_player1, team_a_player2, \
                        team_b_player1, team_b_player2, games_a, games_b, forfeited_side, \
                        status, created_at, updated_at";

/// Provides draw publication, result recording and match lookups.
pub struct MatchRepo;

impl MatchRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CircuitMatch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM circuit_matches WHERE id = $1");
        sqlx::query_as::<_, CircuitMatch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Matches of a match day with player names, by court.
    pub async fn list_details(
        pool: &PgPool,
        match_day_id: DbId,
    ) -> Result<Vec<MatchDetail>, sqlx::Error> {
        sqlx::query_as::<_, MatchDetail>(
            "SELECT m.id, m.match_day_id, m.court,
                    m.team_a_player1, pa1.first_name || ' ' || pa1.last_name AS team_a_player1_name,
                    m.team_a_player2, pa2.first_name || ' ' || pa2.last_name AS team_a_player2_name,
                    m.team_b_player1, pb1.first_name || ' ' || pb1.last_name AS team_b_player1_name,
                    m.team_b_player2, pb2.first_name || ' ' || pb2.last_name AS team_b_player2_name,
                    m.games_a, m.games_b, m.forfeited_side, m.status
             FROM circuit_matches m
             JOIN stage_enrollments ea1 ON ea1.id = m.team_a_player1
             JOIN players pa1 ON pa1.id = ea1.player_id
             JOIN stage_enrollments ea2 ON ea2.id = m.team_a_player2
             JOIN players pa2 ON pa2.id = ea2.player_id
             JOIN stage_enrollments eb1 ON eb1.id = m.team_b_player1
             JOIN players pb1 ON pb1.id = eb1.player_id
             JOIN stage_enrollments eb2 ON eb2.id = m.team_b_player2
             JOIN players pb2 ON pb2.id = eb2.player_id
             WHERE m.match_day_id = $1
             ORDER BY m.court",
        )
        .bind(match_day_id)
        .fetch_all(pool)
        .await
    }

    /// Matches with a recorded result across all match days of a division.
    pub async fn list_played_for_division(
        pool: &PgPool,
        division_id: DbId,
    ) -> Result<Vec<CircuitMatch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM circuit_matches
             WHERE status = $2
               AND match_day_id IN (SELECT id FROM match_days WHERE division_id = $1)
             ORDER BY id"
        );
        sqlx::query_as::<_, CircuitMatch>(&query)
            .bind(division_id)
            .bind(MATCH_PLAYED)
            .fetch_all(pool)
            .await
    }

    /// Drawn matches still waiting for a result that include `enrollment_id`.
    pub async fn count_pending_for_enrollment(
        pool: &PgPool,
        enrollment_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM circuit_matches
             WHERE status = $2
               AND $1 IN (team_a_player1, team_a_player2, team_b_player1, team_b_player2)",
        )
        .bind(enrollment_id)
        .bind(MATCH_PENDING)
        .fetch_one(pool)
        .await
    }

    /// Replace the matches of a match day with a new draw, in one
    /// transaction, and mark the day as drawn with `mode`.
    ///
    /// Returns `None` (and writes nothing) once any match of the day has a
    /// result.
    pub async fn publish_draw(
        pool: &PgPool,
        match_day_id: DbId,
        mode: &str,
        matches: &[NewMatch],
    ) -> Result<Option<(MatchDay, Vec<CircuitMatch>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(match_day) = sqlx::query_as::<_, MatchDay>(
            "UPDATE match_days SET status = $2, draw_mode = $3
             WHERE id = $1
               AND NOT EXISTS (SELECT 1 FROM circuit_matches
                               WHERE match_day_id = $1 AND status = $4)
             RETURNING id, division_id, round_number, played_on, status, draw_mode,
                       created_at, updated_at",
        )
        .bind(match_day_id)
        .bind(MATCH_DAY_DRAWN)
        .bind(mode)
        .bind(MATCH_PLAYED)
        .fetch_optional(&mut *tx)
        .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM circuit_matches WHERE match_day_id = $1")
            .bind(match_day_id)
            .execute(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO circuit_matches
                (match_day_id, court, team_a_player1, team_a_player2, team_b_player1, team_b_player2)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let mut created = Vec::with_capacity(matches.len());
        for m in matches {
            let row = sqlx::query_as::<_, CircuitMatch>(&insert)
                .bind(match_day_id)
                .bind(m.court)
                .bind(m.team_a[0])
                .bind(m.team_a[1])
                .bind(m.team_b[0])
                .bind(m.team_b[1])
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(Some((match_day, created)))
    }

    /// Store a match result. Once no match of the day is pending the day is
    /// marked as played.
    pub async fn record_result(
        pool: &PgPool,
        id: DbId,
        games_a: i32,
        games_b: i32,
        forfeited_side: Option<&str>,
    ) -> Result<Option<CircuitMatch>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE circuit_matches SET
                games_a = $2, games_b = $3, forfeited_side = $4, status = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(updated) = sqlx::query_as::<_, CircuitMatch>(&query)
            .bind(id)
            .bind(games_a)
            .bind(games_b)
            .bind(forfeited_side)
            .bind(MATCH_PLAYED)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE match_days SET status = $2
             WHERE id = $1
               AND status <> $2
               AND NOT EXISTS (SELECT 1 FROM circuit_matches
                               WHERE match_day_id = $1 AND status = $3)",
        )
        .bind(updated.match_day_id)
        .bind(MATCH_DAY_PLAYED)
        .bind(MATCH_PENDING)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }
}
