//! Repository for the `players` table.

use padel_core::types::DbId;
use sqlx::PgPool;

use crate::models::player::{CreatePlayer, Player, UpdatePlayer};

const COLUMNS: &str = "id, user_id, first_name, last_name, email, phone, category, \
                        is_active, created_at, updated_at";

/// Provides CRUD operations for player profiles.
pub struct PlayerRepo;

impl PlayerRepo {
    pub async fn create(pool: &PgPool, input: &CreatePlayer) -> Result<Player, sqlx::Error> {
        let query = format!(
            "INSERT INTO players (user_id, first_name, last_name, email, phone, category)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Player>(&query)
            .bind(input.user_id)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(input.email.trim())
            .bind(&input.phone)
            .bind(&input.category)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Player>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM players WHERE id = $1");
        sqlx::query_as::<_, Player>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the player profile linked to a login account.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Player>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM players WHERE user_id = $1");
        sqlx::query_as::<_, Player>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List players ordered by last name, then first name.
    ///
    /// `search` matches first name, last name or email case-insensitively.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Player>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM players
             WHERE ($1::TEXT IS NULL
                    OR first_name ILIKE '%' || $1 || '%'
                    OR last_name ILIKE '%' || $1 || '%'
                    OR email ILIKE '%' || $1 || '%')
               AND ($2 OR is_active = true)
             ORDER BY last_name, first_name, id
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Player>(&query)
            .bind(search)
            .bind(include_inactive)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a player. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlayer,
    ) -> Result<Option<Player>, sqlx::Error> {
        let query = format!(
            "UPDATE players SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                category = COALESCE($6, category),
                is_active = COALESCE($7, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Player>(&query)
            .bind(id)
            .bind(input.first_name.as_deref().map(str::trim))
            .bind(input.last_name.as_deref().map(str::trim))
            .bind(input.email.as_deref().map(str::trim))
            .bind(&input.phone)
            .bind(&input.category)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a player. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE players SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
