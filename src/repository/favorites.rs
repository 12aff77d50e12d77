//! User favorites repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};

use crate::{error::AppResult, models::favorite::ToggleOutcome};

/// Favorite row before its resource is loaded
#[derive(Debug, Clone, FromRow)]
pub struct FavoriteRow {
    pub id: i32,
    pub resource_id: i32,
    pub date_added: DateTime<Utc>,
}

#[derive(Clone)]
pub struct FavoritesRepository {
    pool: Pool<Postgres>,
}

impl FavoritesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Add the pair if absent, otherwise remove it. The unique constraint on
    /// (user_id, resource_id) decides which branch a request takes.
    pub async fn toggle(&self, user_id: i32, resource_id: i32) -> AppResult<ToggleOutcome> {
        let inserted: Option<i32> = sqlx::query_scalar(
            r#"
            INSERT INTO user_favorites (user_id, resource_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, resource_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(resource_id)
        .fetch_optional(&self.pool)
        .await?;

        if inserted.is_some() {
            return Ok(ToggleOutcome::Added);
        }

        sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND resource_id = $2")
            .bind(user_id)
            .bind(resource_id)
            .execute(&self.pool)
            .await?;

        Ok(ToggleOutcome::Removed)
    }

    pub async fn exists(&self, user_id: i32, resource_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_favorites WHERE user_id = $1 AND resource_id = $2)",
        )
        .bind(user_id)
        .bind(resource_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Ids of every resource the user marked
    pub async fn resource_ids(&self, user_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT resource_id FROM user_favorites WHERE user_id = $1 ORDER BY date_added DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn count_for_user(&self, user_id: i32) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_favorites WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// One page of the user's favorites, newest first
    pub async fn list_for_user(&self, user_id: i32, limit: i64, offset: i64) -> AppResult<Vec<FavoriteRow>> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r#"
            SELECT id, resource_id, date_added
            FROM user_favorites
            WHERE user_id = $1
            ORDER BY date_added DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
