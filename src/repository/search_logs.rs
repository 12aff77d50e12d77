//! Search history repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::search_log::{NewSearchLog, SearchLog},
};

const LOG_SELECT: &str = r#"
    SELECT l.id, l.query, l.user_id, u.username, l.timestamp, l.results_count
    FROM search_logs l
    LEFT JOIN users u ON u.id = l.user_id
"#;

#[derive(Clone)]
pub struct SearchLogsRepository {
    pool: Pool<Postgres>,
}

impl SearchLogsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Record one search
    pub async fn create(&self, entry: &NewSearchLog<'_>) -> AppResult<i32> {
        let results_count = i32::try_from(entry.results_count).unwrap_or(i32::MAX);
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO search_logs (query, user_id, results_count) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(entry.query)
        .bind(entry.user_id)
        .bind(results_count)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Latest searches, newest first
    pub async fn recent(&self, limit: i64, offset: i64) -> AppResult<Vec<SearchLog>> {
        let query = format!(
            "{} ORDER BY l.timestamp DESC, l.id DESC LIMIT $1 OFFSET $2",
            LOG_SELECT
        );
        let rows = sqlx::query_as::<_, SearchLog>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Latest searches made by one user
    pub async fn recent_for_user(&self, user_id: i32, limit: i64) -> AppResult<Vec<SearchLog>> {
        let query = format!(
            "{} WHERE l.user_id = $1 ORDER BY l.timestamp DESC, l.id DESC LIMIT $2",
            LOG_SELECT
        );
        let rows = sqlx::query_as::<_, SearchLog>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
