//! Keywords repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::{
        keyword::{CreateKeyword, Keyword, KeywordWithCount},
        search::contains_pattern,
    },
};

#[derive(Clone)]
pub struct KeywordsRepository {
    pool: Pool<Postgres>,
}

impl KeywordsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Keywords containing `term`, most frequent first
    pub async fn matching(&self, term: &str, limit: i64) -> AppResult<Vec<Keyword>> {
        let rows = sqlx::query_as::<_, Keyword>(
            r#"
            SELECT id, word, frequency
            FROM keywords
            WHERE word ILIKE $1
            ORDER BY frequency DESC, word
            LIMIT $2
            "#,
        )
        .bind(contains_pattern(term))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Most frequent keywords
    pub async fn top(&self, limit: i64) -> AppResult<Vec<Keyword>> {
        let rows = sqlx::query_as::<_, Keyword>(
            "SELECT id, word, frequency FROM keywords ORDER BY frequency DESC, word LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_with_counts(&self, search: Option<&str>) -> AppResult<Vec<KeywordWithCount>> {
        let rows = sqlx::query_as::<_, KeywordWithCount>(
            r#"
            SELECT k.id, k.word, k.frequency,
                   (SELECT COUNT(*) FROM resource_keywords rk WHERE rk.keyword_id = k.id) AS resource_count
            FROM keywords k
            WHERE ($1::text IS NULL OR k.word ILIKE $1)
            ORDER BY k.frequency DESC, k.word
            "#,
        )
        .bind(search.map(contains_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Ids from `ids` that have no keyword row
    pub async fn missing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let missing: Vec<i32> = sqlx::query_scalar(
            "SELECT t.wanted FROM UNNEST($1::int[]) AS t(wanted) \
             WHERE NOT EXISTS (SELECT 1 FROM keywords k WHERE k.id = t.wanted) ORDER BY t.wanted",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(missing)
    }

    pub async fn create(&self, data: &CreateKeyword) -> AppResult<Keyword> {
        sqlx::query_as::<_, Keyword>(
            "INSERT INTO keywords (word, frequency) VALUES ($1, $2) RETURNING id, word, frequency",
        )
        .bind(data.word.trim())
        .bind(data.frequency.unwrap_or(1))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Keyword with this Word already exists."))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM keywords WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Keyword with id {} not found", id)));
        }
        Ok(())
    }
}
