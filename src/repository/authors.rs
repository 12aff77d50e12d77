//! Authors repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::{
        author::{Author, AuthorWithCount, CreateAuthor},
        search::contains_pattern,
    },
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Authors with their resource counts, searching first name, last name and email
    pub async fn list_with_counts(&self, search: Option<&str>) -> AppResult<Vec<AuthorWithCount>> {
        let rows = sqlx::query_as::<_, AuthorWithCount>(
            r#"
            SELECT a.id, a.first_name, a.last_name, a.email,
                   (SELECT COUNT(*) FROM resource_authors ra WHERE ra.author_id = a.id) AS resource_count
            FROM authors a
            WHERE ($1::text IS NULL
                   OR a.first_name ILIKE $1
                   OR a.last_name ILIKE $1
                   OR a.email ILIKE $1)
            ORDER BY a.last_name, a.first_name
            "#,
        )
        .bind(search.map(contains_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Ids from `ids` that have no author row
    pub async fn missing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let missing: Vec<i32> = sqlx::query_scalar(
            "SELECT t.wanted FROM UNNEST($1::int[]) AS t(wanted) \
             WHERE NOT EXISTS (SELECT 1 FROM authors a WHERE a.id = t.wanted) ORDER BY t.wanted",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(missing)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, last_name, email, bio)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, email, bio
            "#,
        )
        .bind(data.first_name.trim())
        .bind(data.last_name.trim())
        .bind(data.email.as_deref().unwrap_or(""))
        .bind(&data.bio)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Author with this First name and Last name already exists."))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }
}
