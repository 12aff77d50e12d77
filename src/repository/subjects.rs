//! Subjects repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::{
        resource::SubjectRef,
        search::contains_pattern,
        subject::{CreateSubject, Subject, SubjectWithCount},
    },
};

#[derive(Clone)]
pub struct SubjectsRepository {
    pool: Pool<Postgres>,
}

impl SubjectsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All subjects by name, as offered by the search form
    pub async fn list_choices(&self) -> AppResult<Vec<SubjectRef>> {
        let rows = sqlx::query_as::<_, SubjectRef>("SELECT id, name FROM subjects ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Subjects with their resource counts, optionally filtered by name
    pub async fn list_with_counts(&self, search: Option<&str>) -> AppResult<Vec<SubjectWithCount>> {
        let rows = sqlx::query_as::<_, SubjectWithCount>(
            r#"
            SELECT s.id, s.name, s.description,
                   (SELECT COUNT(*) FROM resource_subjects rs WHERE rs.subject_id = s.id) AS resource_count
            FROM subjects s
            WHERE ($1::text IS NULL OR s.name ILIKE $1)
            ORDER BY s.name
            "#,
        )
        .bind(search.map(contains_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Ids from `ids` that have no subject row
    pub async fn missing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let missing: Vec<i32> = sqlx::query_scalar(
            "SELECT t.wanted FROM UNNEST($1::int[]) AS t(wanted) \
             WHERE NOT EXISTS (SELECT 1 FROM subjects s WHERE s.id = t.wanted) ORDER BY t.wanted",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(missing)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn create(&self, data: &CreateSubject) -> AppResult<Subject> {
        sqlx::query_as::<_, Subject>(
            "INSERT INTO subjects (name, description) VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(data.name.trim())
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Subject with this name already exists."))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Subject with id {} not found", id)));
        }
        Ok(())
    }
}
