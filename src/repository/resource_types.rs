//! Resource types repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::resource_type::ResourceType,
};

#[derive(Clone)]
pub struct ResourceTypesRepository {
    pool: Pool<Postgres>,
}

impl ResourceTypesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<ResourceType>> {
        let rows = sqlx::query_as::<_, ResourceType>("SELECT id, name, icon FROM resource_types ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM resource_types WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn update_icon(&self, id: i32, icon: &str) -> AppResult<ResourceType> {
        sqlx::query_as::<_, ResourceType>(
            "UPDATE resource_types SET icon = $1 WHERE id = $2 RETURNING id, name, icon",
        )
        .bind(icon)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resource type with id {} not found", id)))
    }
}
