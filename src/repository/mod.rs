//! Repository layer for database operations

pub mod authors;
pub mod favorites;
pub mod keywords;
pub mod resource_types;
pub mod resources;
pub mod search_logs;
pub mod subjects;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub resources: resources::ResourcesRepository,
    pub resource_types: resource_types::ResourceTypesRepository,
    pub subjects: subjects::SubjectsRepository,
    pub authors: authors::AuthorsRepository,
    pub keywords: keywords::KeywordsRepository,
    pub search_logs: search_logs::SearchLogsRepository,
    pub favorites: favorites::FavoritesRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            resources: resources::ResourcesRepository::new(pool.clone()),
            resource_types: resource_types::ResourceTypesRepository::new(pool.clone()),
            subjects: subjects::SubjectsRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            keywords: keywords::KeywordsRepository::new(pool.clone()),
            search_logs: search_logs::SearchLogsRepository::new(pool.clone()),
            favorites: favorites::FavoritesRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, used by the readiness check
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
