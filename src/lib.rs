//! Library catalog server
//!
//! REST JSON API for searching a library's resources (books, articles,
//! theses and more) by text and facets, keeping per-user favorites and
//! curating the catalog metadata.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire repository and services on top of a connection pool
    pub fn new(config: AppConfig, pool: sqlx::PgPool) -> Self {
        let repository = repository::Repository::new(pool);
        let services = services::Services::new(
            repository,
            config.auth.clone(),
            config.search.clone(),
        );
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
