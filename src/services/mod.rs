//! Business logic services

pub mod catalog;
pub mod favorites;
pub mod keywords;
pub mod stats;
pub mod users;

use crate::{
    config::{AuthConfig, SearchConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub favorites: favorites::FavoritesService,
    pub keywords: keywords::KeywordsService,
    pub stats: stats::StatsService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, search_config: SearchConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), search_config.clone()),
            favorites: favorites::FavoritesService::new(repository.clone(), search_config.clone()),
            keywords: keywords::KeywordsService::new(repository.clone(), search_config),
            stats: stats::StatsService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            repository,
        }
    }

    /// Database readiness check
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await
    }
}
