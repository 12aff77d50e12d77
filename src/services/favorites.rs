//! Favorites service

use crate::{
    config::SearchConfig,
    error::{AppError, AppResult},
    models::{
        favorite::{Favorite, ToggleOutcome},
        search::PageInfo,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct FavoritesService {
    repository: Repository,
    config: SearchConfig,
}

impl FavoritesService {
    pub fn new(repository: Repository, config: SearchConfig) -> Self {
        Self { repository, config }
    }

    /// Flip the favorite flag of `resource_id` for `user_id`
    pub async fn toggle(&self, user_id: i32, resource_id: i32) -> AppResult<ToggleOutcome> {
        if !self.repository.resources.exists(resource_id).await? {
            return Err(AppError::NotFound(format!("Resource with id {} not found", resource_id)));
        }

        let outcome = self.repository.favorites.toggle(user_id, resource_id).await?;
        tracing::info!(
            user_id,
            resource_id,
            favorited = outcome.favorited(),
            "Favorite toggled"
        );
        Ok(outcome)
    }

    /// One page of the user's favorites with resource summaries
    pub async fn list(&self, user_id: i32, requested_page: i64) -> AppResult<(Vec<Favorite>, PageInfo)> {
        let total = self.repository.favorites.count_for_user(user_id).await?;
        let page = PageInfo::resolve(requested_page, self.config.favorites_page_size, total);
        let rows = self
            .repository
            .favorites
            .list_for_user(user_id, page.per_page, page.offset())
            .await?;

        let favorites = self.attach_resources(rows).await?;
        Ok((favorites, page))
    }

    /// Every favorite of the user, newest first
    pub async fn all(&self, user_id: i32) -> AppResult<Vec<Favorite>> {
        let total = self.repository.favorites.count_for_user(user_id).await?;
        let rows = self.repository.favorites.list_for_user(user_id, total.max(1), 0).await?;
        self.attach_resources(rows).await
    }

    async fn attach_resources(
        &self,
        rows: Vec<crate::repository::favorites::FavoriteRow>,
    ) -> AppResult<Vec<Favorite>> {
        let ids: Vec<i32> = rows.iter().map(|r| r.resource_id).collect();
        let summaries = self.repository.resources.summaries_by_ids(&ids).await?;

        // summaries come back in `ids` order; a resource deleted in between is skipped
        let mut summaries = summaries.into_iter().peekable();
        let mut favorites = Vec::with_capacity(rows.len());
        for row in rows {
            if summaries.peek().map(|s| s.id) == Some(row.resource_id) {
                if let Some(resource) = summaries.next() {
                    favorites.push(Favorite {
                        id: row.id,
                        date_added: row.date_added,
                        resource,
                    });
                }
            }
        }
        Ok(favorites)
    }
}
