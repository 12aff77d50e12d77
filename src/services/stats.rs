//! Statistics service

use crate::{
    error::AppResult,
    models::{
        enums::Availability, keyword::Keyword, resource::ResourceSummary, search_log::SearchLog,
    },
    repository::Repository,
};

const MOST_VIEWED_LIMIT: i64 = 10;
const RECENT_SEARCHES_LIMIT: i64 = 10;
const TOP_KEYWORDS_LIMIT: i64 = 20;

/// Catalog statistics snapshot
#[derive(Debug, Clone)]
pub struct CatalogStats {
    pub total_resources: i64,
    pub available_resources: i64,
    pub digital_resources: i64,
    pub total_authors: i64,
    pub total_subjects: i64,
    pub most_viewed: Vec<ResourceSummary>,
    pub recent_searches: Vec<SearchLog>,
    pub top_keywords: Vec<Keyword>,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn statistics(&self) -> AppResult<CatalogStats> {
        let resources = &self.repository.resources;

        Ok(CatalogStats {
            total_resources: resources.count_all().await?,
            available_resources: resources.count_by_availability(Availability::Available).await?,
            digital_resources: resources.count_by_availability(Availability::Digital).await?,
            total_authors: self.repository.authors.count().await?,
            total_subjects: self.repository.subjects.count().await?,
            most_viewed: resources.most_viewed(MOST_VIEWED_LIMIT).await?,
            recent_searches: self.repository.search_logs.recent(RECENT_SEARCHES_LIMIT, 0).await?,
            top_keywords: self.repository.keywords.top(TOP_KEYWORDS_LIMIT).await?,
        })
    }
}
