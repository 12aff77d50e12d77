//! Catalog search and curation service

use crate::{
    config::SearchConfig,
    error::{AppError, AppResult, FieldErrors},
    models::{
        author::{Author, AuthorWithCount, CreateAuthor},
        enums::Availability,
        keyword::{CreateKeyword, Keyword, KeywordWithCount},
        resource::{Resource, ResourceInput, ResourceSummary, SubjectRef},
        resource_type::{ResourceType, ResourceTypeChoice, UpdateResourceType},
        search::{PageInfo, ResourceFilter, SearchParams},
        search_log::{NewSearchLog, SearchLog},
        subject::{CreateSubject, Subject, SubjectWithCount},
    },
    repository::Repository,
};

const UNKNOWN_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Catalog-wide counters shown next to search results
#[derive(Debug, Clone)]
pub struct CatalogSummary {
    pub total_resources: i64,
    pub available_resources: i64,
    pub digital_resources: i64,
    pub popular_keywords: Vec<Keyword>,
}

/// Everything a search request produces
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub filter: ResourceFilter,
    pub resources: Vec<ResourceSummary>,
    pub page: PageInfo,
    pub summary: CatalogSummary,
    /// Only for signed-in users
    pub favorite_ids: Option<Vec<i32>>,
}

/// Resource detail with its neighbourhood
#[derive(Debug, Clone)]
pub struct ResourceDetail {
    pub resource: Resource,
    pub related_resources: Vec<ResourceSummary>,
    /// Only for signed-in users
    pub is_favorited: Option<bool>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: SearchConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: SearchConfig) -> Self {
        Self { repository, config }
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// Run the faceted search. A search with free text is written to the
    /// search history together with the number of matching resources.
    pub async fn search(&self, params: &SearchParams, viewer: Option<i32>) -> AppResult<SearchResults> {
        let filter = params.to_filter().map_err(AppError::InvalidForm)?;
        self.check_facet_choices(&filter).await?;

        let (resources, page) = self
            .repository
            .resources
            .search(&filter, params.requested_page(), self.config.page_size)
            .await?;

        if let Some(ref text) = filter.text {
            self.log_search(text, viewer, page.total).await;
        }

        tracing::debug!(
            facets = filter.active_facets(),
            sort = filter.sort.as_str(),
            total = page.total,
            page = page.page,
            "Catalog search"
        );

        let summary = self.summary().await?;
        let favorite_ids = match viewer {
            Some(user_id) => Some(self.repository.favorites.resource_ids(user_id).await?),
            None => None,
        };

        Ok(SearchResults {
            filter,
            resources,
            page,
            summary,
            favorite_ids,
        })
    }

    /// Facet ids must name existing rows, the same way a select box only
    /// accepts one of its options
    async fn check_facet_choices(&self, filter: &ResourceFilter) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        if let Some(id) = filter.resource_type_id {
            if !self.repository.resource_types.exists(id).await? {
                errors.add("resource_type", UNKNOWN_CHOICE);
            }
        }
        if let Some(id) = filter.subject_id {
            if !self.repository.subjects.exists(id).await? {
                errors.add("subject", UNKNOWN_CHOICE);
            }
        }
        errors.into_result()
    }

    async fn log_search(&self, query: &str, user_id: Option<i32>, results_count: i64) {
        let entry = NewSearchLog {
            query,
            user_id,
            results_count,
        };
        if let Err(e) = self.repository.search_logs.create(&entry).await {
            tracing::warn!("Failed to record search history for {:?}: {}", query, e);
        }
    }

    /// Catalog-wide counters
    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        let resources = &self.repository.resources;
        Ok(CatalogSummary {
            total_resources: resources.count_all().await?,
            available_resources: resources.count_by_availability(Availability::Available).await?,
            digital_resources: resources.count_by_availability(Availability::Digital).await?,
            popular_keywords: self
                .repository
                .keywords
                .top(self.config.popular_keywords_limit)
                .await?,
        })
    }

    /// Resource types offered by the search form
    pub async fn resource_type_choices(&self) -> AppResult<Vec<ResourceTypeChoice>> {
        let types = self.repository.resource_types.list().await?;
        Ok(types.into_iter().map(ResourceTypeChoice::from).collect())
    }

    /// Subjects offered by the search form
    pub async fn subject_choices(&self) -> AppResult<Vec<SubjectRef>> {
        self.repository.subjects.list_choices().await
    }

    // =========================================================================
    // DETAIL
    // =========================================================================

    /// Load a resource for display, counting the view
    pub async fn view_resource(&self, id: i32, viewer: Option<i32>) -> AppResult<ResourceDetail> {
        if !self.repository.resources.increment_view_count(id).await? {
            return Err(AppError::NotFound(format!("Resource with id {} not found", id)));
        }

        let resource = self.repository.resources.get_by_id(id).await?;
        let related_resources = self
            .repository
            .resources
            .related(id, self.config.related_limit)
            .await?;
        let is_favorited = match viewer {
            Some(user_id) => Some(self.repository.favorites.exists(user_id, id).await?),
            None => None,
        };

        Ok(ResourceDetail {
            resource,
            related_resources,
            is_favorited,
        })
    }

    // =========================================================================
    // CURATION
    // =========================================================================

    async fn check_resource_input(&self, input: &ResourceInput) -> AppResult<()> {
        let mut errors = match validator::Validate::validate(input) {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        if !self.repository.resource_types.exists(input.resource_type_id).await? {
            errors.add("resource_type_id", UNKNOWN_CHOICE);
        }

        let missing = [
            ("author_ids", self.repository.authors.missing_ids(&input.author_ids).await?),
            ("subject_ids", self.repository.subjects.missing_ids(&input.subject_ids).await?),
            ("keyword_ids", self.repository.keywords.missing_ids(&input.keyword_ids).await?),
        ];
        for (field, ids) in missing {
            for id in ids {
                errors.add(
                    field,
                    format!("Select a valid choice. {} is not one of the available choices.", id),
                );
            }
        }

        errors.into_result()
    }

    pub async fn create_resource(&self, input: ResourceInput) -> AppResult<Resource> {
        self.check_resource_input(&input).await?;
        let created = self.repository.resources.create(&input).await?;
        tracing::info!("Catalog: created resource id={} {:?}", created.id, created.title);
        Ok(created)
    }

    pub async fn update_resource(&self, id: i32, input: ResourceInput) -> AppResult<Resource> {
        if !self.repository.resources.exists(id).await? {
            return Err(AppError::NotFound(format!("Resource with id {} not found", id)));
        }
        self.check_resource_input(&input).await?;
        let updated = self.repository.resources.update(id, &input).await?;
        tracing::info!("Catalog: updated resource id={}", id);
        Ok(updated)
    }

    pub async fn delete_resource(&self, id: i32) -> AppResult<()> {
        self.repository.resources.delete(id).await?;
        tracing::info!("Catalog: deleted resource id={}", id);
        Ok(())
    }

    pub async fn list_subjects(&self, search: Option<&str>) -> AppResult<Vec<SubjectWithCount>> {
        self.repository.subjects.list_with_counts(search).await
    }

    pub async fn create_subject(&self, data: CreateSubject) -> AppResult<Subject> {
        validator::Validate::validate(&data)?;
        self.repository.subjects.create(&data).await
    }

    pub async fn delete_subject(&self, id: i32) -> AppResult<()> {
        self.repository.subjects.delete(id).await
    }

    pub async fn list_authors(&self, search: Option<&str>) -> AppResult<Vec<AuthorWithCount>> {
        self.repository.authors.list_with_counts(search).await
    }

    pub async fn create_author(&self, data: CreateAuthor) -> AppResult<Author> {
        validator::Validate::validate(&data)?;
        self.repository.authors.create(&data).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    pub async fn list_keywords(&self, search: Option<&str>) -> AppResult<Vec<KeywordWithCount>> {
        self.repository.keywords.list_with_counts(search).await
    }

    pub async fn create_keyword(&self, data: CreateKeyword) -> AppResult<Keyword> {
        validator::Validate::validate(&data)?;
        self.repository.keywords.create(&data).await
    }

    pub async fn delete_keyword(&self, id: i32) -> AppResult<()> {
        self.repository.keywords.delete(id).await
    }

    pub async fn list_resource_types(&self) -> AppResult<Vec<ResourceType>> {
        self.repository.resource_types.list().await
    }

    pub async fn update_resource_type_icon(&self, id: i32, data: UpdateResourceType) -> AppResult<ResourceType> {
        validator::Validate::validate(&data)?;
        self.repository.resource_types.update_icon(id, &data.icon).await
    }

    /// Search history, newest first
    pub async fn search_logs(&self, requested_page: i64, per_page: i64) -> AppResult<(Vec<SearchLog>, PageInfo)> {
        let total = self.repository.search_logs.count().await?;
        let page = PageInfo::resolve(requested_page, per_page, total);
        let logs = self
            .repository
            .search_logs
            .recent(page.per_page, page.offset())
            .await?;
        Ok((logs, page))
    }
}
