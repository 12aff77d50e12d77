//! Catalog search and resource detail endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        keyword::Keyword,
        resource::{Resource, ResourceSummary, SubjectRef},
        resource_type::ResourceTypeChoice,
        search::{ResourceFilter, SearchParams, SortBy, YearRange, AVAILABILITY_CHOICES},
    },
    AppState,
};

use super::{MaybeUser, Pagination};

/// One option of a select-style facet
#[derive(Debug, Serialize, ToSchema)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Static facet options offered by the search form
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchChoices {
    pub year_ranges: Vec<Choice>,
    pub availability: Vec<Choice>,
    pub sort_by: Vec<Choice>,
}

impl SearchChoices {
    pub fn build() -> Self {
        Self {
            year_ranges: YearRange::ALL
                .iter()
                .map(|y| Choice {
                    value: y.as_str().to_string(),
                    label: y.label().to_string(),
                })
                .collect(),
            availability: AVAILABILITY_CHOICES
                .iter()
                .map(|a| Choice {
                    value: a.as_str().to_string(),
                    label: a.label().to_string(),
                })
                .collect(),
            sort_by: SortBy::ALL
                .iter()
                .map(|s| Choice {
                    value: s.as_str().to_string(),
                    label: s.label().to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub resources: Vec<ResourceSummary>,
    pub pagination: Pagination,
    /// Facets the results were filtered by
    pub filters: ResourceFilter,
    /// Total matching resources across all pages
    pub results_count: i64,
    pub total_resources: i64,
    pub available_resources: i64,
    pub digital_resources: i64,
    pub popular_keywords: Vec<Keyword>,
    pub choices: SearchChoices,
    /// Resource ids the signed-in user has favorited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_ids: Option<Vec<i32>>,
}

#[derive(Serialize, ToSchema)]
pub struct ResourceDetailResponse {
    pub resource: Resource,
    pub related_resources: Vec<ResourceSummary>,
    /// Present for signed-in users only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorited: Option<bool>,
}

/// Faceted catalog search
#[utoipa::path(
    get,
    path = "/resources",
    tag = "resources",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching resources", body = SearchResponse),
        (status = 400, description = "Invalid search form", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_resources(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let results = state
        .services
        .catalog
        .search(&params, viewer.user_id())
        .await?;

    Ok(Json(SearchResponse {
        results_count: results.page.total,
        pagination: results.page.into(),
        resources: results.resources,
        filters: results.filter,
        total_resources: results.summary.total_resources,
        available_resources: results.summary.available_resources,
        digital_resources: results.summary.digital_resources,
        popular_keywords: results.summary.popular_keywords,
        choices: SearchChoices::build(),
        favorite_ids: results.favorite_ids,
    }))
}

/// Resource detail; counts one view
#[utoipa::path(
    get,
    path = "/resources/{id}",
    tag = "resources",
    params(
        ("id" = i32, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Resource details", body = ResourceDetailResponse),
        (status = 404, description = "Resource not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_resource(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ResourceDetailResponse>> {
    let detail = state
        .services
        .catalog
        .view_resource(id, viewer.user_id())
        .await?;

    Ok(Json(ResourceDetailResponse {
        resource: detail.resource,
        related_resources: detail.related_resources,
        is_favorited: detail.is_favorited,
    }))
}

/// Resource types for the search form
#[utoipa::path(
    get,
    path = "/resource-types",
    tag = "resources",
    responses(
        (status = 200, description = "Resource types", body = Vec<ResourceTypeChoice>)
    )
)]
pub async fn list_resource_types(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ResourceTypeChoice>>> {
    Ok(Json(state.services.catalog.resource_type_choices().await?))
}

/// Subjects for the search form
#[utoipa::path(
    get,
    path = "/subjects",
    tag = "resources",
    responses(
        (status = 200, description = "Subjects ordered by name", body = Vec<SubjectRef>)
    )
)]
pub async fn list_subjects(State(state): State<AppState>) -> AppResult<Json<Vec<SubjectRef>>> {
    Ok(Json(state.services.catalog.subject_choices().await?))
}
