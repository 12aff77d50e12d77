//! Statistics endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{keyword::Keyword, resource::ResourceSummary, search_log::SearchLog},
    AppState,
};

#[derive(Serialize, ToSchema)]
pub struct StatisticsResponse {
    pub total_resources: i64,
    pub available_resources: i64,
    pub digital_resources: i64,
    pub total_authors: i64,
    pub total_subjects: i64,
    pub most_viewed: Vec<ResourceSummary>,
    pub recent_searches: Vec<SearchLog>,
    pub top_keywords: Vec<Keyword>,
}

/// Catalog statistics
#[utoipa::path(
    get,
    path = "/statistics",
    tag = "stats",
    responses(
        (status = 200, description = "Catalog statistics", body = StatisticsResponse)
    )
)]
pub async fn get_statistics(State(state): State<AppState>) -> AppResult<Json<StatisticsResponse>> {
    let stats = state.services.stats.statistics().await?;

    Ok(Json(StatisticsResponse {
        total_resources: stats.total_resources,
        available_resources: stats.available_resources,
        digital_resources: stats.digital_resources,
        total_authors: stats.total_authors,
        total_subjects: stats.total_subjects,
        most_viewed: stats.most_viewed,
        recent_searches: stats.recent_searches,
        top_keywords: stats.top_keywords,
    }))
}
