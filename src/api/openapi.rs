//! OpenAPI documentation

use axum::{routing::get, Json, Router};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::api::{admin, auth, favorites, health, keywords, resources, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Catalog API",
        version = "1.0.0",
        description = "Library resource search, favorites and catalog curation REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::profile,
        // Resources
        resources::search_resources,
        resources::get_resource,
        resources::list_resource_types,
        resources::list_subjects,
        // Favorites
        favorites::toggle_favorite,
        favorites::list_favorites,
        // Keywords
        keywords::autocomplete,
        // Stats
        stats::get_statistics,
        // Admin
        admin::create_resource,
        admin::update_resource,
        admin::delete_resource,
        admin::list_subjects,
        admin::create_subject,
        admin::delete_subject,
        admin::list_authors,
        admin::create_author,
        admin::delete_author,
        admin::list_keywords,
        admin::create_keyword,
        admin::delete_keyword,
        admin::list_resource_types,
        admin::update_resource_type,
        admin::list_search_logs,
    ),
    components(
        schemas(
            // Auth
            auth::UserInfo,
            auth::LoginResponse,
            auth::MessageResponse,
            auth::ProfileResponse,
            crate::models::user::RegisterUser,
            crate::models::user::LoginRequest,
            crate::models::user::LoginType,
            // Resources
            resources::SearchResponse,
            resources::ResourceDetailResponse,
            resources::SearchChoices,
            resources::Choice,
            crate::models::resource::Resource,
            crate::models::resource::ResourceSummary,
            crate::models::resource::ResourceTypeRef,
            crate::models::resource::SubjectRef,
            crate::models::resource::ResourceInput,
            crate::models::resource_type::ResourceType,
            crate::models::resource_type::ResourceTypeChoice,
            crate::models::resource_type::UpdateResourceType,
            crate::models::enums::Availability,
            crate::models::enums::ResourceKind,
            crate::models::search::ResourceFilter,
            crate::models::search::YearRange,
            crate::models::search::SortBy,
            crate::models::search::PageInfo,
            crate::api::Pagination,
            // Taxonomy
            crate::models::subject::Subject,
            crate::models::subject::SubjectWithCount,
            crate::models::subject::CreateSubject,
            crate::models::author::Author,
            crate::models::author::AuthorRef,
            crate::models::author::AuthorWithCount,
            crate::models::author::CreateAuthor,
            crate::models::keyword::Keyword,
            crate::models::keyword::KeywordWithCount,
            crate::models::keyword::CreateKeyword,
            crate::models::keyword::KeywordSuggestion,
            // Favorites
            crate::models::favorite::Favorite,
            crate::models::favorite::ToggleFavoriteResponse,
            favorites::FavoritesResponse,
            // Stats
            stats::StatisticsResponse,
            crate::models::search_log::SearchLog,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and sessions"),
        (name = "resources", description = "Catalog search and resource detail"),
        (name = "favorites", description = "Saved resources"),
        (name = "keywords", description = "Keyword autocomplete"),
        (name = "stats", description = "Statistics"),
        (name = "admin", description = "Catalog curation (staff only)")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
