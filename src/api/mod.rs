//! HTTP API: request extractors, routes and handlers

pub mod admin;
pub mod auth;
pub mod favorites;
pub mod health;
pub mod keywords;
pub mod openapi;
pub mod resources;
pub mod stats;

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::{search::PageInfo, user::UserClaims},
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Please login to continue".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))
}

/// Full request path, before any router nesting stripped its prefix
pub(crate) fn requested_path(parts: &Parts) -> String {
    parts
        .extensions
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = match bearer_token(parts) {
            Ok(token) => state.services.users.verify_token(token).await,
            Err(e) => Err(e),
        };
        claims
            .map(AuthenticatedUser)
            .map_err(|e| e.requiring_login(&requested_path(parts)))
    }
}

/// Extractor for pages that work anonymously but personalise for a signed-in user.
/// A missing, invalid or revoked token simply means anonymous.
pub struct MaybeUser(pub Option<UserClaims>);

impl MaybeUser {
    pub fn user_id(&self) -> Option<i32> {
        self.0.as_ref().map(|c| c.user_id)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if parts.headers.get(AUTHORIZATION).is_none() {
            return Ok(MaybeUser(None));
        }
        match AuthenticatedUser::from_request_parts(parts, state).await {
            Ok(AuthenticatedUser(claims)) => Ok(MaybeUser(Some(claims))),
            Err(AppError::Database(e)) => Err(AppError::Database(e)),
            Err(_) => Ok(MaybeUser(None)),
        }
    }
}

/// Pagination block attached to list responses
#[derive(Debug, Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<PageInfo> for Pagination {
    fn from(page: PageInfo) -> Self {
        Self {
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            num_pages: page.num_pages,
            has_next: page.has_next(),
            has_previous: page.has_previous(),
        }
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Build the `/api/v1` routes plus the OpenAPI document
pub fn router(state: AppState) -> Router {
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", get(auth::profile))
        // Catalog
        .route("/resources", get(resources::search_resources))
        .route("/resources/:id", get(resources::get_resource))
        .route("/resource-types", get(resources::list_resource_types))
        .route("/subjects", get(resources::list_subjects))
        .route("/keywords/autocomplete", get(keywords::autocomplete))
        .route("/statistics", get(stats::get_statistics))
        // Favorites
        .route("/favorites", get(favorites::list_favorites))
        .route("/favorites/:resource_id", post(favorites::toggle_favorite))
        // Curation
        .route("/admin/resources", post(admin::create_resource))
        .route("/admin/resources/:id", put(admin::update_resource))
        .route("/admin/resources/:id", delete(admin::delete_resource))
        .route("/admin/subjects", get(admin::list_subjects))
        .route("/admin/subjects", post(admin::create_subject))
        .route("/admin/subjects/:id", delete(admin::delete_subject))
        .route("/admin/authors", get(admin::list_authors))
        .route("/admin/authors", post(admin::create_author))
        .route("/admin/authors/:id", delete(admin::delete_author))
        .route("/admin/keywords", get(admin::list_keywords))
        .route("/admin/keywords", post(admin::create_keyword))
        .route("/admin/keywords/:id", delete(admin::delete_keyword))
        .route("/admin/resource-types", get(admin::list_resource_types))
        .route("/admin/resource-types/:id", put(admin::update_resource_type))
        .route("/admin/search-logs", get(admin::list_search_logs))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
}
