//! Staff-only catalog curation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorWithCount, CreateAuthor},
        keyword::{CreateKeyword, Keyword, KeywordWithCount},
        resource::{Resource, ResourceInput},
        resource_type::{ResourceType, UpdateResourceType},
        search::parse_page,
        search_log::SearchLog,
        subject::{CreateSubject, Subject, SubjectWithCount, TaxonomyQuery},
    },
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

const DEFAULT_LOGS_PER_PAGE: i64 = 50;
const MAX_LOGS_PER_PAGE: i64 = 200;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchLogQuery {
    /// Page number (default: 1)
    pub page: Option<String>,
    /// Entries per page (default: 50, max: 200)
    pub per_page: Option<i64>,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Create a resource
#[utoipa::path(
    post,
    path = "/admin/resources",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = ResourceInput,
    responses(
        (status = 201, description = "Resource created", body = Resource),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Staff only", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_resource(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<ResourceInput>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    claims.require_staff()?;

    let created = state.services.catalog.create_resource(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a resource and its relations
#[utoipa::path(
    put,
    path = "/admin/resources/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Resource ID")
    ),
    request_body = ResourceInput,
    responses(
        (status = 200, description = "Resource updated", body = Resource),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Resource not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_resource(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(input): Json<ResourceInput>,
) -> AppResult<Json<Resource>> {
    claims.require_staff()?;

    let updated = state.services.catalog.update_resource(id, input).await?;
    Ok(Json(updated))
}

/// Delete a resource
#[utoipa::path(
    delete,
    path = "/admin/resources/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Resource ID")
    ),
    responses(
        (status = 204, description = "Resource deleted"),
        (status = 404, description = "Resource not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_resource(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.catalog.delete_resource(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

/// Subjects with resource counts
#[utoipa::path(
    get,
    path = "/admin/subjects",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(TaxonomyQuery),
    responses(
        (status = 200, description = "Subjects", body = Vec<SubjectWithCount>)
    )
)]
pub async fn list_subjects(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<TaxonomyQuery>,
) -> AppResult<Json<Vec<SubjectWithCount>>> {
    claims.require_staff()?;
    Ok(Json(state.services.catalog.list_subjects(query.search.as_deref()).await?))
}

/// Create a subject
#[utoipa::path(
    post,
    path = "/admin/subjects",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateSubject,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 409, description = "Name already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_subject(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateSubject>,
) -> AppResult<(StatusCode, Json<Subject>)> {
    claims.require_staff()?;

    let created = state.services.catalog.create_subject(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a subject
#[utoipa::path(
    delete,
    path = "/admin/subjects/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Subject ID")
    ),
    responses(
        (status = 204, description = "Subject deleted"),
        (status = 404, description = "Subject not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_subject(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.catalog.delete_subject(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

/// Authors with resource counts
#[utoipa::path(
    get,
    path = "/admin/authors",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(TaxonomyQuery),
    responses(
        (status = 200, description = "Authors", body = Vec<AuthorWithCount>)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<TaxonomyQuery>,
) -> AppResult<Json<Vec<AuthorWithCount>>> {
    claims.require_staff()?;
    Ok(Json(state.services.catalog.list_authors(query.search.as_deref()).await?))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/admin/authors",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 409, description = "Author already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    claims.require_staff()?;

    let created = state.services.catalog.create_author(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/admin/authors/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

/// Keywords with resource counts
#[utoipa::path(
    get,
    path = "/admin/keywords",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(TaxonomyQuery),
    responses(
        (status = 200, description = "Keywords", body = Vec<KeywordWithCount>)
    )
)]
pub async fn list_keywords(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<TaxonomyQuery>,
) -> AppResult<Json<Vec<KeywordWithCount>>> {
    claims.require_staff()?;
    Ok(Json(state.services.catalog.list_keywords(query.search.as_deref()).await?))
}

/// Create a keyword
#[utoipa::path(
    post,
    path = "/admin/keywords",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateKeyword,
    responses(
        (status = 201, description = "Keyword created", body = Keyword),
        (status = 409, description = "Keyword already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_keyword(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateKeyword>,
) -> AppResult<(StatusCode, Json<Keyword>)> {
    claims.require_staff()?;

    let created = state.services.catalog.create_keyword(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a keyword
#[utoipa::path(
    delete,
    path = "/admin/keywords/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Keyword ID")
    ),
    responses(
        (status = 204, description = "Keyword deleted"),
        (status = 404, description = "Keyword not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_keyword(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.catalog.delete_keyword(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Resource types and search history
// ---------------------------------------------------------------------------

/// Resource types
#[utoipa::path(
    get,
    path = "/admin/resource-types",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Resource types", body = Vec<ResourceType>)
    )
)]
pub async fn list_resource_types(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ResourceType>>> {
    claims.require_staff()?;
    Ok(Json(state.services.catalog.list_resource_types().await?))
}

/// Change the icon of a resource type
#[utoipa::path(
    put,
    path = "/admin/resource-types/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Resource type ID")
    ),
    request_body = UpdateResourceType,
    responses(
        (status = 200, description = "Resource type updated", body = ResourceType),
        (status = 404, description = "Resource type not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_resource_type(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateResourceType>,
) -> AppResult<Json<ResourceType>> {
    claims.require_staff()?;

    let updated = state
        .services
        .catalog
        .update_resource_type_icon(id, data)
        .await?;
    Ok(Json(updated))
}

/// Search history, newest first
#[utoipa::path(
    get,
    path = "/admin/search-logs",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(SearchLogQuery),
    responses(
        (status = 200, description = "Logged searches", body = PaginatedResponse<SearchLog>)
    )
)]
pub async fn list_search_logs(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<SearchLogQuery>,
) -> AppResult<Json<PaginatedResponse<SearchLog>>> {
    claims.require_staff()?;

    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_LOGS_PER_PAGE)
        .clamp(1, MAX_LOGS_PER_PAGE);
    let (items, page) = state
        .services
        .catalog
        .search_logs(parse_page(query.page.as_deref()), per_page)
        .await?;

    Ok(Json(PaginatedResponse {
        items,
        pagination: page.into(),
    }))
}
