//! Favorites endpoints

use axum::{
    extract::{OriginalUri, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{
        favorite::{Favorite, ToggleFavoriteResponse},
        search::parse_page,
    },
    AppState,
};

use super::{AuthenticatedUser, MaybeUser, Pagination};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number (default: 1)
    pub page: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct FavoritesResponse {
    pub items: Vec<Favorite>,
    pub pagination: Pagination,
    pub total_favorites: i64,
}

/// Add or remove a resource from the caller's favorites
#[utoipa::path(
    post,
    path = "/favorites/{resource_id}",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(
        ("resource_id" = i32, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "New favorite state", body = ToggleFavoriteResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Resource not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    MaybeUser(claims): MaybeUser,
    OriginalUri(uri): OriginalUri,
    Path(resource_id): Path<i32>,
) -> AppResult<Json<ToggleFavoriteResponse>> {
    let claims = claims.ok_or_else(|| AppError::LoginRequired {
        message: "Please login to save favorites".to_string(),
        next: uri.path().to_string(),
    })?;

    let outcome = state
        .services
        .favorites
        .toggle(claims.user_id, resource_id)
        .await?;
    Ok(Json(outcome.into()))
}

/// The caller's favorites, newest first
#[utoipa::path(
    get,
    path = "/favorites",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Favorites", body = FavoritesResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<FavoritesResponse>> {
    let (items, page) = state
        .services
        .favorites
        .list(claims.user_id, parse_page(query.page.as_deref()))
        .await?;

    Ok(Json(FavoritesResponse {
        items,
        total_favorites: page.total,
        pagination: page.into(),
    }))
}
