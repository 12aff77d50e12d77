//! Keyword autocomplete endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::keyword::{AutocompleteQuery, KeywordSuggestion},
    AppState,
};

/// Keywords starting with or containing the typed term
#[utoipa::path(
    get,
    path = "/keywords/autocomplete",
    tag = "keywords",
    params(AutocompleteQuery),
    responses(
        (status = 200, description = "Suggestions, most frequent first", body = Vec<KeywordSuggestion>)
    )
)]
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> AppResult<Json<Vec<KeywordSuggestion>>> {
    let suggestions = state
        .services
        .keywords
        .autocomplete(query.term.as_deref())
        .await?;
    Ok(Json(suggestions))
}
