//! Keyword model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Indexing keyword attached to resources
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Keyword {
    pub id: i32,
    pub word: String,
    pub frequency: i32,
}

/// Keyword with the number of resources it tags
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct KeywordWithCount {
    pub id: i32,
    pub word: String,
    pub frequency: i32,
    pub resource_count: i64,
}

/// Create keyword request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateKeyword {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 100, message = "Word must be 1 to 100 characters"))]
    pub word: String,
    #[validate(range(min = 0, message = "Frequency cannot be negative"))]
    pub frequency: Option<i32>,
}

/// Autocomplete query
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AutocompleteQuery {
    /// Partial keyword typed by the user
    pub term: Option<String>,
}

/// One autocomplete suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct KeywordSuggestion {
    pub value: String,
    pub label: String,
}

impl From<Keyword> for KeywordSuggestion {
    fn from(kw: Keyword) -> Self {
        Self {
            label: format!("{} ({})", kw.word, kw.frequency),
            value: kw.word,
        }
    }
}
