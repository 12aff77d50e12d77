//! Subject model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Subject heading used to classify resources
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subject {
    pub id: i32,
    pub name: String,
    pub description: String,
}

/// Subject with the number of resources filed under it
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SubjectWithCount {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub resource_count: i64,
}

/// Create subject request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubject {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Name search for taxonomy listings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct TaxonomyQuery {
    /// Case-insensitive substring of the name
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_subject_name_is_rejected() {
        let data: CreateSubject = serde_json::from_value(serde_json::json!({ "name": "    " })).unwrap();
        let errors = data.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let data: CreateSubject = serde_json::from_value(serde_json::json!({ "name": " History " })).unwrap();
        assert_eq!(data.name, "History");
        assert!(data.description.is_empty());
        assert!(data.validate().is_ok());
    }
}
