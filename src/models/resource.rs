//! Library resource (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    author::AuthorRef,
    enums::{Availability, ResourceKind},
    keyword::Keyword,
};

/// Resource columns joined with their resource type
#[derive(Debug, Clone, FromRow)]
pub struct ResourceRow {
    pub id: i32,
    pub title: String,
    pub resource_type_id: i32,
    pub resource_type_name: ResourceKind,
    pub resource_type_icon: String,
    pub description: String,
    #[sqlx(rename = "abstract")]
    pub abstract_: String,
    pub publication_year: i32,
    pub publisher: String,
    pub isbn: String,
    pub doi: String,
    pub call_number: String,
    pub location: String,
    pub availability: Availability,
    pub url: String,
    pub pages: Option<i32>,
    pub language: String,
    pub date_added: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub view_count: i32,
    pub download_count: i32,
}

/// Resource type as embedded in resource payloads
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResourceTypeRef {
    pub id: i32,
    pub name: ResourceKind,
    pub label: String,
    pub icon: String,
}

/// Subject as embedded in resource payloads
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SubjectRef {
    pub id: i32,
    pub name: String,
}

/// Short resource representation for result lists
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResourceSummary {
    pub id: i32,
    pub title: String,
    pub resource_type: ResourceTypeRef,
    pub description: String,
    pub publication_year: i32,
    pub publisher: String,
    pub availability: Availability,
    pub is_available: bool,
    pub view_count: i32,
    pub date_added: DateTime<Utc>,
    pub author_names: String,
    pub authors: Vec<AuthorRef>,
    pub subjects: Vec<SubjectRef>,
}

/// Full resource model (detail view and curation responses)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Resource {
    pub id: i32,
    pub title: String,
    pub resource_type: ResourceTypeRef,
    pub description: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    pub publication_year: i32,
    pub publisher: String,
    pub isbn: String,
    pub doi: String,
    pub call_number: String,
    pub location: String,
    pub availability: Availability,
    pub is_available: bool,
    pub url: String,
    pub pages: Option<i32>,
    pub language: String,
    pub date_added: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub view_count: i32,
    pub download_count: i32,
    pub author_names: String,
    pub authors: Vec<AuthorRef>,
    pub subjects: Vec<SubjectRef>,
    pub keywords: Vec<Keyword>,
}

/// Comma-separated author full names, in the order given
pub fn author_names(authors: &[AuthorRef]) -> String {
    authors
        .iter()
        .map(AuthorRef::full_name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ResourceRow {
    fn resource_type(&self) -> ResourceTypeRef {
        ResourceTypeRef {
            id: self.resource_type_id,
            name: self.resource_type_name,
            label: self.resource_type_name.label().to_string(),
            icon: self.resource_type_icon.clone(),
        }
    }

    pub fn into_summary(self, authors: Vec<AuthorRef>, subjects: Vec<SubjectRef>) -> ResourceSummary {
        ResourceSummary {
            resource_type: self.resource_type(),
            id: self.id,
            title: self.title,
            description: self.description,
            publication_year: self.publication_year,
            publisher: self.publisher,
            availability: self.availability,
            is_available: self.availability.is_available(),
            view_count: self.view_count,
            date_added: self.date_added,
            author_names: author_names(&authors),
            authors,
            subjects,
        }
    }

    pub fn into_resource(
        self,
        authors: Vec<AuthorRef>,
        subjects: Vec<SubjectRef>,
        keywords: Vec<Keyword>,
    ) -> Resource {
        Resource {
            resource_type: self.resource_type(),
            id: self.id,
            title: self.title,
            description: self.description,
            abstract_: self.abstract_,
            publication_year: self.publication_year,
            publisher: self.publisher,
            isbn: self.isbn,
            doi: self.doi,
            call_number: self.call_number,
            location: self.location,
            availability: self.availability,
            is_available: self.availability.is_available(),
            url: self.url,
            pages: self.pages,
            language: self.language,
            date_added: self.date_added,
            date_updated: self.date_updated,
            view_count: self.view_count,
            download_count: self.download_count,
            author_names: author_names(&authors),
            authors,
            subjects,
            keywords,
        }
    }
}

fn default_language() -> String {
    "English".to_string()
}

/// Create or replace resource request (staff only)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResourceInput {
    #[validate(length(min = 1, max = 500, message = "Title must be 1 to 500 characters"))]
    pub title: String,
    pub resource_type_id: i32,
    #[validate(length(min = 1, message = "This field is required."))]
    pub description: String,
    #[serde(default, rename = "abstract")]
    pub abstract_: String,
    #[validate(range(min = 0, message = "Publication year must be positive"))]
    pub publication_year: i32,
    #[serde(default)]
    #[validate(length(max = 200, message = "Publisher must be at most 200 characters"))]
    pub publisher: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "ISBN must be at most 20 characters"))]
    pub isbn: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "DOI must be at most 100 characters"))]
    pub doi: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Call number must be at most 100 characters"))]
    pub call_number: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    #[validate(length(max = 200, message = "URL must be at most 200 characters"))]
    pub url: String,
    #[validate(range(min = 0, message = "Pages must be positive"))]
    pub pages: Option<i32>,
    #[serde(default = "default_language")]
    #[validate(length(min = 1, max = 50, message = "Language must be 1 to 50 characters"))]
    pub language: String,
    #[serde(default)]
    pub author_ids: Vec<i32>,
    #[serde(default)]
    pub subject_ids: Vec<i32>,
    #[serde(default)]
    pub keyword_ids: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(availability: Availability) -> ResourceRow {
        ResourceRow {
            id: 1,
            title: "Deep Learning".into(),
            resource_type_id: 1,
            resource_type_name: ResourceKind::Book,
            resource_type_icon: "fas fa-book".into(),
            description: "Neural networks".into(),
            abstract_: String::new(),
            publication_year: 2016,
            publisher: "MIT Press".into(),
            isbn: String::new(),
            doi: String::new(),
            call_number: String::new(),
            location: String::new(),
            availability,
            url: String::new(),
            pages: Some(775),
            language: "English".into(),
            date_added: Utc::now(),
            date_updated: Utc::now(),
            view_count: 3,
            download_count: 0,
        }
    }

    fn authors() -> Vec<AuthorRef> {
        vec![
            AuthorRef {
                id: 1,
                first_name: "Ian".into(),
                last_name: "Goodfellow".into(),
            },
            AuthorRef {
                id: 2,
                first_name: "Yoshua".into(),
                last_name: "Bengio".into(),
            },
        ]
    }

    #[test]
    fn test_summary_derives_display_fields() {
        let summary = row(Availability::Digital).into_summary(authors(), vec![]);
        assert_eq!(summary.author_names, "Ian Goodfellow, Yoshua Bengio");
        assert!(summary.is_available);
        assert_eq!(summary.resource_type.label, "Book");
    }

    #[test]
    fn test_checked_out_is_not_available() {
        let resource = row(Availability::CheckedOut).into_resource(vec![], vec![], vec![]);
        assert!(!resource.is_available);
        assert_eq!(resource.author_names, "");
    }

    #[test]
    fn test_input_defaults() {
        let input: ResourceInput = serde_json::from_value(serde_json::json!({
            "title": "Thesis",
            "resource_type_id": 3,
            "description": "About things",
            "publication_year": 2021
        }))
        .unwrap();
        assert_eq!(input.language, "English");
        assert_eq!(input.availability, Availability::Available);
        assert!(input.author_ids.is_empty());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_input_validation() {
        let input: ResourceInput = serde_json::from_value(serde_json::json!({
            "title": "",
            "resource_type_id": 3,
            "description": "",
            "publication_year": -4
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("description"));
        assert!(fields.contains_key("publication_year"));
    }
}
