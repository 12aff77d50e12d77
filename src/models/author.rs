//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Author as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: String,
}

impl Author {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// "First Last", as shown in listings
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name)
}

/// Author attached to a resource, as returned with search results
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthorRef {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl AuthorRef {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// Author with the number of resources credited to them
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AuthorWithCount {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub resource_count: i64,
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: String,
}
