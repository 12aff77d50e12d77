//! Search history model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// One logged free-text search
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SearchLog {
    pub id: i32,
    pub query: String,
    pub user_id: Option<i32>,
    /// Username, when the search was made by a signed-in user
    pub username: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub results_count: i32,
}

/// Entry to record
#[derive(Debug, Clone)]
pub struct NewSearchLog<'a> {
    pub query: &'a str,
    pub user_id: Option<i32>,
    pub results_count: i64,
}
