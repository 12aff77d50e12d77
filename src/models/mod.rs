//! Data models for Libcat

pub mod author;
pub mod enums;
pub mod favorite;
pub mod keyword;
pub mod resource;
pub mod resource_type;
pub mod search;
pub mod search_log;
pub mod subject;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserialize a string with surrounding whitespace removed, so length
/// checks see the value that gets stored
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

// Re-export commonly used types
pub use author::{Author, AuthorRef};
pub use enums::{Availability, ResourceKind};
pub use favorite::{Favorite, ToggleOutcome};
pub use keyword::{Keyword, KeywordSuggestion};
pub use resource::{Resource, ResourceSummary};
pub use resource_type::ResourceType;
pub use search::{PageInfo, ResourceFilter, SearchParams, SortBy, YearRange};
pub use search_log::SearchLog;
pub use subject::Subject;
pub use user::{User, UserClaims};
