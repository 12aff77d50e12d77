//! User favorite model

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::resource::ResourceSummary;

/// Outcome of a favorite toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn favorited(&self) -> bool {
        matches!(self, ToggleOutcome::Added)
    }

    pub fn message(&self) -> &'static str {
        match self {
            ToggleOutcome::Added => "Added to favorites",
            ToggleOutcome::Removed => "Removed from favorites",
        }
    }
}

/// JSON body returned by the toggle endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToggleFavoriteResponse {
    pub favorited: bool,
    pub message: String,
    pub success: bool,
}

impl From<ToggleOutcome> for ToggleFavoriteResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            favorited: outcome.favorited(),
            message: outcome.message().to_string(),
            success: true,
        }
    }
}

/// Favorite entry with the resource it points to
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Favorite {
    pub id: i32,
    pub date_added: DateTime<Utc>,
    pub resource: ResourceSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_response() {
        let added = ToggleFavoriteResponse::from(ToggleOutcome::Added);
        assert!(added.favorited);
        assert!(added.success);
        assert_eq!(added.message, "Added to favorites");

        let removed = ToggleFavoriteResponse::from(ToggleOutcome::Removed);
        assert!(!removed.favorited);
        assert_eq!(removed.message, "Removed from favorites");
    }
}
