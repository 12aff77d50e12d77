//! Resource type model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::ResourceKind;

/// Resource type row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ResourceType {
    pub id: i32,
    pub name: ResourceKind,
    pub icon: String,
}

/// Resource type with its display label, as offered by the search form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResourceTypeChoice {
    pub id: i32,
    pub name: ResourceKind,
    pub label: String,
    pub icon: String,
}

impl From<ResourceType> for ResourceTypeChoice {
    fn from(rt: ResourceType) -> Self {
        Self {
            id: rt.id,
            label: rt.name.label().to_string(),
            name: rt.name,
            icon: rt.icon,
        }
    }
}

/// Update resource type request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateResourceType {
    #[validate(length(max = 50, message = "Icon must be at most 50 characters"))]
    pub icon: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_length_is_limited() {
        let ok = UpdateResourceType { icon: "é".repeat(50) };
        assert!(ok.validate().is_ok());

        let long = UpdateResourceType { icon: "x".repeat(51) };
        let errors = long.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("icon"));
    }
}
