//! Shared catalog enums stored as text columns

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgTypeInfo, Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Stores a `as_str` / `FromStr` enum in a VARCHAR/TEXT column
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Circulation status of a catalog resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    CheckedOut,
    Digital,
    Restricted,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::CheckedOut => "checked_out",
            Availability::Digital => "digital",
            Availability::Restricted => "restricted",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Availability::Available => "Available",
            Availability::CheckedOut => "Checked Out",
            Availability::Digital => "Digital Access",
            Availability::Restricted => "Restricted Access",
        }
    }

    /// Whether a reader can get at the resource right now
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available | Availability::Digital)
    }
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Available
    }
}

impl std::str::FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Availability::Available),
            "checked_out" => Ok(Availability::CheckedOut),
            "digital" => Ok(Availability::Digital),
            "restricted" => Ok(Availability::Restricted),
            _ => Err(format!("Invalid availability: {}", s)),
        }
    }
}

text_column!(Availability);

// ---------------------------------------------------------------------------
// ResourceKind
// ---------------------------------------------------------------------------

/// Fixed set of resource type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Book,
    Journal,
    Thesis,
    Conference,
    Digital,
    Multimedia,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Book,
        ResourceKind::Journal,
        ResourceKind::Thesis,
        ResourceKind::Conference,
        ResourceKind::Digital,
        ResourceKind::Multimedia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Book => "book",
            ResourceKind::Journal => "journal",
            ResourceKind::Thesis => "thesis",
            ResourceKind::Conference => "conference",
            ResourceKind::Digital => "digital",
            ResourceKind::Multimedia => "multimedia",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Book => "Book",
            ResourceKind::Journal => "Journal Article",
            ResourceKind::Thesis => "Thesis/Dissertation",
            ResourceKind::Conference => "Conference Paper",
            ResourceKind::Digital => "Digital Resource",
            ResourceKind::Multimedia => "Multimedia",
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Invalid resource type: {}", s))
    }
}

text_column!(ResourceKind);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_is_available() {
        assert!(Availability::Available.is_available());
        assert!(Availability::Digital.is_available());
        assert!(!Availability::CheckedOut.is_available());
        assert!(!Availability::Restricted.is_available());
    }

    #[test]
    fn test_availability_parse() {
        assert_eq!("checked_out".parse::<Availability>(), Ok(Availability::CheckedOut));
        assert!("Checked Out".parse::<Availability>().is_err());
    }

    #[test]
    fn test_resource_kind_labels() {
        assert_eq!("thesis".parse::<ResourceKind>(), Ok(ResourceKind::Thesis));
        assert_eq!(ResourceKind::Journal.label(), "Journal Article");
        assert!("novel".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_serde_names_match_columns() {
        assert_eq!(
            serde_json::to_string(&Availability::CheckedOut).unwrap(),
            "\"checked_out\""
        );
        assert_eq!(serde_json::to_string(&ResourceKind::Conference).unwrap(), "\"conference\"");
    }
}
