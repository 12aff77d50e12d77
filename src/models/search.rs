//! Catalog search form: raw query parameters, facet choices and the
//! validated filter handed to the repository.
//!
//! Every facet is optional and an empty value means "any". Unknown choice
//! values are reported as field errors instead of being silently ignored, so
//! the client can show them next to the offending control.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::enums::Availability;
use crate::error::FieldErrors;

/// Maximum accepted length of the free-text query
pub const MAX_QUERY_CHARS: usize = 500;

const INVALID_CHOICE: &str = "Select a valid choice.";

// ---------------------------------------------------------------------------
// Year range
// ---------------------------------------------------------------------------

/// Publication year buckets offered by the search form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum YearRange {
    #[serde(rename = "2020-2024")]
    From2020To2024,
    #[serde(rename = "2015-2019")]
    From2015To2019,
    #[serde(rename = "2010-2014")]
    From2010To2014,
    #[serde(rename = "2000-2009")]
    From2000To2009,
    #[serde(rename = "before-2000")]
    Before2000,
}

/// Year predicate a bucket translates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearBounds {
    /// Inclusive on both ends
    Between(i32, i32),
    /// Strictly earlier than the given year
    Before(i32),
}

impl YearRange {
    pub const ALL: [YearRange; 5] = [
        YearRange::From2020To2024,
        YearRange::From2015To2019,
        YearRange::From2010To2014,
        YearRange::From2000To2009,
        YearRange::Before2000,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            YearRange::From2020To2024 => "2020-2024",
            YearRange::From2015To2019 => "2015-2019",
            YearRange::From2010To2014 => "2010-2014",
            YearRange::From2000To2009 => "2000-2009",
            YearRange::Before2000 => "before-2000",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            YearRange::Before2000 => "Before 2000",
            other => other.as_str(),
        }
    }

    pub fn bounds(&self) -> YearBounds {
        match self {
            YearRange::From2020To2024 => YearBounds::Between(2020, 2024),
            YearRange::From2015To2019 => YearBounds::Between(2015, 2019),
            YearRange::From2010To2014 => YearBounds::Between(2010, 2014),
            YearRange::From2000To2009 => YearBounds::Between(2000, 2009),
            YearRange::Before2000 => YearBounds::Before(2000),
        }
    }

    fn parse(s: &str) -> Option<Self> {
        YearRange::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Result orderings offered by the search form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SortBy {
    #[serde(rename = "relevance")]
    Relevance,
    #[serde(rename = "title")]
    TitleAsc,
    #[serde(rename = "-title")]
    TitleDesc,
    #[serde(rename = "-publication_year")]
    NewestFirst,
    #[serde(rename = "publication_year")]
    OldestFirst,
    #[serde(rename = "-view_count")]
    MostPopular,
    #[serde(rename = "-date_added")]
    RecentlyAdded,
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Relevance
    }
}

impl SortBy {
    pub const ALL: [SortBy; 7] = [
        SortBy::Relevance,
        SortBy::TitleAsc,
        SortBy::TitleDesc,
        SortBy::NewestFirst,
        SortBy::OldestFirst,
        SortBy::MostPopular,
        SortBy::RecentlyAdded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::TitleAsc => "title",
            SortBy::TitleDesc => "-title",
            SortBy::NewestFirst => "-publication_year",
            SortBy::OldestFirst => "publication_year",
            SortBy::MostPopular => "-view_count",
            SortBy::RecentlyAdded => "-date_added",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Relevance => "Relevance",
            SortBy::TitleAsc => "Title A-Z",
            SortBy::TitleDesc => "Title Z-A",
            SortBy::NewestFirst => "Newest First",
            SortBy::OldestFirst => "Oldest First",
            SortBy::MostPopular => "Most Popular",
            SortBy::RecentlyAdded => "Recently Added",
        }
    }

    /// ORDER BY clause over the `r` alias of `library_resources`.
    /// The trailing id keeps pages stable when the sort keys tie.
    pub fn order_clause(&self) -> &'static str {
        match self {
            SortBy::Relevance => "r.view_count DESC, r.date_added DESC, r.id DESC",
            SortBy::TitleAsc => "r.title ASC, r.id ASC",
            SortBy::TitleDesc => "r.title DESC, r.id DESC",
            SortBy::NewestFirst => "r.publication_year DESC, r.id DESC",
            SortBy::OldestFirst => "r.publication_year ASC, r.id ASC",
            SortBy::MostPopular => "r.view_count DESC, r.id DESC",
            SortBy::RecentlyAdded => "r.date_added DESC, r.id DESC",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        SortBy::ALL.into_iter().find(|s2| s2.as_str() == s)
    }
}

/// Availability values the search form lets users filter on
pub const AVAILABILITY_CHOICES: [Availability; 3] = [
    Availability::Available,
    Availability::Digital,
    Availability::CheckedOut,
];

// ---------------------------------------------------------------------------
// Raw parameters and validated filter
// ---------------------------------------------------------------------------

/// Search query string as sent by the client. Everything is kept as text so
/// bad values become field errors rather than extractor rejections.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Keywords, title, author or subject text
    pub query: Option<String>,
    /// Resource type id
    pub resource_type: Option<String>,
    /// Subject id
    pub subject: Option<String>,
    /// One of 2020-2024, 2015-2019, 2010-2014, 2000-2009, before-2000
    pub year_range: Option<String>,
    /// One of available, digital, checked_out
    pub availability: Option<String>,
    /// One of relevance, title, -title, -publication_year, publication_year, -view_count, -date_added
    pub sort_by: Option<String>,
    /// Page number (default: 1)
    pub page: Option<String>,
}

/// Validated facets. Every `Some` field narrows the result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResourceFilter {
    pub text: Option<String>,
    pub resource_type_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub year_range: Option<YearRange>,
    pub availability: Option<Availability>,
    pub sort: SortBy,
}

impl ResourceFilter {
    /// True when a free-text query was given; only those searches are logged
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    /// Number of facets that contribute a predicate
    pub fn active_facets(&self) -> usize {
        [
            self.text.is_some(),
            self.resource_type_id.is_some(),
            self.subject_id.is_some(),
            self.year_range.is_some(),
            self.availability.is_some(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_id(field: &str, value: &Option<String>, errors: &mut FieldErrors) -> Option<i32> {
    let raw = non_empty(value)?;
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

impl SearchParams {
    /// Validate the form, collecting every field error
    pub fn to_filter(&self) -> Result<ResourceFilter, FieldErrors> {
        let mut errors = FieldErrors::new();

        let text = match non_empty(&self.query) {
            Some(q) if q.chars().count() > MAX_QUERY_CHARS => {
                errors.add(
                    "query",
                    format!(
                        "Ensure this value has at most {} characters (it has {}).",
                        MAX_QUERY_CHARS,
                        q.chars().count()
                    ),
                );
                None
            }
            Some(q) => Some(q.to_string()),
            None => None,
        };

        let resource_type_id = parse_id("resource_type", &self.resource_type, &mut errors);
        let subject_id = parse_id("subject", &self.subject, &mut errors);

        let year_range = non_empty(&self.year_range).and_then(|raw| {
            let parsed = YearRange::parse(raw);
            if parsed.is_none() {
                errors.add("year_range", INVALID_CHOICE);
            }
            parsed
        });

        let availability = non_empty(&self.availability).and_then(|raw| {
            let parsed = AVAILABILITY_CHOICES.into_iter().find(|a| a.as_str() == raw);
            if parsed.is_none() {
                errors.add("availability", INVALID_CHOICE);
            }
            parsed
        });

        let sort = match non_empty(&self.sort_by) {
            None => SortBy::default(),
            Some(raw) => SortBy::parse(raw).unwrap_or_else(|| {
                errors.add("sort_by", INVALID_CHOICE);
                SortBy::default()
            }),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ResourceFilter {
            text,
            resource_type_id,
            subject_id,
            year_range,
            availability,
            sort,
        })
    }

    /// Requested page; anything unparsable falls back to the first page
    pub fn requested_page(&self) -> i64 {
        parse_page(self.page.as_deref())
    }
}

/// Parse a page number the lenient way: garbage and values below 1 mean page 1
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

/// Escape LIKE metacharacters and wrap the term for a substring match
pub fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Resolved page window over a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageInfo {
    /// Current page (1-based)
    pub page: i64,
    /// Items per page
    pub per_page: i64,
    /// Total number of matching rows
    pub total: i64,
    /// Number of pages (at least 1)
    pub num_pages: i64,
}

impl PageInfo {
    /// Clamp the requested page into `1..=num_pages`, so a page past the end
    /// shows the last page instead of an empty one
    pub fn resolve(requested: i64, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let num_pages = ((total + per_page - 1) / per_page).max(1);
        let page = requested.clamp(1, num_pages);
        Self {
            page,
            per_page,
            total,
            num_pages,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SearchParams {
        SearchParams::default()
    }

    #[test]
    fn test_empty_form_is_unfiltered() {
        let filter = params().to_filter().unwrap();
        assert_eq!(filter, ResourceFilter::default());
        assert_eq!(filter.sort, SortBy::Relevance);
        assert_eq!(filter.active_facets(), 0);
    }

    #[test]
    fn test_blank_values_mean_any() {
        let filter = SearchParams {
            query: Some("   ".into()),
            resource_type: Some("".into()),
            year_range: Some("".into()),
            availability: Some("".into()),
            sort_by: Some("".into()),
            ..params()
        }
        .to_filter()
        .unwrap();
        assert!(!filter.has_text());
        assert_eq!(filter.active_facets(), 0);
    }

    #[test]
    fn test_all_facets_parsed() {
        let filter = SearchParams {
            query: Some("  machine learning ".into()),
            resource_type: Some("2".into()),
            subject: Some("7".into()),
            year_range: Some("2015-2019".into()),
            availability: Some("digital".into()),
            sort_by: Some("-publication_year".into()),
            page: None,
        }
        .to_filter()
        .unwrap();

        assert_eq!(filter.text.as_deref(), Some("machine learning"));
        assert_eq!(filter.resource_type_id, Some(2));
        assert_eq!(filter.subject_id, Some(7));
        assert_eq!(filter.year_range, Some(YearRange::From2015To2019));
        assert_eq!(filter.availability, Some(Availability::Digital));
        assert_eq!(filter.sort, SortBy::NewestFirst);
        assert_eq!(filter.active_facets(), 5);
    }

    #[test]
    fn test_invalid_choices_collected() {
        let errors = SearchParams {
            resource_type: Some("book".into()),
            year_range: Some("1990-1999".into()),
            availability: Some("restricted".into()),
            sort_by: Some("random".into()),
            ..params()
        }
        .to_filter()
        .unwrap_err();

        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["availability", "resource_type", "sort_by", "year_range"]);
    }

    #[test]
    fn test_query_too_long() {
        let errors = SearchParams {
            query: Some("x".repeat(MAX_QUERY_CHARS + 1)),
            ..params()
        }
        .to_filter()
        .unwrap_err();
        assert!(errors.get("query").is_some());

        let ok = SearchParams {
            query: Some("é".repeat(MAX_QUERY_CHARS)),
            ..params()
        }
        .to_filter();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_year_range_bounds() {
        assert_eq!(YearRange::From2000To2009.bounds(), YearBounds::Between(2000, 2009));
        assert_eq!(YearRange::From2020To2024.bounds(), YearBounds::Between(2020, 2024));
        assert_eq!(YearRange::Before2000.bounds(), YearBounds::Before(2000));
    }

    #[test]
    fn test_relevance_orders_by_popularity_then_recency() {
        assert_eq!(
            SortBy::Relevance.order_clause(),
            "r.view_count DESC, r.date_added DESC, r.id DESC"
        );
        for sort in SortBy::ALL {
            assert!(sort.order_clause().contains("r.id"));
        }
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("data"), "%data%");
        assert_eq!(contains_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[test]
    fn test_parse_page_is_lenient() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("3")), 3);
    }

    #[test]
    fn test_page_info_clamps() {
        let info = PageInfo::resolve(10, 20, 45);
        assert_eq!(info.num_pages, 3);
        assert_eq!(info.page, 3);
        assert_eq!(info.offset(), 40);
        assert!(!info.has_next());
        assert!(info.has_previous());

        let empty = PageInfo::resolve(4, 20, 0);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.num_pages, 1);
        assert_eq!(empty.offset(), 0);
    }
}
