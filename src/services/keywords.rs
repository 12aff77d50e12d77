//! Keyword autocomplete service

use crate::{
    config::SearchConfig,
    error::AppResult,
    models::keyword::KeywordSuggestion,
    repository::Repository,
};

#[derive(Clone)]
pub struct KeywordsService {
    repository: Repository,
    config: SearchConfig,
}

/// The trimmed term when it is long enough to be worth a lookup
pub fn usable_term(term: Option<&str>, min_chars: usize) -> Option<&str> {
    term.map(str::trim).filter(|t| t.chars().count() >= min_chars)
}

impl KeywordsService {
    pub fn new(repository: Repository, config: SearchConfig) -> Self {
        Self { repository, config }
    }

    /// Suggestions for a partially typed keyword. Terms shorter than the
    /// configured minimum yield no suggestions.
    pub async fn autocomplete(&self, term: Option<&str>) -> AppResult<Vec<KeywordSuggestion>> {
        let Some(term) = usable_term(term, self.config.autocomplete_min_chars) else {
            return Ok(Vec::new());
        };

        let keywords = self
            .repository
            .keywords
            .matching(term, self.config.autocomplete_limit)
            .await?;

        Ok(keywords.into_iter().map(KeywordSuggestion::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_terms_are_skipped() {
        assert_eq!(usable_term(None, 2), None);
        assert_eq!(usable_term(Some(""), 2), None);
        assert_eq!(usable_term(Some(" a  "), 2), None);
        assert_eq!(usable_term(Some("é"), 2), None);
        assert_eq!(usable_term(Some(" ai "), 2), Some("ai"));
        assert_eq!(usable_term(Some("data"), 2), Some("data"));
    }
}
