//! Validation of the `search` query parameter shared by every listing endpoint.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use utoipa::IntoParams;

/// 3 to 50 characters, alphanumeric at both ends; word characters, `-`, `.`
/// and whitespace in between.
static SEARCH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_\-.\s]{1,48}[a-zA-Z0-9]$")
        .expect("search pattern is a valid regex")
});

/// Query parameters accepted by listing endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring to look for. Omit or leave empty to list everything.
    #[param(pattern = r"^[a-zA-Z0-9][a-zA-Z0-9_\-.\s]{1,48}[a-zA-Z0-9]$")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid search parameters")]
pub struct InvalidSearchTerm;

/// A search term that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Validates a raw term against the search pattern.
    pub fn parse(raw: &str) -> Result<Self, InvalidSearchTerm> {
        if SEARCH_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidSearchTerm)
        }
    }

    /// Returns `Ok(None)` when no search was requested, i.e. the parameter is
    /// absent or empty.
    pub fn from_query(query: &SearchQuery) -> Result<Option<Self>, InvalidSearchTerm> {
        match query.search.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => Self::parse(raw).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_terms() {
        for term in ["Test Task 2", "abc", "HIGH", "report_v1.2", "a-b", "42"] {
            assert!(SearchTerm::parse(term).is_ok(), "expected '{term}' to be accepted");
        }
    }

    #[test]
    fn rejects_terms_outside_the_pattern() {
        let too_long = "a".repeat(51);
        for term in ["!@Invalid@!", "ab", " abc", "abc ", "abc-", "a%c", too_long.as_str()] {
            assert_eq!(
                SearchTerm::parse(term),
                Err(InvalidSearchTerm),
                "expected '{term}' to be rejected"
            );
        }
    }

    #[test]
    fn accepts_terms_at_the_length_limits() {
        assert!(SearchTerm::parse(&"a".repeat(3)).is_ok());
        assert!(SearchTerm::parse(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn absent_or_empty_search_means_no_filter() {
        assert_eq!(SearchTerm::from_query(&SearchQuery::default()), Ok(None));

        let empty = SearchQuery {
            search: Some(String::new()),
        };
        assert_eq!(SearchTerm::from_query(&empty), Ok(None));
    }

    #[test]
    fn from_query_validates_present_terms() {
        let query = SearchQuery {
            search: Some("Test Task 2".to_string()),
        };
        let term = SearchTerm::from_query(&query).unwrap().unwrap();
        assert_eq!(term.as_str(), "Test Task 2");

        let query = SearchQuery {
            search: Some("!@Invalid@!".to_string()),
        };
        assert_eq!(SearchTerm::from_query(&query), Err(InvalidSearchTerm));
    }
}
