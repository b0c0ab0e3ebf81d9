//! Search-query parsing.
//!
//! The backend evaluates the query itself; parsing here validates its length
//! and records the terms for logging. Terms are comma separated and must all
//! match. A leading `"` anchors a term to the start of a field, a
//! trailing `"` anchors it to the end, and quotes on both ends demand an exact
//! match.

use std::error::Error;
use std::fmt;

use crate::constants::{InvalidConstant, check_len};

/// How a single term matches a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Contains,
    Prefix,
    Suffix,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub text: String,
    pub mode: MatchMode,
}

impl SearchTerm {
    fn parse(raw: &str) -> Option<Self> {
        let leading = raw.starts_with('"');
        let trailing = raw.len() > 1 && raw.ends_with('"');
        let text = raw.strip_prefix('"').unwrap_or(raw);
        let text = if trailing {
            text.strip_suffix('"').unwrap_or(text)
        } else {
            text
        };
        if text.is_empty() {
            return None;
        }
        let mode = match (leading, trailing) {
            (true, true) => MatchMode::Exact,
            (true, false) => MatchMode::Prefix,
            (false, true) => MatchMode::Suffix,
            (false, false) => MatchMode::Contains,
        };
        Some(Self {
            text: text.to_string(),
            mode,
        })
    }

    #[cfg(test)]
    fn matches(&self, field: &str) -> bool {
        let field = field.to_lowercase();
        let text = self.text.to_lowercase();
        match self.mode {
            MatchMode::Contains => field.contains(&text),
            MatchMode::Prefix => field.starts_with(&text),
            MatchMode::Suffix => field.ends_with(&text),
            MatchMode::Exact => field == text,
        }
    }
}

/// A validated search query, kept alongside its raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    terms: Vec<SearchTerm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQueryError {
    Invalid(InvalidConstant),
}

impl fmt::Display for SearchQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SearchQueryError {}

impl SearchQuery {
    /// Parses and validates a raw query string.
    ///
    /// # Errors
    /// Returns [`SearchQueryError::Invalid`] when the query is empty or longer
    /// than 100 characters. A query made only of separators or quotes is
    /// accepted with no terms and left for the backend to interpret.
    pub fn parse(raw: impl Into<String>) -> Result<Self, SearchQueryError> {
        let raw = raw.into();
        check_len("query", &raw).map_err(SearchQueryError::Invalid)?;
        let terms = raw
            .split(',')
            .map(str::trim)
            .filter_map(SearchTerm::parse)
            .collect();
        Ok(Self { raw, terms })
    }

    /// The query text as sent to the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn terms(&self) -> &[SearchTerm] {
        &self.terms
    }

    #[cfg(test)]
    fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str> + Clone) -> bool {
        self.terms
            .iter()
            .all(|term| fields.clone().into_iter().any(|field| term.matches(field)))
    }
}
