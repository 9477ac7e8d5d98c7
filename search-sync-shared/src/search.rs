//! Search query and result types.
//!
//! `SearchQuery` carries everything the query layer needs to build a request:
//! free text, the fields to score it against, exact-match filters, pagination
//! and an optional sort. The index to search is passed separately.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Page size used when the caller does not set one.
pub const DEFAULT_LIMIT: usize = 30;

/// Fixed server-side timeout for search and wildcard queries.
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Sort order for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a sort direction string is not `asc` or `desc`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort direction '{0}', expected 'asc' or 'desc'")]
pub struct ParseSortDirectionError(pub String);

impl FromStr for SortDirection {
    type Err = ParseSortDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(ParseSortDirectionError(s.to_string())),
        }
    }
}

/// A single exact-match constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFilter {
    pub field: String,
    pub value: String,
}

impl TermFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for TermFilter {
    fn from((field, value): (K, V)) -> Self {
        Self::new(field, value)
    }
}

/// Parameters of a full-text search.
///
/// # Example
///
/// ```
/// use search_sync_shared::{SearchQuery, SortDirection};
///
/// let query = SearchQuery::new("rust podcast")
///     .with_search_fields(["title", "description"])
///     .with_filter(("type", "episode"))
///     .with_limit(10)
///     .with_offset(20)
///     .sorted_by("publishedAt", SortDirection::Desc);
///
/// assert_eq!(query.start(), 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Free text. A blank query never reaches the index.
    pub query: String,
    /// Fields to score the text against. `None` entries are skipped.
    pub search_fields: Vec<Option<String>>,
    /// Exact-match filters; all of them must hold.
    pub filter_fields: Vec<TermFilter>,
    /// Page size.
    pub limit: usize,
    /// Rank of the first hit to return; `None` starts at the top.
    pub offset: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

impl SearchQuery {
    /// Create a query with default paging and no fields, filters or sort.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_fields: Vec::new(),
            filter_fields: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: None,
            sort_by: None,
            sort_direction: None,
        }
    }

    /// Add search fields.
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields
            .extend(fields.into_iter().map(|f| Some(f.into())));
        self
    }

    /// Add search fields that may contain gaps. Gaps are kept in
    /// `search_fields` and skipped when the request is built.
    pub fn with_optional_search_fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        self.search_fields.extend(fields);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<TermFilter>) -> Self {
        self.filter_fields.push(filter.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sorted_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = Some(field.into());
        self.sort_direction = Some(direction);
        self
    }

    /// Whether the query text is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }

    /// Search fields with gaps and blank names removed, in order.
    pub fn effective_search_fields(&self) -> impl Iterator<Item = &str> {
        self.search_fields
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|f| !f.trim().is_empty())
    }

    /// The sort to apply, present only when both a non-blank field and a
    /// direction were supplied.
    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        match (self.sort_by.as_deref(), self.sort_direction) {
            (Some(field), Some(direction)) if !field.trim().is_empty() => {
                Some((field, direction))
            }
            _ => None,
        }
    }

    /// Start rank of the requested page.
    pub fn start(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// One matched document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub index: String,
    pub id: String,
    pub score: Option<f64>,
    pub source: Map<String, Value>,
}

/// A page of search results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// Number of matching documents in the index, regardless of page size.
    pub total_hits: u64,
    /// Hits of the requested page, in rank order.
    pub hits: Vec<SearchHit>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Result of a wildcard query: the total and the untouched response body.
#[derive(Debug, Clone, PartialEq)]
pub struct WildcardResult {
    pub total_hits: u64,
    pub raw: Value,
}
