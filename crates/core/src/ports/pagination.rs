//! Pagination types for list queries.
//!
//! These types implement Relay-style forward cursor pagination, as served
//! by the GraphQL `patients` connection.

use crate::error::{DomainError, DomainResult};

/// Largest page the API will serve.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Opaque cursor for pagination.
///
/// Clients treat the value as an opaque token. The in-memory repository
/// encodes the zero-based offset of the record within the filtered result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub value: String,
}

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Cursor pointing at the record at `offset`.
    pub fn from_offset(offset: usize) -> Self {
        Self {
            value: offset.to_string(),
        }
    }

    /// Decode an offset cursor.
    pub fn offset(&self) -> DomainResult<usize> {
        self.value
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidCursor(self.value.clone()))
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Forward pagination parameters.
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    /// Number of items to fetch.
    pub first: Option<u32>,
    /// Exclusive cursor: results start after the record it points to.
    pub after: Option<Cursor>,
}

impl Pagination {
    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> usize {
        self.first.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE) as usize
    }
}

/// Paginated result set with edges and page info.
///
/// This is the Relay connection pattern for cursor-based pagination.
#[derive(Debug, Clone)]
pub struct Connection<T> {
    /// List of edges (node + cursor pairs).
    pub edges: Vec<Edge<T>>,
    /// Information about the current page.
    pub page_info: PageInfo,
    /// Total count of items matching the filter, across all pages.
    pub total_count: i64,
}

impl<T> Connection<T> {
    /// Cursor to pass as `after` for the following page, if there is one.
    pub fn next_cursor(&self) -> Option<Cursor> {
        if self.page_info.has_next_page {
            self.page_info.end_cursor.clone()
        } else {
            None
        }
    }

    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

/// A single item in a paginated result.
#[derive(Debug, Clone)]
pub struct Edge<T> {
    /// The actual item.
    pub node: T,
    /// Cursor for this item (used for pagination).
    pub cursor: Cursor,
}

/// Information about the current page in a paginated result.
#[derive(Debug, Clone, Default)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor of the first item in this page.
    pub start_cursor: Option<Cursor>,
    /// Cursor of the last item in this page.
    pub end_cursor: Option<Cursor>,
}
