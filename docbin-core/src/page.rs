//! Pagination controls and the page envelope.
//!
//! [`Pagination`] is derived from the `limit` and `offset` query parameters, and [`Page`]
//! is the list response carrying one window of results plus the metadata needed to fetch
//! the next one.

use serde::{Deserialize, Serialize};

/// Query parameter holding the page size.
pub const LIMIT_PARAM: &str = "limit";
/// Query parameter holding the number of documents to skip.
pub const OFFSET_PARAM: &str = "offset";

/// Page size used when `limit` is absent or invalid.
pub const DEFAULT_LIMIT: usize = 10;
/// Upper bound applied to any requested page size.
pub const MAX_LIMIT: usize = 100;

/// A single page of results.
///
/// # Example
///
/// ```ignore
/// use docbin::page::Page;
///
/// let page = Page::builder(vec!["a", "b"])
///     .with_total_items(5)
///     .with_limit(2)
///     .with_offset(0)
///     .build();
///
/// assert!(page.has_more);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The items in this window, most recently created first.
    pub items: Vec<T>,
    /// Number of matching items across all windows.
    pub total_items: usize,
    /// The effective page size.
    pub limit: usize,
    /// The effective number of skipped items.
    pub offset: usize,
    /// Whether items exist beyond this window.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Builds a page, deriving `has_more` from the window and the total.
    pub fn new(items: Vec<T>, total_items: usize, pagination: Pagination) -> Self {
        Self::builder(items)
            .with_total_items(total_items)
            .with_limit(pagination.limit)
            .with_offset(pagination.offset)
            .build()
    }

    /// Creates a new builder for constructing a page.
    pub fn builder(items: Vec<T>) -> PageBuilder<T> {
        PageBuilder::new(items)
    }
}

/// Builder for [`Page`].
pub struct PageBuilder<T> {
    items: Vec<T>,
    total_items: usize,
    limit: usize,
    offset: usize,
}

impl<T> PageBuilder<T> {
    /// Creates a new builder with the given items and default pagination.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total_items: 0,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// Sets the total count of matching items.
    pub fn with_total_items(mut self, total_items: usize) -> Self {
        self.total_items = total_items;
        self
    }

    /// Sets the effective page size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the effective offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Builds the final [`Page`].
    pub fn build(self) -> Page<T> {
        Page {
            has_more: self.offset.saturating_add(self.limit) < self.total_items,
            items: self.items,
            total_items: self.total_items,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Window applied to a list query.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Maximum number of items to return, in `1..=MAX_LIMIT`.
    pub limit: usize,
    /// Number of items to skip.
    pub offset: usize,
}

impl Pagination {
    /// Creates pagination with the limit clamped to `1..=MAX_LIMIT`.
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset,
        }
    }

    /// Parses raw `limit` and `offset` values.
    ///
    /// Non-numeric or non-positive limits fall back to [`DEFAULT_LIMIT`]; limits above
    /// [`MAX_LIMIT`] are clamped. Non-numeric or negative offsets fall back to zero.
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .map_or(DEFAULT_LIMIT, |limit| usize::try_from(limit).unwrap_or(MAX_LIMIT));

        let offset = offset
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(|offset| usize::try_from(offset).ok())
            .unwrap_or(0);

        Self::new(limit, offset)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
