//! Page window computation for listable resources
//!
//! Every list endpoint filters first and paginates second. [`paginate`] turns the
//! caller's requested page and page size plus the post-filter item count into a
//! [`PageWindow`]: a normalized page, a valid `[start, end)` slice bound, and the
//! metadata reported back in the list envelope.
//!
//! Out-of-range requests never fail. A page past the end yields an empty window
//! while still reporting the real total.
//!
//! # Example
//!
//! ```rust
//! use storefront_service::pagination::paginate;
//!
//! let window = paginate(1, 10, 25);
//! assert_eq!(window.range(), 0..10);
//! assert_eq!(window.total_pages, 3);
//!
//! let past_end = paginate(99, 10, 5);
//! assert!(past_end.is_empty());
//! assert_eq!(past_end.total_count, 5);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::ops::Range;

/// Page used when the caller asks for page zero, a negative page, or nothing at all
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the caller asks for a non-positive size or nothing at all
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Normalized page window over a filtered collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Page number after normalization (always >= 1)
    pub page: u64,
    /// Page size after normalization (always >= 1)
    pub page_size: u64,
    /// `ceil(total_count / page_size)`, zero for an empty collection
    pub total_pages: u64,
    /// Number of items matching the filter
    pub total_count: u64,
    /// First index of the window; may exceed `total_count` for pages past the end
    pub start: u64,
    /// One past the last index of the window; never exceeds `total_count`
    pub end: u64,
}

/// Compute the page window for a request
///
/// `page <= 0` becomes 1 and `page_size <= 0` becomes [`DEFAULT_PAGE_SIZE`]. No upper
/// bound is put on the page size.
pub fn paginate(page: i64, page_size: i64, total_count: usize) -> PageWindow {
    let page = if page <= 0 { DEFAULT_PAGE } else { page } as u64;
    let page_size = if page_size <= 0 { DEFAULT_PAGE_SIZE } else { page_size } as u64;
    let total_count = total_count as u64;

    let total_pages = total_count.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(total_count);

    PageWindow {
        page,
        page_size,
        total_pages,
        total_count,
        start,
        end,
    }
}

impl PageWindow {
    /// Slice bound for this window, empty when the page lies past the end
    pub fn range(&self) -> Range<usize> {
        let end = self.end as usize;
        let start = (self.start as usize).min(end);
        start..end
    }

    /// Whether the window selects no items
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Keep only the items inside this window
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let range = self.range();
        items
            .into_iter()
            .skip(range.start)
            .take(range.len())
            .collect()
    }

    /// Metadata reported in the list envelope
    pub fn meta(&self) -> PaginationMeta {
        PaginationMeta {
            total_pages: self.total_pages,
            total_count: self.total_count,
            current_page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Pagination block of the list envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total_pages: u64,
    pub total_count: u64,
    pub current_page: u64,
    pub page_size: u64,
}

/// Query string accepted by list endpoints: `?page=&pageSize=&search=`
///
/// Parsing is lenient. A missing or non-numeric `page`/`pageSize` falls back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page_size: Option<i64>,
    #[serde(default)]
    pub search: Option<String>,
}

impl ListQuery {
    /// Requested page, defaulted
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    /// Requested page size, defaulted
    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Search fragment, `None` when absent or empty
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}
