//! Offset pagination primitives shared by the forum list endpoints.
//!
//! A [`PageRequest`] captures the one-based page number and page size a client
//! asked for. Adapters translate it into `OFFSET`/`LIMIT` clauses (or slice
//! bounds for in-memory stores), and [`PageInfo`] derives the envelope fields
//! returned alongside each page of results.
//!
//! ```
//! use pagination::{PageInfo, PageRequest};
//!
//! let request = PageRequest::new(2, 10).expect("valid request");
//! assert_eq!(request.offset(), 10);
//!
//! let info = PageInfo::new(request, 25);
//! assert_eq!(info.total_pages(), 3);
//! assert!(info.has_next_page());
//! assert!(info.has_prev_page());
//! ```

use serde::{Deserialize, Serialize};

/// Page number used when the client omits one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used by list endpoints that do not override it.
pub const DEFAULT_LIMIT: u32 = 10;

/// Errors raised when building a request from numeric parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The page number was zero.
    #[error("page must be a positive integer")]
    ZeroPage,
    /// The page size was zero.
    #[error("limit must be a positive integer")]
    ZeroLimit,
}

/// Validated one-based page request.
///
/// ## Invariants
/// - `page >= 1`
/// - `limit >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request from numeric parts.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page` or `limit` is zero.
    pub fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        Ok(Self { page, limit })
    }

    /// Read raw query-string values leniently.
    ///
    /// Each value contributes its leading run of digits. Missing, blank,
    /// non-numeric and zero values fall back to page one and
    /// `default_limit`.
    ///
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::parse(Some("3"), Some("abc"), 20);
    /// assert_eq!(request.page(), 3);
    /// assert_eq!(request.limit(), 20);
    /// ```
    #[must_use]
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: u32) -> Self {
        Self {
            page: leading_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: leading_positive(limit).unwrap_or_else(|| default_limit.max(1)),
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items to skip before this page starts.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn leading_positive(value: Option<&str>) -> Option<u32> {
    let raw = value?.trim_start();
    let digits = raw
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw, |end| &raw[..end]);
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Envelope metadata describing where a page sits within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    current_page: u32,
    total_pages: u64,
    total: u64,
    has_next_page: bool,
    has_prev_page: bool,
}

impl PageInfo {
    /// Derive envelope metadata for `request` given the total match count.
    ///
    /// `total_pages` is `ceil(total / limit)`, so an empty result set reports
    /// zero pages.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(request.limit));
        Self {
            current_page: request.page,
            total_pages,
            total,
            has_next_page: u64::from(request.page) < total_pages,
            has_prev_page: request.page > 1,
        }
    }

    /// Page number the envelope describes.
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Number of pages needed to cover every match.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Total number of matching items across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_prev_page(&self) -> bool {
        self.has_prev_page
    }
}

/// A page of items paired with its envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in the order the store returned them.
    pub items: Vec<T>,
    /// Envelope metadata for the page.
    pub info: PageInfo,
}

impl<T> Page<T> {
    /// Pair `items` with metadata derived from `request` and `total`.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            info: PageInfo::new(request, total),
        }
    }

    /// Transform every item while keeping the envelope unchanged.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}
