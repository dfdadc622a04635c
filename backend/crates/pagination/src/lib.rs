//! Offset pagination primitives shared by catalogue listing endpoints.
//!
//! The crate is pure arithmetic: callers validate a [`PageRequest`] from
//! query parameters, ask the store for a total count, and derive a
//! [`PageWindow`] plus [`NavLinks`]. No I/O happens here, and all page maths
//! use exact integer arithmetic because `total_pages` gates `has_next`.
//!
//! # Examples
//! ```
//! use pagination::{NavLinks, PageRequest, PageWindow};
//!
//! let request = PageRequest::new(Some(2), Some(5)).expect("valid request");
//! let window = PageWindow::compute(request, 7);
//! assert_eq!(window.total_pages(), 2);
//! assert!(window.has_prev());
//! assert!(!window.has_next());
//!
//! let links = NavLinks::for_window("/api/v1/octocats", &window);
//! assert_eq!(links.prev.as_deref(), Some("/api/v1/octocats?page=1&per_page=5"));
//! assert!(links.next.is_none());
//! ```

use serde::Serialize;
use thiserror::Error;

/// Page number used when the query omits `page`.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the query omits `per_page`.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// The enumerated set of accepted `per_page` values.
pub const PER_PAGE_CHOICES: [u32; 5] = [5, 10, 25, 50, 100];

/// Validation failures for pagination query parameters.
///
/// Raised before any store access so invalid windows never reach the
/// repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// `page` was zero; pages are numbered from 1.
    #[error("page must be a positive integer")]
    NonPositivePage,
    /// `per_page` was not one of [`PER_PAGE_CHOICES`].
    #[error("per_page must be one of 5, 10, 25, 50, 100 (got {requested})")]
    PerPageNotAllowed {
        /// The rejected value.
        requested: u32,
    },
}

/// A validated pagination request.
///
/// Construction normalises absent parameters to [`DEFAULT_PAGE`] and
/// [`DEFAULT_PER_PAGE`] and rejects values outside the accepted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Validate raw query parameters into a request.
    ///
    /// # Errors
    /// Returns [`PageRequestError::NonPositivePage`] when `page` is zero and
    /// [`PageRequestError::PerPageNotAllowed`] when `per_page` is outside
    /// [`PER_PAGE_CHOICES`].
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageRequest, PageRequestError};
    ///
    /// let request = PageRequest::new(None, None).expect("defaults are valid");
    /// assert_eq!(request.page(), 1);
    /// assert_eq!(request.per_page(), 10);
    ///
    /// assert_eq!(
    ///     PageRequest::new(Some(1), Some(7)),
    ///     Err(PageRequestError::PerPageNotAllowed { requested: 7 })
    /// );
    /// ```
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Result<Self, PageRequestError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        if page == 0 {
            return Err(PageRequestError::NonPositivePage);
        }
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);
        if !PER_PAGE_CHOICES.contains(&per_page) {
            return Err(PageRequestError::PerPageNotAllowed {
                requested: per_page,
            });
        }
        Ok(Self { page, per_page })
    }

    /// Requested page number (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }
}

/// A computed page window over an ordered collection.
///
/// ## Invariants
/// - `total_pages == ceil(total_items / per_page)` exactly; an empty
///   collection yields `total_pages == 0`, so `has_next` is false on page 1.
/// - A `page` beyond `total_pages` is not an error: the window is empty and
///   `has_next` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u32,
    per_page: u32,
    total_items: u64,
    total_pages: u64,
}

impl PageWindow {
    /// Derive the window for `request` over a collection of `total_items`.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageRequest, PageWindow};
    ///
    /// let request = PageRequest::new(Some(1), Some(5)).expect("valid request");
    /// let window = PageWindow::compute(request, 7);
    /// assert_eq!(window.total_pages(), 2);
    /// assert!(window.has_next());
    /// ```
    #[must_use]
    pub const fn compute(request: PageRequest, total_items: u64) -> Self {
        let per_page = request.per_page();
        let total_pages = total_items.div_ceil(per_page as u64);
        Self {
            page: request.page(),
            per_page,
            total_items,
            total_pages,
        }
    }

    /// Page number this window describes (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Total number of items in the collection.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Total number of pages; zero for an empty collection.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a further page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages
    }

    /// Item offset of the first slot in this window.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Maximum number of items the window can hold.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.per_page
    }
}

/// Navigation links for one page of a listing.
///
/// `prev` and `next` are omitted from serialised output when inapplicable
/// rather than rendered as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLinks {
    /// Link to the requested page.
    #[serde(rename = "self")]
    pub current: String,
    /// Link to the first page.
    pub first: String,
    /// Link to the last page (page 1 for an empty collection).
    pub last: String,
    /// Link to the previous page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Link to the next page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl NavLinks {
    /// Build navigation links for `window` rooted at `base_path`.
    ///
    /// # Examples
    /// ```
    /// use pagination::{NavLinks, PageRequest, PageWindow};
    ///
    /// let request = PageRequest::new(Some(1), Some(5)).expect("valid request");
    /// let window = PageWindow::compute(request, 7);
    /// let links = NavLinks::for_window("/api/v1/octocats", &window);
    /// assert_eq!(links.next.as_deref(), Some("/api/v1/octocats?page=2&per_page=5"));
    /// assert!(links.prev.is_none());
    /// ```
    #[must_use]
    pub fn for_window(base_path: &str, window: &PageWindow) -> Self {
        let link = |page: u64| format!("{base_path}?page={page}&per_page={}", window.per_page());
        Self {
            current: link(u64::from(window.page())),
            first: link(1),
            last: link(window.total_pages().max(1)),
            prev: window
                .has_prev()
                .then(|| link(u64::from(window.page()) - 1)),
            next: window
                .has_next()
                .then(|| link(u64::from(window.page()) + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some(3), Some(25), 3, 25)]
    #[case(Some(1), None, 1, 10)]
    #[case(None, Some(100), 1, 100)]
    fn request_normalises_defaults(
        #[case] page: Option<u32>,
        #[case] per_page: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_per_page: u32,
    ) {
        let request = PageRequest::new(page, per_page).expect("valid request");
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.per_page(), expected_per_page);
    }

    #[rstest]
    #[case(Some(0), None, PageRequestError::NonPositivePage)]
    #[case(None, Some(0), PageRequestError::PerPageNotAllowed { requested: 0 })]
    #[case(None, Some(7), PageRequestError::PerPageNotAllowed { requested: 7 })]
    #[case(None, Some(1000), PageRequestError::PerPageNotAllowed { requested: 1000 })]
    fn request_rejects_invalid_parameters(
        #[case] page: Option<u32>,
        #[case] per_page: Option<u32>,
        #[case] expected: PageRequestError,
    ) {
        assert_eq!(PageRequest::new(page, per_page), Err(expected));
    }

    #[rstest]
    #[case(5, 0, 0)]
    #[case(5, 1, 1)]
    #[case(5, 5, 1)]
    #[case(5, 6, 2)]
    #[case(5, 7, 2)]
    #[case(10, 7, 1)]
    #[case(25, 51, 3)]
    #[case(50, 100, 2)]
    #[case(100, 101, 2)]
    fn total_pages_is_exact_ceiling(
        #[case] per_page: u32,
        #[case] total_items: u64,
        #[case] expected_pages: u64,
    ) {
        let request = PageRequest::new(None, Some(per_page)).expect("valid request");
        let window = PageWindow::compute(request, total_items);
        assert_eq!(window.total_pages(), expected_pages);
        assert_eq!(
            window.total_pages(),
            total_items.div_ceil(u64::from(per_page))
        );
    }

    #[rstest]
    #[case(1, 7, false, true)]
    #[case(2, 7, true, false)]
    #[case(1, 0, false, false)]
    #[case(3, 7, true, false)]
    fn window_flags_follow_page_position(
        #[case] page: u32,
        #[case] total_items: u64,
        #[case] expected_prev: bool,
        #[case] expected_next: bool,
    ) {
        let request = PageRequest::new(Some(page), Some(5)).expect("valid request");
        let window = PageWindow::compute(request, total_items);
        assert_eq!(window.has_prev(), expected_prev);
        assert_eq!(window.has_next(), expected_next);
    }

    #[rstest]
    fn pages_beyond_the_collection_never_report_next() {
        for page in 3..40 {
            let request = PageRequest::new(Some(page), Some(5)).expect("valid request");
            let window = PageWindow::compute(request, 7);
            assert!(!window.has_next(), "page {page} must not report has_next");
            assert!(window.offset() >= window.total_items());
        }
    }

    #[rstest]
    fn offsets_walk_the_collection_in_page_steps() {
        let request = PageRequest::new(Some(4), Some(25)).expect("valid request");
        let window = PageWindow::compute(request, 200);
        assert_eq!(window.offset(), 75);
        assert_eq!(window.limit(), 25);
    }

    #[rstest]
    fn links_on_a_middle_page_include_prev_and_next() {
        let request = PageRequest::new(Some(2), Some(5)).expect("valid request");
        let window = PageWindow::compute(request, 12);
        let links = NavLinks::for_window("/api/v1/octocats", &window);
        assert_eq!(links.current, "/api/v1/octocats?page=2&per_page=5");
        assert_eq!(links.first, "/api/v1/octocats?page=1&per_page=5");
        assert_eq!(links.last, "/api/v1/octocats?page=3&per_page=5");
        assert_eq!(links.prev.as_deref(), Some("/api/v1/octocats?page=1&per_page=5"));
        assert_eq!(links.next.as_deref(), Some("/api/v1/octocats?page=3&per_page=5"));
    }

    #[rstest]
    fn inapplicable_links_are_omitted_from_json() {
        let request = PageRequest::new(None, Some(10)).expect("valid request");
        let window = PageWindow::compute(request, 7);
        let links = NavLinks::for_window("/api/v1/octocats", &window);
        let value = serde_json::to_value(&links).expect("links serialise");
        let object = value.as_object().expect("links are an object");
        assert!(object.contains_key("self"));
        assert!(object.contains_key("first"));
        assert!(object.contains_key("last"));
        assert!(!object.contains_key("prev"));
        assert!(!object.contains_key("next"));
    }

    #[rstest]
    fn empty_collection_clamps_last_link_to_page_one() {
        let request = PageRequest::new(None, Some(5)).expect("valid request");
        let window = PageWindow::compute(request, 0);
        assert_eq!(window.total_pages(), 0);
        let links = NavLinks::for_window("/api/v1/octocats", &window);
        assert_eq!(links.last, "/api/v1/octocats?page=1&per_page=5");
    }
}
