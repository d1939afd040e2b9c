//! Pagination helpers for list endpoints

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

/// Pagination request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed)
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Build a request, rejecting page 0 and sizes outside 1..=100.
    ///
    /// ```
    /// use core_library::pagination::PageRequest;
    ///
    /// let request = PageRequest::new(2, 20).unwrap();
    /// assert_eq!(request.offset(), 20);
    /// assert!(PageRequest::new(0, 20).is_err());
    /// ```
    pub fn new(page: u32, page_size: u32) -> Result<Self> {
        if page == 0 {
            return Err(LibraryError::invalid("page", "must be at least 1"));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(LibraryError::invalid(
                "page_size",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Validate an optional `limit` query value (1..=1000).
pub fn validate_limit(limit: Option<u32>) -> Result<Option<u32>> {
    match limit {
        Some(value) if value == 0 || value > MAX_LIMIT => Err(LibraryError::invalid(
            "limit",
            format!("must be between 1 and {}", MAX_LIMIT),
        )),
        other => Ok(other),
    }
}

/// One page of an already ordered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the collection before `limit` was applied
    pub total_count: usize,
    pub page: u32,
    pub page_size: u32,
    /// At least 1, even for an empty collection
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Apply `limit` to an ordered collection, then cut out the requested page.
    ///
    /// ```
    /// use core_library::pagination::{Page, PageRequest};
    ///
    /// let page = Page::paginate((1..=25).collect(), None, PageRequest::new(3, 10).unwrap());
    /// assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
    /// assert_eq!(page.total_pages, 3);
    /// ```
    pub fn paginate(mut items: Vec<T>, limit: Option<u32>, request: PageRequest) -> Self {
        let total_count = items.len();
        if let Some(limit) = limit {
            items.truncate(limit as usize);
        }

        let limited = items.len();
        let page_size = request.page_size.max(1) as usize;
        let total_pages = if limited == 0 {
            1
        } else {
            limited.div_ceil(page_size) as u32
        };

        let start = request.offset().min(limited);
        let end = (start + page_size).min(limited);
        let items: Vec<T> = items.drain(start..end).collect();

        Self {
            items,
            total_count,
            page: request.page,
            page_size: request.page_size,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn items_count(&self) -> usize {
        self.items.len()
    }
}
