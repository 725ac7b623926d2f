//! Page-number / page-size listing contract shared by every collection.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DomainError;

pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw query-string parameters (`?pageNumber=&pageSize=&includeDeleted=`).
///
/// Kept signed so that `pageNumber=0` or `pageSize=-5` reach validation and
/// produce an `InvalidInput` envelope instead of a query rejection.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default)]
    pub include_deleted: bool,
}

fn default_page_number() -> i64 {
    DEFAULT_PAGE_NUMBER
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            include_deleted: false,
        }
    }
}

impl PageQuery {
    pub fn to_request(self) -> Result<PageRequest, DomainError> {
        PageRequest::new(self.page_number, self.page_size)
    }
}

/// Validated page coordinates (both >= 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u64,
    size: u64,
}

impl PageRequest {
    pub fn new(page_number: i64, page_size: i64) -> Result<Self, DomainError> {
        if page_number < 1 || page_size < 1 {
            return Err(DomainError::invalid(
                "Page number and page size must be greater than 0",
            ));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(DomainError::invalid_field(
                "pageSize",
                format!("Page size must not exceed {}", MAX_PAGE_SIZE),
            ));
        }
        Ok(Self {
            number: page_number as u64,
            size: page_size as u64,
        })
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Zero-based page index, as expected by the store paginator.
    pub fn index(&self) -> u64 {
        self.number - 1
    }

    /// Rows skipped before this page, or `None` when that does not fit the
    /// store's signed 64-bit offset.
    pub fn offset(&self) -> Option<u64> {
        self.index()
            .checked_mul(self.size)
            .filter(|offset| *offset <= i64::MAX as u64)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total_count: u64,
    pub page_number: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl PaginationMeta {
    pub fn new(total_count: u64, request: PageRequest) -> Self {
        let total_pages = total_count.div_ceil(request.size);
        Self {
            total_count,
            page_number: request.number,
            page_size: request.size,
            total_pages,
            has_previous_page: request.number > 1,
            has_next_page: request.number < total_pages,
        }
    }
}

/// One page of items plus the totals used to render the envelope.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Self {
            items,
            meta: PaginationMeta::new(total_count, request),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_coordinates() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(-3, 5).is_err());
        assert!(PageRequest::new(1, 1).is_ok());
    }

    #[test]
    fn total_pages_rounds_up() {
        let meta = PaginationMeta::new(21, PageRequest::new(1, 10).unwrap());
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_previous_page);
        assert!(meta.has_next_page);

        let meta = PaginationMeta::new(20, PageRequest::new(2, 10).unwrap());
        assert_eq!(meta.total_pages, 2);
        assert!(meta.has_previous_page);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn empty_collection_has_no_pages() {
        let meta = PaginationMeta::new(0, PageRequest::new(1, 10).unwrap());
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_previous_page);
    }

    #[test]
    fn page_past_the_end_reports_previous_only() {
        let meta = PaginationMeta::new(5, PageRequest::new(4, 2).unwrap());
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_previous_page);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn page_size_is_capped() {
        assert!(PageRequest::new(1, MAX_PAGE_SIZE).is_ok());
        match PageRequest::new(1, MAX_PAGE_SIZE + 1) {
            Err(DomainError::Validation { errors, .. }) => assert!(errors.contains_key("pageSize")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn huge_page_number_has_no_offset() {
        assert_eq!(PageRequest::new(i64::MAX, 10).unwrap().offset(), None);
        assert_eq!(PageRequest::new(3, 25).unwrap().offset(), Some(50));
    }

    #[test]
    fn index_is_zero_based() {
        assert_eq!(PageRequest::new(3, 25).unwrap().index(), 2);
    }
}
