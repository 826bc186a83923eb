//! Pagination utilities for list endpoints

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::validation::Validator;
use crate::error::ApiError;
use crate::services::PageRequest;

/// Pagination query parameters
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    pub page: Option<u32>,

    /// Items per page
    pub limit: Option<u32>,
}

impl PaginationParams {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 50;

    /// Out-of-range values are rejected rather than clamped.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.check(self.page.map_or(true, |p| p >= 1), "page", "Page must be a positive integer");
        v.check(
            self.limit.map_or(true, |l| (1..=Self::MAX_LIMIT).contains(&l)),
            "limit",
            "Limit must be between 1 and 50",
        );
        v.finish()
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }

    /// Computed in `i64`; any `u32` page times the max limit fits.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page()) - 1) * i64::from(self.limit())
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            limit: i64::from(self.limit()),
            offset: self.offset(),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total: i64) -> Self {
        let limit = params.limit();
        let page = params.page();
        let pages = (total.max(0) + i64::from(limit) - 1) / i64::from(limit);

        Self {
            page,
            limit,
            total,
            pages,
            has_next: i64::from(page) < pages,
            has_prev: page > 1,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params, total),
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, limit: Option<u32>) -> PaginationParams {
        PaginationParams { page, limit }
    }

    #[test]
    fn defaults_and_offsets() {
        let p = params(None, None);
        assert!(p.validate().is_ok());
        assert_eq!(p.page_request(), PageRequest { limit: 10, offset: 0 });

        let p = params(Some(3), Some(20));
        assert_eq!(p.page_request(), PageRequest { limit: 20, offset: 40 });
    }

    #[test]
    fn huge_page_offset_does_not_overflow() {
        let p = params(Some(100_000_000), Some(50));
        assert!(p.validate().is_ok());
        assert_eq!(p.page_request().offset, 4_999_999_950);

        let p = params(Some(u32::MAX), Some(50));
        assert_eq!(p.offset(), (i64::from(u32::MAX) - 1) * 50);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(params(Some(0), None).validate().is_err());
        assert!(params(None, Some(0)).validate().is_err());
        assert!(params(None, Some(51)).validate().is_err());
        assert!(params(Some(2), Some(50)).validate().is_ok());
    }

    #[test]
    fn meta_counts_pages() {
        let meta = PaginationMeta::new(&params(Some(2), Some(10)), 25);
        assert_eq!(meta.pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let empty = PaginationMeta::new(&params(None, None), 0);
        assert_eq!(empty.pages, 0);
        assert!(!empty.has_next);
    }
}
