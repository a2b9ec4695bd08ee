//! Page/limit pagination used by every list endpoint.
//!
//! Requests carry a 1-based `page` and a `limit`; responses echo them back
//! together with the total row count and the number of pages.

use serde::Serialize;
use validator::Validate;

use crate::error::CoreError;
use crate::validation::format_validation_errors;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Validate)]
pub struct PageRequest {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: i64,
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a page request from optional query values, filling in defaults.
    ///
    /// A `limit` above [`MAX_LIMIT`] is clamped, and the clamped value is what
    /// the response reports.
    pub fn from_params(page: Option<i64>, limit: Option<i64>) -> Result<Self, CoreError> {
        let request = Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            limit: limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        };
        request
            .validate()
            .map_err(|e| CoreError::Validation(format_validation_errors(&e)))?;
        Ok(request)
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Attach a total count, producing the response metadata.
    pub fn with_total(&self, total: i64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            pages: page_count(total, self.limit),
        }
    }
}

/// Pagination metadata returned alongside a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

/// `ceil(total / limit)`; zero rows means zero pages.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
