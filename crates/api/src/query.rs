//! Shared query parameter types for API handlers.

use coursehub_core::pagination::PageRequest;
use serde::{Deserialize, Deserializer};

use crate::error::AppResult;

/// Generic pagination parameters (`?page=&limit=`).
///
/// Missing or non-numeric values fall back to page 1 / limit 10. Limits above
/// the maximum are clamped; zero or negative values are rejected.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn to_page_request(&self) -> AppResult<PageRequest> {
        Ok(PageRequest::from_params(self.page, self.limit)?)
    }
}

/// Read a query value as an integer, treating anything unparseable as absent.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}
