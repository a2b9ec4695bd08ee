//! Course entity model and DTOs.

use coursehub_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::status::CourseStatus;

/// A course row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[sqlx(rename = "status_id")]
    pub status: CourseStatus,
    pub instructor_id: Option<DbId>,
    /// Base price in minor currency units.
    pub price: Cents,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }
}

/// DTO for creating a new course.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    pub category: String,
    /// Defaults to `draft` if omitted.
    pub status: Option<CourseStatus>,
    pub instructor_id: Option<DbId>,
    pub price: Cents,
}

/// DTO for updating an existing course. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<CourseStatus>,
    pub instructor_id: Option<DbId>,
    pub price: Option<Cents>,
}

/// Filters applied when listing courses.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub category: Option<String>,
}

/// Sort orders accepted by the course listing, keyed by their query-string
/// spelling. A leading `-` means descending.
const SORT_ORDERS: &[(&str, &str)] = &[
    ("createdAt", "created_at ASC"),
    ("-createdAt", "created_at DESC"),
    ("title", "title ASC"),
    ("-title", "title DESC"),
    ("price", "price ASC"),
    ("-price", "price DESC"),
];

/// Newest first.
pub const DEFAULT_COURSE_ORDER: &str = "created_at DESC";

/// Resolve a `sort` query value into an `ORDER BY` clause.
///
/// Only whitelisted orders are accepted so the clause can be interpolated
/// into SQL safely.
pub fn resolve_course_order(sort: Option<&str>) -> Result<&'static str, String> {
    let Some(sort) = sort else {
        return Ok(DEFAULT_COURSE_ORDER);
    };
    SORT_ORDERS
        .iter()
        .find(|(key, _)| *key == sort)
        .map(|(_, clause)| *clause)
        .ok_or_else(|| {
            let keys: Vec<&str> = SORT_ORDERS.iter().map(|(k, _)| *k).collect();
            format!("Invalid sort '{sort}'. Must be one of: {}", keys.join(", "))
        })
}
