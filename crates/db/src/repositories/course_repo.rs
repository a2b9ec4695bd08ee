//! Repository for the `courses` table.

use coursehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CourseFilter, CreateCourse, UpdateCourse};
use crate::models::status::CourseStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, category, status_id, instructor_id, price, \
                       created_at, updated_at";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    ///
    /// If `status` is `None` in the input, defaults to `draft`.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (title, description, category, status_id, instructor_id, price)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.status.unwrap_or(CourseStatus::Draft))
            .bind(input.instructor_id)
            .bind(input.price)
            .fetch_one(pool)
            .await
    }

    /// Find a course by its internal ID, regardless of status.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List courses matching `filter`.
    ///
    /// `order_by` must come from
    /// [`resolve_course_order`](crate::models::course::resolve_course_order);
    /// it is interpolated, not bound.
    pub async fn list(
        pool: &PgPool,
        filter: &CourseFilter,
        order_by: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses
             WHERE ($1::SMALLINT IS NULL OR status_id = $1)
               AND ($2::TEXT IS NULL OR category = $2)
             ORDER BY {order_by}, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(filter.status)
            .bind(&filter.category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count courses matching `filter`.
    pub async fn count(pool: &PgPool, filter: &CourseFilter) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM courses
             WHERE ($1::SMALLINT IS NULL OR status_id = $1)
               AND ($2::TEXT IS NULL OR category = $2)",
        )
        .bind(filter.status)
        .bind(&filter.category)
        .fetch_one(pool)
        .await
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                status_id = COALESCE($5, status_id),
                instructor_id = COALESCE($6, instructor_id),
                price = COALESCE($7, price)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.status)
            .bind(input.instructor_id)
            .bind(input.price)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a course by ID. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign-key violation while enrollments reference the course.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
