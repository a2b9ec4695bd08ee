//! Repository for the `enrollments` table.
//!
//! State-changing methods are conditional writes: each one names the payment
//! status it expects to find and matches no row if the persisted state has
//! moved on. Callers re-read to find out why.

use coursehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::{CreateEnrollment, Enrollment};
use crate::models::status::{EnrollmentStatus, PaymentStatus};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, student_id, course_id, status_id, payment_status_id, original_price, \
                       price_paid, discount_applied, discount_percentage, created_at, updated_at";

/// Unique constraint on `(student_id, course_id)`.
pub const UQ_ENROLLMENTS_STUDENT_COURSE: &str = "uq_enrollments_student_course";

/// Provides lifecycle operations for enrollments.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Insert a new `pending/pending` enrollment, returning the created row.
    ///
    /// A second insert for the same (student, course) fails with a unique
    /// violation on [`UQ_ENROLLMENTS_STUDENT_COURSE`].
    pub async fn create(
        pool: &PgPool,
        input: &CreateEnrollment,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments
                (student_id, course_id, status_id, payment_status_id,
                 original_price, price_paid, discount_applied, discount_percentage)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(input.student_id)
            .bind(input.course_id)
            .bind(EnrollmentStatus::Pending)
            .bind(PaymentStatus::Pending)
            .bind(input.pricing.original_price)
            .bind(input.pricing.price_paid)
            .bind(input.pricing.discount_applied)
            .bind(input.pricing.discount_percentage)
            .fetch_one(pool)
            .await
    }

    /// Find an enrollment by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the enrollment for a (student, course) pair, if any.
    pub async fn find_by_student_and_course(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM enrollments WHERE student_id = $1 AND course_id = $2");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Count a student's enrollments that are both active and paid.
    pub async fn count_paid_active_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments
             WHERE student_id = $1 AND status_id = $2 AND payment_status_id = $3",
        )
        .bind(student_id)
        .bind(EnrollmentStatus::Active)
        .bind(PaymentStatus::Paid)
        .fetch_one(pool)
        .await
    }

    /// List a student's enrollments, newest first.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enrollments
             WHERE student_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count all of a student's enrollments.
    pub async fn count_for_student(pool: &PgPool, student_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE student_id = $1")
            .bind(student_id)
            .fetch_one(pool)
            .await
    }

    /// Mark an enrollment `active/paid` if its payment status is still
    /// `expected`.
    ///
    /// Returns `None` when no row matched (missing, or state changed).
    pub async fn mark_paid(
        pool: &PgPool,
        id: DbId,
        expected: PaymentStatus,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET status_id = $3, payment_status_id = $4
             WHERE id = $1 AND payment_status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(expected)
            .bind(EnrollmentStatus::Active)
            .bind(PaymentStatus::Paid)
            .fetch_optional(pool)
            .await
    }

    /// Mark a paid enrollment `cancelled/refunded`.
    ///
    /// Returns `None` when no paid row with this ID exists.
    pub async fn mark_refunded(pool: &PgPool, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET status_id = $3, payment_status_id = $4
             WHERE id = $1 AND payment_status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(PaymentStatus::Paid)
            .bind(EnrollmentStatus::Cancelled)
            .bind(PaymentStatus::Refunded)
            .fetch_optional(pool)
            .await
    }

    /// Delete an enrollment if its payment status is still `expected`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_if_payment_status(
        pool: &PgPool,
        id: DbId,
        expected: PaymentStatus,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM enrollments WHERE id = $1 AND payment_status_id = $2")
                .bind(id)
                .bind(expected)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
