//! Persistence seam for the enrollment lifecycle.

use async_trait::async_trait;
use coursehub_core::types::{Cents, DbId};
use coursehub_db::is_unique_violation;
use coursehub_db::models::enrollment::{CreateEnrollment, Enrollment};
use coursehub_db::models::status::{CourseStatus, PaymentStatus};
use coursehub_db::repositories::enrollment_repo::UQ_ENROLLMENTS_STUDENT_COURSE;
use coursehub_db::repositories::{CourseRepo, EnrollmentRepo};
use coursehub_db::DbPool;

/// The slice of a course the lifecycle needs: its price and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseSnapshot {
    pub id: DbId,
    pub price: Cents,
    pub status: CourseStatus,
}

/// Result of inserting an enrollment.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(Enrollment),
    /// The (student, course) pair already has an enrollment.
    Duplicate,
}

/// Storage operations the lifecycle depends on.
///
/// The (student, course) uniqueness must be enforced atomically by
/// [`insert`](Self::insert). State-changing methods are conditional on the
/// payment status the caller last observed and report a miss rather than
/// overwriting newer state.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn find_course(&self, course_id: DbId) -> Result<Option<CourseSnapshot>, sqlx::Error>;

    async fn find_enrollment(&self, id: DbId) -> Result<Option<Enrollment>, sqlx::Error>;

    async fn find_by_student_and_course(
        &self,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error>;

    async fn count_paid_active(&self, student_id: DbId) -> Result<i64, sqlx::Error>;

    async fn insert(&self, input: &CreateEnrollment) -> Result<InsertOutcome, sqlx::Error>;

    async fn mark_paid(
        &self,
        id: DbId,
        expected: PaymentStatus,
    ) -> Result<Option<Enrollment>, sqlx::Error>;

    async fn mark_refunded(&self, id: DbId) -> Result<Option<Enrollment>, sqlx::Error>;

    async fn delete_if_payment_status(
        &self,
        id: DbId,
        expected: PaymentStatus,
    ) -> Result<bool, sqlx::Error>;

    async fn list_for_student(
        &self,
        student_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Enrollment>, sqlx::Error>;

    async fn count_for_student(&self, student_id: DbId) -> Result<i64, sqlx::Error>;
}

/// [`EnrollmentStore`] backed by the Postgres repositories.
#[derive(Clone)]
pub struct PgEnrollmentStore {
    pool: DbPool,
}

impl PgEnrollmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentStore {
    async fn find_course(&self, course_id: DbId) -> Result<Option<CourseSnapshot>, sqlx::Error> {
        let course = CourseRepo::find_by_id(&self.pool, course_id).await?;
        Ok(course.map(|c| CourseSnapshot {
            id: c.id,
            price: c.price,
            status: c.status,
        }))
    }

    async fn find_enrollment(&self, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        EnrollmentRepo::find_by_id(&self.pool, id).await
    }

    async fn find_by_student_and_course(
        &self,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        EnrollmentRepo::find_by_student_and_course(&self.pool, student_id, course_id).await
    }

    async fn count_paid_active(&self, student_id: DbId) -> Result<i64, sqlx::Error> {
        EnrollmentRepo::count_paid_active_for_student(&self.pool, student_id).await
    }

    async fn insert(&self, input: &CreateEnrollment) -> Result<InsertOutcome, sqlx::Error> {
        match EnrollmentRepo::create(&self.pool, input).await {
            Ok(enrollment) => Ok(InsertOutcome::Created(enrollment)),
            Err(err) if is_unique_violation(&err, UQ_ENROLLMENTS_STUDENT_COURSE) => {
                Ok(InsertOutcome::Duplicate)
            }
            Err(err) => Err(err),
        }
    }

    async fn mark_paid(
        &self,
        id: DbId,
        expected: PaymentStatus,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        EnrollmentRepo::mark_paid(&self.pool, id, expected).await
    }

    async fn mark_refunded(&self, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        EnrollmentRepo::mark_refunded(&self.pool, id).await
    }

    async fn delete_if_payment_status(
        &self,
        id: DbId,
        expected: PaymentStatus,
    ) -> Result<bool, sqlx::Error> {
        EnrollmentRepo::delete_if_payment_status(&self.pool, id, expected).await
    }

    async fn list_for_student(
        &self,
        student_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Enrollment>, sqlx::Error> {
        EnrollmentRepo::list_for_student(&self.pool, student_id, limit, offset).await
    }

    async fn count_for_student(&self, student_id: DbId) -> Result<i64, sqlx::Error> {
        EnrollmentRepo::count_for_student(&self.pool, student_id).await
    }
}
