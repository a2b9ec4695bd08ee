//! In-memory [`EnrollmentStore`] for lifecycle tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use coursehub_core::types::{Cents, DbId};
use coursehub_db::models::enrollment::{CreateEnrollment, Enrollment};
use coursehub_db::models::status::{CourseStatus, EnrollmentStatus, PaymentStatus};

use super::store::{CourseSnapshot, EnrollmentStore, InsertOutcome};

#[derive(Default)]
struct State {
    courses: HashMap<DbId, CourseSnapshot>,
    enrollments: BTreeMap<DbId, Enrollment>,
    next_id: DbId,
    /// Returned by the next `find_enrollment` instead of the stored row.
    stale: Option<Enrollment>,
    hide_existing: bool,
}

/// Mirrors the Postgres store's guarantees: the (student, course) pair is
/// unique at insert time and status writes are conditional.
#[derive(Default)]
pub struct InMemoryEnrollmentStore {
    state: Mutex<State>,
}

impl InMemoryEnrollmentStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_course(&self, id: DbId, price: Cents, status: CourseStatus) {
        self.lock()
            .courses
            .insert(id, CourseSnapshot { id, price, status });
    }

    pub fn get(&self, id: DbId) -> Option<Enrollment> {
        self.lock().enrollments.get(&id).cloned()
    }

    pub fn enrollment_count(&self) -> usize {
        self.lock().enrollments.len()
    }

    pub fn remove(&self, id: DbId) {
        self.lock().enrollments.remove(&id);
    }

    /// Mark an enrollment paid behind the lifecycle's back.
    pub fn force_paid(&self, id: DbId) {
        if let Some(e) = self.lock().enrollments.get_mut(&id) {
            e.status = EnrollmentStatus::Active;
            e.payment_status = PaymentStatus::Paid;
        }
    }

    /// Make the next `find_enrollment` return `snapshot`.
    pub fn serve_stale_once(&self, snapshot: Enrollment) {
        self.lock().stale = Some(snapshot);
    }

    /// Make `find_by_student_and_course` always miss, so duplicates are only
    /// caught by `insert`.
    pub fn hide_existing_on_lookup(&self) {
        self.lock().hide_existing = true;
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn find_course(&self, course_id: DbId) -> Result<Option<CourseSnapshot>, sqlx::Error> {
        Ok(self.lock().courses.get(&course_id).copied())
    }

    async fn find_enrollment(&self, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let mut state = self.lock();
        if let Some(stale) = state.stale.take() {
            return Ok(Some(stale));
        }
        Ok(state.enrollments.get(&id).cloned())
    }

    async fn find_by_student_and_course(
        &self,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let state = self.lock();
        if state.hide_existing {
            return Ok(None);
        }
        Ok(state
            .enrollments
            .values()
            .find(|e| e.student_id == student_id && e.course_id == course_id)
            .cloned())
    }

    async fn count_paid_active(&self, student_id: DbId) -> Result<i64, sqlx::Error> {
        let count = self
            .lock()
            .enrollments
            .values()
            .filter(|e| {
                e.student_id == student_id
                    && e.status == EnrollmentStatus::Active
                    && e.payment_status == PaymentStatus::Paid
            })
            .count();
        Ok(count as i64)
    }

    async fn insert(&self, input: &CreateEnrollment) -> Result<InsertOutcome, sqlx::Error> {
        let mut state = self.lock();
        let taken = state
            .enrollments
            .values()
            .any(|e| e.student_id == input.student_id && e.course_id == input.course_id);
        if taken {
            return Ok(InsertOutcome::Duplicate);
        }

        state.next_id += 1;
        let now = Utc::now();
        let enrollment = Enrollment {
            id: state.next_id,
            student_id: input.student_id,
            course_id: input.course_id,
            status: EnrollmentStatus::Pending,
            payment_status: PaymentStatus::Pending,
            original_price: input.pricing.original_price,
            price_paid: input.pricing.price_paid,
            discount_applied: input.pricing.discount_applied,
            discount_percentage: input.pricing.discount_percentage,
            created_at: now,
            updated_at: now,
        };
        state.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(InsertOutcome::Created(enrollment))
    }

    async fn mark_paid(
        &self,
        id: DbId,
        expected: PaymentStatus,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let mut state = self.lock();
        Ok(state
            .enrollments
            .get_mut(&id)
            .filter(|e| e.payment_status == expected)
            .map(|e| {
                e.status = EnrollmentStatus::Active;
                e.payment_status = PaymentStatus::Paid;
                e.updated_at = Utc::now();
                e.clone()
            }))
    }

    async fn mark_refunded(&self, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let mut state = self.lock();
        Ok(state
            .enrollments
            .get_mut(&id)
            .filter(|e| e.payment_status == PaymentStatus::Paid)
            .map(|e| {
                e.status = EnrollmentStatus::Cancelled;
                e.payment_status = PaymentStatus::Refunded;
                e.updated_at = Utc::now();
                e.clone()
            }))
    }

    async fn delete_if_payment_status(
        &self,
        id: DbId,
        expected: PaymentStatus,
    ) -> Result<bool, sqlx::Error> {
        let mut state = self.lock();
        let matches = state
            .enrollments
            .get(&id)
            .is_some_and(|e| e.payment_status == expected);
        if matches {
            state.enrollments.remove(&id);
        }
        Ok(matches)
    }

    async fn list_for_student(
        &self,
        student_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Enrollment>, sqlx::Error> {
        let state = self.lock();
        let mut mine: Vec<Enrollment> = state
            .enrollments
            .values()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(mine
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_for_student(&self, student_id: DbId) -> Result<i64, sqlx::Error> {
        let count = self
            .lock()
            .enrollments
            .values()
            .filter(|e| e.student_id == student_id)
            .count();
        Ok(count as i64)
    }
}
