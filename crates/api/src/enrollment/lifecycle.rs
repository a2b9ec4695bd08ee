//! Enrollment lifecycle rules.
//!
//! ```text
//! create ──► pending/pending ──confirm──► active/paid ──cancel──► cancelled/refunded
//!                  │
//!                  └──cancel──► (deleted)
//! ```
//!
//! Every operation takes the acting [`Actor`] explicitly. Writes that depend
//! on the current payment status are conditional on the status read a moment
//! earlier; if the row moved in between, the operation re-reads and reports
//! what it found instead of acting on stale state.

use coursehub_core::actor::Actor;
use coursehub_core::error::CoreError;
use coursehub_core::pagination::{PageRequest, Pagination};
use coursehub_core::pricing::{compute_price, Pricing};
use coursehub_core::types::DbId;
use coursehub_db::models::enrollment::{CreateEnrollment, Enrollment};
use coursehub_db::models::status::{CourseStatus, PaymentStatus};
use serde::Serialize;

use super::store::{EnrollmentStore, InsertOutcome};
use crate::error::{AppError, AppResult};

const ALREADY_ENROLLED: &str = "You are already enrolled in this course";
const ALREADY_PAID: &str = "This enrollment has already been paid";
const AWAITING_PAYMENT_NOTE: &str = "The enrollment will be activated once payment is confirmed";

/// Result of a successful enrollment.
#[derive(Debug, Serialize)]
pub struct EnrollmentCreated {
    pub enrollment: Enrollment,
    pub pricing: Pricing,
    pub payment_status: PaymentStatus,
    pub note: &'static str,
}

/// What cancelling an enrollment did.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CancellationOutcome {
    /// The enrollment was never paid and has been removed.
    Deleted { enrollment_id: DbId },
    /// The enrollment was paid; it is kept as `cancelled/refunded`.
    CancelledRefunded { enrollment: Enrollment },
}

impl CancellationOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            CancellationOutcome::Deleted { .. } => "Enrollment cancelled",
            CancellationOutcome::CancelledRefunded { .. } => {
                "Enrollment cancelled. Refund recorded."
            }
        }
    }
}

/// One page of a student's enrollments.
#[derive(Debug, Serialize)]
pub struct EnrollmentPage {
    pub items: Vec<Enrollment>,
    pub pagination: Pagination,
}

/// Enrollment lifecycle controller over an injected store.
pub struct EnrollmentLifecycle<S> {
    store: S,
}

impl<S: EnrollmentStore> EnrollmentLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Enroll `actor` in `course_id` as a pending, priced enrollment.
    ///
    /// Fails with `Forbidden` unless the actor is a student, `NotFound` if the
    /// course does not exist or is not published, and `Conflict` if the
    /// student already has an enrollment for it.
    pub async fn create_enrollment(
        &self,
        actor: &Actor,
        course_id: DbId,
    ) -> AppResult<EnrollmentCreated> {
        if !actor.is_student() {
            return Err(CoreError::Forbidden("Only students can enroll in courses".into()).into());
        }

        let course = self
            .store
            .find_course(course_id)
            .await?
            .filter(|c| c.status == CourseStatus::Published)
            .ok_or(CoreError::NotFound {
                entity: "Course",
                id: course_id,
            })?;

        if self
            .store
            .find_by_student_and_course(actor.user_id, course_id)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(ALREADY_ENROLLED.into()).into());
        }

        // Always counted fresh: it decides how much the student is charged.
        let prior_paid = self.store.count_paid_active(actor.user_id).await?;
        let input = CreateEnrollment {
            student_id: actor.user_id,
            course_id,
            pricing: compute_price(course.price, prior_paid),
        };
        let enrollment = match self.store.insert(&input).await? {
            InsertOutcome::Created(enrollment) => enrollment,
            InsertOutcome::Duplicate => {
                return Err(CoreError::Conflict(ALREADY_ENROLLED.into()).into());
            }
        };
        // Report what was stored, not what was requested.
        let pricing = enrollment.pricing();

        tracing::info!(
            enrollment_id = enrollment.id,
            student_id = actor.user_id,
            course_id,
            prior_paid,
            price_paid = pricing.price_paid,
            discount_percentage = pricing.discount_percentage,
            "Enrollment created, awaiting payment"
        );

        Ok(EnrollmentCreated {
            payment_status: enrollment.payment_status,
            enrollment,
            pricing,
            note: AWAITING_PAYMENT_NOTE,
        })
    }

    /// Record payment for an enrollment and activate it.
    ///
    /// Only the owning student or an admin may confirm. Confirming an
    /// enrollment that is already paid fails with `Conflict` and changes
    /// nothing.
    pub async fn confirm_payment(&self, actor: &Actor, enrollment_id: DbId) -> AppResult<Enrollment> {
        let enrollment = self.load(enrollment_id).await?;
        actor.ensure_can_manage(
            enrollment.student_id,
            "confirm payment for this enrollment",
        )?;

        if enrollment.is_paid() {
            return Err(CoreError::Conflict(ALREADY_PAID.into()).into());
        }

        match self
            .store
            .mark_paid(enrollment_id, enrollment.payment_status)
            .await?
        {
            Some(updated) => {
                tracing::info!(
                    enrollment_id,
                    actor_id = actor.user_id,
                    "Payment confirmed, enrollment activated"
                );
                Ok(updated)
            }
            None => Err(self.stale_write_error(enrollment_id).await),
        }
    }

    /// Cancel an enrollment.
    ///
    /// A paid enrollment is kept and marked `cancelled/refunded`; an unpaid
    /// one is deleted. Only the owning student or an admin may cancel.
    pub async fn cancel_enrollment(
        &self,
        actor: &Actor,
        enrollment_id: DbId,
    ) -> AppResult<CancellationOutcome> {
        let enrollment = self.load(enrollment_id).await?;
        actor.ensure_can_manage(enrollment.student_id, "cancel this enrollment")?;

        let outcome = if enrollment.is_paid() {
            match self.store.mark_refunded(enrollment_id).await? {
                Some(updated) => CancellationOutcome::CancelledRefunded {
                    enrollment: updated,
                },
                None => return Err(self.stale_write_error(enrollment_id).await),
            }
        } else {
            let deleted = self
                .store
                .delete_if_payment_status(enrollment_id, enrollment.payment_status)
                .await?;
            if !deleted {
                return Err(self.stale_write_error(enrollment_id).await);
            }
            CancellationOutcome::Deleted { enrollment_id }
        };

        tracing::info!(
            enrollment_id,
            actor_id = actor.user_id,
            refunded = matches!(outcome, CancellationOutcome::CancelledRefunded { .. }),
            "Enrollment cancelled"
        );
        Ok(outcome)
    }

    /// List the actor's own enrollments, newest first.
    pub async fn list_my_enrollments(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> AppResult<EnrollmentPage> {
        let items = self
            .store
            .list_for_student(actor.user_id, page.limit, page.offset())
            .await?;
        let total = self.store.count_for_student(actor.user_id).await?;
        Ok(EnrollmentPage {
            items,
            pagination: page.with_total(total),
        })
    }

    async fn load(&self, enrollment_id: DbId) -> AppResult<Enrollment> {
        self.store
            .find_enrollment(enrollment_id)
            .await?
            .ok_or_else(|| enrollment_not_found(enrollment_id))
    }

    /// A conditional write matched nothing: work out why from the persisted row.
    async fn stale_write_error(&self, enrollment_id: DbId) -> AppError {
        match self.store.find_enrollment(enrollment_id).await {
            Ok(None) => enrollment_not_found(enrollment_id),
            Ok(Some(current)) => {
                tracing::warn!(
                    enrollment_id,
                    status = %current.status,
                    payment_status = %current.payment_status,
                    "Enrollment changed concurrently"
                );
                CoreError::Conflict(format!(
                    "Enrollment {enrollment_id} was modified concurrently (now {}/{})",
                    current.status, current.payment_status
                ))
                .into()
            }
            Err(err) => err.into(),
        }
    }
}

fn enrollment_not_found(id: DbId) -> AppError {
    CoreError::NotFound {
        entity: "Enrollment",
        id,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use coursehub_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
    use coursehub_db::models::status::EnrollmentStatus;

    use super::*;
    use crate::enrollment::memory::InMemoryEnrollmentStore;

    const COURSE: DbId = 100;
    const PRICE: i64 = 10_000;

    fn student(id: DbId) -> Actor {
        Actor::new(id, ROLE_STUDENT)
    }

    fn admin() -> Actor {
        Actor::new(1, ROLE_ADMIN)
    }

    fn lifecycle_with_course() -> EnrollmentLifecycle<InMemoryEnrollmentStore> {
        let store = InMemoryEnrollmentStore::default();
        store.add_course(COURSE, PRICE, CourseStatus::Published);
        EnrollmentLifecycle::new(store)
    }

    /// Give `student_id` `n` active+paid enrollments in other courses.
    async fn give_paid_enrollments(
        lifecycle: &EnrollmentLifecycle<InMemoryEnrollmentStore>,
        student_id: DbId,
        n: i64,
    ) {
        for i in 0..n {
            let course_id = 1_000 + i;
            lifecycle
                .store
                .add_course(course_id, 5_000, CourseStatus::Published);
            let created = lifecycle
                .create_enrollment(&student(student_id), course_id)
                .await
                .unwrap();
            lifecycle
                .confirm_payment(&student(student_id), created.enrollment.id)
                .await
                .unwrap();
        }
    }

    // -- create ------------------------------------------------------------

    #[tokio::test]
    async fn first_enrollment_is_full_price_and_pending() {
        let lifecycle = lifecycle_with_course();

        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();

        let e = &created.enrollment;
        assert_eq!(e.student_id, 7);
        assert_eq!(e.course_id, COURSE);
        assert_eq!(e.status, EnrollmentStatus::Pending);
        assert_eq!(e.payment_status, PaymentStatus::Pending);
        assert_eq!(e.original_price, 10_000);
        assert_eq!(e.price_paid, 10_000);
        assert!(!e.discount_applied);
        assert_eq!(e.discount_percentage, 0);
        assert_eq!(created.pricing, e.pricing());
        assert_eq!(created.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn fourth_paid_course_is_discounted() {
        let lifecycle = lifecycle_with_course();
        give_paid_enrollments(&lifecycle, 7, 3).await;

        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();

        let e = &created.enrollment;
        assert_eq!(e.original_price, 10_000);
        assert_eq!(e.price_paid, 7_000);
        assert!(e.discount_applied);
        assert_eq!(e.discount_percentage, 30);
        assert_eq!(e.status, EnrollmentStatus::Pending);
        assert_eq!(e.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn two_paid_courses_are_not_enough_for_discount() {
        let lifecycle = lifecycle_with_course();
        give_paid_enrollments(&lifecycle, 7, 2).await;

        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();
        assert_eq!(created.enrollment.price_paid, PRICE);
        assert!(!created.enrollment.discount_applied);
    }

    #[tokio::test]
    async fn unpaid_and_refunded_enrollments_do_not_count_towards_discount() {
        let lifecycle = lifecycle_with_course();
        give_paid_enrollments(&lifecycle, 7, 2).await;

        // One pending enrollment and one refunded one.
        lifecycle.store.add_course(2_000, 5_000, CourseStatus::Published);
        lifecycle.store.add_course(2_001, 5_000, CourseStatus::Published);
        lifecycle.create_enrollment(&student(7), 2_000).await.unwrap();
        let refunded = lifecycle.create_enrollment(&student(7), 2_001).await.unwrap();
        lifecycle
            .confirm_payment(&student(7), refunded.enrollment.id)
            .await
            .unwrap();
        lifecycle
            .cancel_enrollment(&student(7), refunded.enrollment.id)
            .await
            .unwrap();

        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();
        assert!(!created.enrollment.discount_applied);
    }

    #[tokio::test]
    async fn other_students_history_does_not_affect_price() {
        let lifecycle = lifecycle_with_course();
        give_paid_enrollments(&lifecycle, 8, 3).await;

        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();
        assert_eq!(created.enrollment.price_paid, PRICE);
    }

    #[tokio::test]
    async fn missing_course_is_not_found() {
        let lifecycle = lifecycle_with_course();
        let result = lifecycle.create_enrollment(&student(7), 404).await;
        assert_matches!(
            result,
            Err(AppError::Core(CoreError::NotFound { entity: "Course", id: 404 }))
        );
    }

    #[tokio::test]
    async fn draft_course_is_not_found() {
        let lifecycle = lifecycle_with_course();
        lifecycle.store.add_course(55, 1_000, CourseStatus::Draft);
        let result = lifecycle.create_enrollment(&student(7), 55).await;
        assert_matches!(result, Err(AppError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn admin_cannot_enroll() {
        let lifecycle = lifecycle_with_course();
        let result = lifecycle.create_enrollment(&admin(), COURSE).await;
        assert_matches!(result, Err(AppError::Core(CoreError::Forbidden(_))));
    }

    #[tokio::test]
    async fn duplicate_enrollment_is_conflict() {
        let lifecycle = lifecycle_with_course();
        lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();

        let result = lifecycle.create_enrollment(&student(7), COURSE).await;

        assert_matches!(result, Err(AppError::Core(CoreError::Conflict(_))));
        assert_eq!(lifecycle.store.enrollment_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_detected_only_at_insert_is_conflict() {
        let lifecycle = lifecycle_with_course();
        lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();

        // Simulate the race window: the pre-check sees nothing, the insert
        // hits the uniqueness constraint.
        lifecycle.store.hide_existing_on_lookup();
        let result = lifecycle.create_enrollment(&student(7), COURSE).await;

        assert_matches!(result, Err(AppError::Core(CoreError::Conflict(_))));
        assert_eq!(lifecycle.store.enrollment_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_creates_produce_exactly_one_enrollment() {
        let lifecycle = lifecycle_with_course();
        lifecycle.store.hide_existing_on_lookup();
        let actor = student(7);

        let attempts = (0..8).map(|_| lifecycle.create_enrollment(&actor, COURSE));
        let results = futures::future::join_all(attempts).await;

        let created = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::Core(CoreError::Conflict(_)))))
            .count();
        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(lifecycle.store.enrollment_count(), 1);
    }

    // -- confirm -----------------------------------------------------------

    #[tokio::test]
    async fn confirm_activates_pending_enrollment() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();

        let paid = lifecycle
            .confirm_payment(&student(7), created.enrollment.id)
            .await
            .unwrap();

        assert_eq!(paid.status, EnrollmentStatus::Active);
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.price_paid, created.enrollment.price_paid);
    }

    #[tokio::test]
    async fn second_confirm_is_conflict_and_changes_nothing() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();
        let id = created.enrollment.id;
        let first = lifecycle.confirm_payment(&student(7), id).await.unwrap();

        let second = lifecycle.confirm_payment(&student(7), id).await;

        assert_matches!(second, Err(AppError::Core(CoreError::Conflict(msg))) if msg.contains("already been paid"));
        assert_eq!(lifecycle.store.get(id), Some(first));
    }

    #[tokio::test]
    async fn admin_can_confirm_any_enrollment() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();

        let paid = lifecycle
            .confirm_payment(&admin(), created.enrollment.id)
            .await
            .unwrap();
        assert_eq!(paid.status, EnrollmentStatus::Active);
    }

    #[tokio::test]
    async fn other_student_cannot_confirm() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();

        let result = lifecycle
            .confirm_payment(&student(8), created.enrollment.id)
            .await;

        assert_matches!(result, Err(AppError::Core(CoreError::Forbidden(_))));
        assert_eq!(
            lifecycle.store.get(created.enrollment.id).unwrap().payment_status,
            PaymentStatus::Pending
        );
    }

    #[tokio::test]
    async fn confirm_missing_enrollment_is_not_found() {
        let lifecycle = lifecycle_with_course();
        let result = lifecycle.confirm_payment(&admin(), 9_999).await;
        assert_matches!(
            result,
            Err(AppError::Core(CoreError::NotFound { entity: "Enrollment", id: 9_999 }))
        );
    }

    #[tokio::test]
    async fn confirm_on_stale_read_rechecks_persisted_state() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();
        let id = created.enrollment.id;

        // A concurrent confirm lands between our read and our write.
        lifecycle.store.force_paid(id);
        lifecycle.store.serve_stale_once(created.enrollment.clone());
        let result = lifecycle.confirm_payment(&student(7), id).await;

        assert_matches!(result, Err(AppError::Core(CoreError::Conflict(_))));
        assert_eq!(lifecycle.store.get(id).unwrap().payment_status, PaymentStatus::Paid);
    }

    // -- cancel ------------------------------------------------------------

    #[tokio::test]
    async fn cancelling_unpaid_enrollment_deletes_it() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();
        let id = created.enrollment.id;

        let outcome = lifecycle.cancel_enrollment(&student(7), id).await.unwrap();

        assert_matches!(outcome, CancellationOutcome::Deleted { enrollment_id } if enrollment_id == id);
        assert_eq!(lifecycle.store.get(id), None);
    }

    #[tokio::test]
    async fn cancelling_paid_enrollment_records_refund_and_keeps_row() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();
        let id = created.enrollment.id;
        lifecycle.confirm_payment(&student(7), id).await.unwrap();

        let outcome = lifecycle.cancel_enrollment(&student(7), id).await.unwrap();

        assert_eq!(outcome.message(), "Enrollment cancelled. Refund recorded.");
        assert_matches!(
            outcome,
            CancellationOutcome::CancelledRefunded { ref enrollment }
                if enrollment.status == EnrollmentStatus::Cancelled
                && enrollment.payment_status == PaymentStatus::Refunded
        );
        let stored = lifecycle.store.get(id).expect("paid enrollment must be retained");
        assert_eq!(stored.status, EnrollmentStatus::Cancelled);
        assert_eq!(stored.payment_status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn other_student_cannot_cancel() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();

        let result = lifecycle
            .cancel_enrollment(&student(8), created.enrollment.id)
            .await;

        assert_matches!(result, Err(AppError::Core(CoreError::Forbidden(_))));
        assert!(lifecycle.store.get(created.enrollment.id).is_some());
    }

    #[tokio::test]
    async fn admin_can_cancel_any_enrollment() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();

        let outcome = lifecycle
            .cancel_enrollment(&admin(), created.enrollment.id)
            .await
            .unwrap();
        assert_eq!(outcome.message(), "Enrollment cancelled");
    }

    #[tokio::test]
    async fn cancel_missing_enrollment_is_not_found() {
        let lifecycle = lifecycle_with_course();
        let result = lifecycle.cancel_enrollment(&student(7), 31).await;
        assert_matches!(result, Err(AppError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn cancel_does_not_delete_enrollment_paid_concurrently() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();
        let id = created.enrollment.id;

        // We read it as pending, but payment lands before our delete.
        lifecycle.store.force_paid(id);
        lifecycle.store.serve_stale_once(created.enrollment.clone());
        let result = lifecycle.cancel_enrollment(&student(7), id).await;

        assert_matches!(result, Err(AppError::Core(CoreError::Conflict(_))));
        let stored = lifecycle.store.get(id).expect("paid enrollment must survive");
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn cancel_of_concurrently_deleted_enrollment_is_not_found() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();
        let id = created.enrollment.id;

        lifecycle.store.remove(id);
        lifecycle.store.serve_stale_once(created.enrollment.clone());
        let result = lifecycle.cancel_enrollment(&student(7), id).await;

        assert_matches!(result, Err(AppError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn re_enrolling_after_unpaid_cancel_is_allowed() {
        let lifecycle = lifecycle_with_course();
        let created = lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();
        lifecycle
            .cancel_enrollment(&student(7), created.enrollment.id)
            .await
            .unwrap();

        assert!(lifecycle.create_enrollment(&student(7), COURSE).await.is_ok());
    }

    // -- list --------------------------------------------------------------

    #[tokio::test]
    async fn list_returns_only_own_enrollments_newest_first() {
        let lifecycle = lifecycle_with_course();
        let mut mine = Vec::new();
        for course_id in 200..205 {
            lifecycle.store.add_course(course_id, 1_000, CourseStatus::Published);
            let created = lifecycle.create_enrollment(&student(7), course_id).await.unwrap();
            mine.push(created.enrollment.id);
            lifecycle.create_enrollment(&student(8), course_id).await.unwrap();
        }

        let page = lifecycle
            .list_my_enrollments(&student(7), PageRequest { page: 1, limit: 2 })
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.pages, 3);
        let ids: Vec<DbId> = page.items.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![mine[4], mine[3]]);
        assert!(page.items.iter().all(|e| e.student_id == 7));
    }

    #[tokio::test]
    async fn list_past_last_page_is_empty() {
        let lifecycle = lifecycle_with_course();
        lifecycle.create_enrollment(&student(7), COURSE).await.unwrap();

        let page = lifecycle
            .list_my_enrollments(&student(7), PageRequest { page: 3, limit: 10 })
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.pagination.pages, 1);
    }
}
