//! Enrollment lifecycle: creation with pricing, payment confirmation, and
//! cancellation/refund.
//!
//! [`EnrollmentLifecycle`] holds the rules and is generic over an
//! [`EnrollmentStore`], so it runs the same against Postgres
//! ([`PgEnrollmentStore`]) and against the in-memory store used in tests.

pub mod lifecycle;
pub mod store;

#[cfg(test)]
mod memory;

pub use lifecycle::{CancellationOutcome, EnrollmentCreated, EnrollmentLifecycle, EnrollmentPage};
pub use store::{CourseSnapshot, EnrollmentStore, InsertOutcome, PgEnrollmentStore};
