//! Enrollment entity model and DTOs.
//!
//! One row per (student, course). Pricing fields are a snapshot taken when
//! the enrollment is created and never change afterwards; only the two
//! status columns move.

use coursehub_core::pricing::Pricing;
use coursehub_core::types::{Cents, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::status::{EnrollmentStatus, PaymentStatus};

/// An enrollment row from the `enrollments` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    #[sqlx(rename = "status_id")]
    pub status: EnrollmentStatus,
    #[sqlx(rename = "payment_status_id")]
    pub payment_status: PaymentStatus,
    pub original_price: Cents,
    pub price_paid: Cents,
    pub discount_applied: bool,
    pub discount_percentage: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Enrollment {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// The pricing snapshot stored on this enrollment.
    pub fn pricing(&self) -> Pricing {
        Pricing {
            original_price: self.original_price,
            price_paid: self.price_paid,
            discount_applied: self.discount_applied,
            discount_percentage: self.discount_percentage,
        }
    }
}

/// DTO for inserting a new enrollment. Always starts `pending/pending`.
#[derive(Debug, Clone)]
pub struct CreateEnrollment {
    pub student_id: DbId,
    pub course_id: DbId,
    pub pricing: Pricing,
}
