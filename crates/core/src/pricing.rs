//! Enrollment pricing and the progressive loyalty discount.
//!
//! A student who already holds [`LOYALTY_DISCOUNT_THRESHOLD`] enrollments that
//! are both active and paid gets [`LOYALTY_DISCOUNT_PERCENT`] off every further
//! course. All amounts are integer minor units; the discounted price is
//! rounded half-up to the nearest unit.

use serde::Serialize;

use crate::types::Cents;

/// Number of prior active+paid enrollments required before the discount applies.
pub const LOYALTY_DISCOUNT_THRESHOLD: i64 = 3;

/// Discount granted once the threshold is reached.
pub const LOYALTY_DISCOUNT_PERCENT: i16 = 30;

/// Outcome of pricing one enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pricing {
    pub original_price: Cents,
    pub price_paid: Cents,
    pub discount_applied: bool,
    pub discount_percentage: i16,
}

/// Price an enrollment given the course's base price and how many active,
/// paid enrollments the student already has.
pub fn compute_price(original_price: Cents, prior_paid_active_count: i64) -> Pricing {
    if prior_paid_active_count >= LOYALTY_DISCOUNT_THRESHOLD {
        Pricing {
            original_price,
            price_paid: apply_percent_discount(original_price, LOYALTY_DISCOUNT_PERCENT),
            discount_applied: true,
            discount_percentage: LOYALTY_DISCOUNT_PERCENT,
        }
    } else {
        Pricing {
            original_price,
            price_paid: original_price,
            discount_applied: false,
            discount_percentage: 0,
        }
    }
}

/// Take `percent` off `amount`, rounding half-up.
///
/// `amount` must be non-negative; `percent` is clamped to `0..=100`. The
/// product is taken in `i128`, so any `Cents` value is accepted and the result
/// never exceeds `amount`.
pub fn apply_percent_discount(amount: Cents, percent: i16) -> Cents {
    let keep = 100 - i128::from(percent.clamp(0, 100));
    let discounted = (i128::from(amount) * keep + 50) / 100;
    Cents::try_from(discounted).unwrap_or(amount)
}
