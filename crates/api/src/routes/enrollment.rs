//! Route definitions for enrollments.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::enrollment;
use crate::state::AppState;

/// Routes mounted at `/enrollments`.
///
/// ```text
/// POST   /{id}/confirm-payment   -> confirm_payment (owner or admin)
/// DELETE /{id}                   -> cancel (owner or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/confirm-payment", post(enrollment::confirm_payment))
        .route("/{id}", delete(enrollment::cancel))
}

/// Routes mounted at `/me`.
///
/// ```text
/// GET /enrollments   -> list_mine (requires auth)
/// ```
pub fn me_router() -> Router<AppState> {
    Router::new().route("/enrollments", get(enrollment::list_mine))
}
