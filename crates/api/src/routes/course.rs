//! Route definitions for the `/courses` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{course, enrollment};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                     -> list (public)
/// POST   /                     -> create (admin)
/// GET    /{id}                 -> get_by_id (public)
/// PATCH  /{id}                 -> update (admin)
/// DELETE /{id}                 -> delete (admin)
/// POST   /{id}/enroll          -> enrollment::enroll (student)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(course::list).post(course::create))
        .route(
            "/{id}",
            get(course::get_by_id)
                .patch(course::update)
                .delete(course::delete),
        )
        .route("/{id}/enroll", post(enrollment::enroll))
}
