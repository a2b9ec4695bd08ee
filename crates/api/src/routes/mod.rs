pub mod auth;
pub mod course;
pub mod enrollment;
pub mod health;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public)
/// /auth/me                             current user (requires auth)
///
/// /users                               list (admin only)
///
/// /courses                             list (public), create (admin)
/// /courses/{id}                        get (public), update, delete (admin)
/// /courses/{course_id}/enroll          enroll (student)
///
/// /me/enrollments                      own enrollments (requires auth)
///
/// /enrollments/{id}/confirm-payment    confirm payment (owner or admin)
/// /enrollments/{id}                    cancel (owner or admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", user::router())
        .nest("/courses", course::router())
        .nest("/me", enrollment::me_router())
        .nest("/enrollments", enrollment::router())
}
