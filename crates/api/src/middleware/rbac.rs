//! Role gate for admin-only course and user management routes.
//!
//! Ownership checks on enrollments are not done here; they need the row and
//! live in the enrollment lifecycle via [`Actor`](coursehub_core::actor::Actor).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use coursehub_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated caller holding the `admin` role; anyone else gets 403.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.actor().is_admin() {
            return Err(CoreError::Forbidden("Only admins can manage courses and users".into()).into());
        }
        Ok(RequireAdmin(user))
    }
}
