//! Handlers for the `/users` resource (admin only).

use axum::extract::{Query, State};
use axum::Json;
use coursehub_core::pagination::PageRequest;
use coursehub_core::roles::validate_role;
use coursehub_db::models::user::UserResponse;
use coursehub_db::repositories::UserRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::lenient_i64;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

/// Query parameters for `GET /users`.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
    pub role: Option<String>,
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Page<UserResponse>>>> {
    let page = PageRequest::from_params(params.page, params.limit)?;
    if let Some(role) = params.role.as_deref() {
        validate_role(role).map_err(AppError::validation)?;
    }
    let role = params.role.as_deref();

    let users = UserRepo::list(&state.pool, role, page.limit, page.offset()).await?;
    let total = UserRepo::count(&state.pool, role).await?;

    Ok(Json(DataResponse {
        data: Page {
            items: users.into_iter().map(UserResponse::from).collect(),
            pagination: page.with_total(total),
        },
    }))
}
