//! Handlers for enrollments.
//!
//! Thin adapters: each extracts the caller as an [`Actor`](coursehub_core::actor::Actor)
//! and delegates to [`EnrollmentLifecycle`](crate::enrollment::EnrollmentLifecycle).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursehub_core::types::DbId;
use coursehub_db::models::enrollment::Enrollment;

use crate::enrollment::{CancellationOutcome, EnrollmentCreated, EnrollmentPage};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// POST /api/v1/courses/{course_id}/enroll
pub async fn enroll(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<MessageResponse<EnrollmentCreated>>)> {
    let created = state
        .enrollments()
        .create_enrollment(&user.actor(), course_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Enrollment created. Awaiting payment.".into(),
            data: created,
        }),
    ))
}

/// GET /api/v1/me/enrollments
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<EnrollmentPage>>> {
    let page = params.to_page_request()?;
    let enrollments = state
        .enrollments()
        .list_my_enrollments(&user.actor(), page)
        .await?;
    Ok(Json(DataResponse { data: enrollments }))
}

/// POST /api/v1/enrollments/{id}/confirm-payment
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse<Enrollment>>> {
    let enrollment = state
        .enrollments()
        .confirm_payment(&user.actor(), id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Payment confirmed. Enrollment is now active.".into(),
        data: enrollment,
    }))
}

/// DELETE /api/v1/enrollments/{id}
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse<CancellationOutcome>>> {
    let outcome = state
        .enrollments()
        .cancel_enrollment(&user.actor(), id)
        .await?;
    Ok(Json(MessageResponse {
        message: outcome.message().into(),
        data: outcome,
    }))
}
