//! Handlers for the `/courses` resource.
//!
//! Reads are public; anonymous users and students only ever see published
//! courses. Writes require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursehub_core::error::CoreError;
use coursehub_core::pagination::PageRequest;
use coursehub_core::types::DbId;
use coursehub_core::validation::{validate_price, validate_required};
use coursehub_db::is_foreign_key_violation;
use coursehub_db::models::course::{
    resolve_course_order, Course, CourseFilter, CreateCourse, UpdateCourse,
};
use coursehub_db::models::status::CourseStatus;
use coursehub_db::repositories::CourseRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::lenient_i64;
use crate::response::{DataResponse, MessageResponse, Page};
use crate::state::AppState;

/// Query parameters for `GET /courses`.
#[derive(Debug, Deserialize)]
pub struct CourseListParams {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
    pub category: Option<String>,
    /// Admin-only; ignored for everyone else.
    pub status: Option<String>,
    pub sort: Option<String>,
}

/// GET /api/v1/courses
pub async fn list(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Query(params): Query<CourseListParams>,
) -> AppResult<Json<DataResponse<Page<Course>>>> {
    let page = PageRequest::from_params(params.page, params.limit)?;
    let order_by = resolve_course_order(params.sort.as_deref()).map_err(AppError::validation)?;

    let status = if viewer.is_admin() {
        params
            .status
            .as_deref()
            .map(parse_course_status)
            .transpose()?
    } else {
        Some(CourseStatus::Published)
    };
    let filter = CourseFilter {
        status,
        category: params.category.filter(|c| !c.trim().is_empty()),
    };

    let items = CourseRepo::list(&state.pool, &filter, order_by, page.limit, page.offset()).await?;
    let total = CourseRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            pagination: page.with_total(total),
        },
    }))
}

/// GET /api/v1/courses/{id}
///
/// Drafts are reported as missing to non-admins.
pub async fn get_by_id(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Course>>> {
    let course = CourseRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|c| c.is_published() || viewer.is_admin())
        .ok_or_else(|| course_not_found(id))?;
    Ok(Json(DataResponse { data: course }))
}

/// POST /api/v1/courses
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(mut input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    validate_required("title", &input.title)
        .and_then(|_| validate_required("description", &input.description))
        .and_then(|_| validate_required("category", &input.category))
        .and_then(|_| validate_price(input.price))
        .map_err(AppError::validation)?;
    input.instructor_id = input.instructor_id.or(Some(admin.user_id));

    let course = CourseRepo::create(&state.pool, &input)
        .await
        .map_err(instructor_error)?;

    tracing::info!(course_id = course.id, admin_id = admin.user_id, "Course created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// PATCH /api/v1/courses/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<Course>>> {
    let text_fields = [
        ("title", &input.title),
        ("description", &input.description),
        ("category", &input.category),
    ];
    for (field, value) in text_fields {
        if let Some(value) = value {
            validate_required(field, value).map_err(AppError::validation)?;
        }
    }
    if let Some(price) = input.price {
        validate_price(price).map_err(AppError::validation)?;
    }

    let course = CourseRepo::update(&state.pool, id, &input)
        .await
        .map_err(instructor_error)?
        .ok_or_else(|| course_not_found(id))?;
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/courses/{id}
///
/// Refused while any enrollment still references the course.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse<Option<()>>>> {
    let deleted = CourseRepo::delete(&state.pool, id).await.map_err(|err| {
        if is_foreign_key_violation(&err) {
            AppError::Core(CoreError::Conflict(
                "Course has enrollments and cannot be deleted".into(),
            ))
        } else {
            AppError::Database(err)
        }
    })?;
    if !deleted {
        return Err(course_not_found(id));
    }

    tracing::info!(course_id = id, admin_id = admin.user_id, "Course deleted");
    Ok(Json(MessageResponse {
        message: "Course deleted".into(),
        data: None,
    }))
}

fn parse_course_status(name: &str) -> AppResult<CourseStatus> {
    CourseStatus::from_name(name).ok_or_else(|| {
        AppError::validation(format!(
            "Invalid status '{name}'. Must be one of: draft, published"
        ))
    })
}

/// On insert/update the only foreign key is the instructor.
fn instructor_error(err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        AppError::validation("instructor_id does not reference an existing user")
    } else {
        AppError::Database(err)
    }
}

fn course_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Course",
        id,
    })
}
