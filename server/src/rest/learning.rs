use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use entity::{courses, enrollments};
use platform_api::ApiResult;
use platform_api::extract::{Json, Path, Query};
use platform_authz::Permission;
use products_hr::learning::{
    CourseFilter, EnrollInput, EnrollmentFilter, NewCourseInput, ProgressInput, UpdateCourseInput,
};
use uuid::Uuid;

use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(show_course).put(update_course).delete(remove_course),
        )
        .route("/courses/{id}/enroll", post(enroll))
        .route("/enrollments", get(list_enrollments))
        .route(
            "/enrollments/{id}",
            get(show_enrollment).delete(remove_enrollment),
        )
        .route("/enrollments/{id}/progress", put(update_progress))
        .route("/enrollments/{id}/drop", post(drop_enrollment))
}

async fn list_courses(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<CourseFilter>,
) -> ApiResult<Json<Vec<courses::Model>>> {
    user.require(Permission::LearningRead)?;
    Ok(Json(
        products_hr::learning::list_courses(&state.pool, filter).await?,
    ))
}

async fn show_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<courses::Model>> {
    user.require(Permission::LearningRead)?;
    Ok(Json(products_hr::learning::get_course(&state.pool, id).await?))
}

async fn create_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewCourseInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::LearningWrite)?;
    let course = products_hr::learning::create_course(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn update_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCourseInput>,
) -> ApiResult<Json<courses::Model>> {
    user.require(Permission::LearningWrite)?;
    Ok(Json(
        products_hr::learning::update_course(&state.pool, id, input).await?,
    ))
}

async fn remove_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::LearningWrite)?;
    products_hr::learning::delete_course(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn enroll(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<EnrollInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::LearningWrite)?;
    let enrollment = products_hr::learning::enroll(&state.pool, id, input).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn list_enrollments(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(mut filter): Query<EnrollmentFilter>,
) -> ApiResult<Json<Vec<enrollments::Model>>> {
    user.require(Permission::LearningRead)?;
    filter.employee_id = user.scope_filter(filter.employee_id)?;
    Ok(Json(
        products_hr::learning::list_enrollments(&state.pool, filter).await?,
    ))
}

async fn show_enrollment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<enrollments::Model>> {
    user.require(Permission::LearningRead)?;
    let enrollment = products_hr::learning::get_enrollment(&state.pool, id).await?;
    user.scope_employee(Some(enrollment.employee_id))?;
    Ok(Json(enrollment))
}

/// Learners report their own progress; `learning:write` may update anyone's.
async fn update_progress(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ProgressInput>,
) -> ApiResult<Json<enrollments::Model>> {
    let enrollment = products_hr::learning::get_enrollment(&state.pool, id).await?;
    if user.employee_id != Some(enrollment.employee_id) {
        user.require(Permission::LearningWrite)?;
    }
    Ok(Json(
        products_hr::learning::update_progress(&state.pool, id, input).await?,
    ))
}

async fn drop_enrollment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<enrollments::Model>> {
    user.require(Permission::LearningWrite)?;
    Ok(Json(
        products_hr::learning::drop_enrollment(&state.pool, id).await?,
    ))
}

async fn remove_enrollment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::LearningWrite)?;
    products_hr::learning::delete_enrollment(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
