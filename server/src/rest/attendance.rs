use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use platform_api::ApiResult;
use platform_api::extract::{Json, Path, Query};
use platform_authz::Permission;
use products_hr::attendance::{
    AttendanceFilter, AttendanceView, NewAttendanceInput, UpdateAttendanceInput,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/check-in", post(check_in))
        .route("/check-out", post(check_out))
        .route("/{id}", get(show).put(update).delete(remove))
}

/// Body for check-in/out. Omitting `employee_id` acts on the caller's own
/// employee record.
#[derive(Debug, Default, Deserialize)]
struct ClockRequest {
    employee_id: Option<Uuid>,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(mut filter): Query<AttendanceFilter>,
) -> ApiResult<Json<Vec<AttendanceView>>> {
    user.require(Permission::AttendanceRead)?;
    filter.employee_id = user.scope_filter(filter.employee_id)?;
    let records = products_hr::attendance::list(&state.pool, filter).await?;
    Ok(Json(records.into_iter().map(AttendanceView::from).collect()))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AttendanceView>> {
    user.require(Permission::AttendanceRead)?;
    let record = products_hr::attendance::get(&state.pool, id).await?;
    user.scope_employee(Some(record.employee_id))?;
    Ok(Json(record.into()))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(mut input): Json<NewAttendanceInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::AttendanceWrite)?;
    input.employee_id = user.scope_employee(Some(input.employee_id))?;
    let record = products_hr::attendance::create(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(AttendanceView::from(record))))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAttendanceInput>,
) -> ApiResult<Json<AttendanceView>> {
    user.require(Permission::AttendanceWrite)?;
    let existing = products_hr::attendance::get(&state.pool, id).await?;
    user.scope_employee(Some(existing.employee_id))?;
    let record = products_hr::attendance::update(&state.pool, id, input).await?;
    Ok(Json(record.into()))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::AttendanceWrite)?;
    let existing = products_hr::attendance::get(&state.pool, id).await?;
    user.scope_employee(Some(existing.employee_id))?;
    products_hr::attendance::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn check_in(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Option<Json<ClockRequest>>,
) -> ApiResult<Json<AttendanceView>> {
    user.require(Permission::AttendanceWrite)?;
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let employee_id = user.scope_employee(body.employee_id)?;
    let record = products_hr::attendance::check_in(&state.pool, employee_id, Utc::now()).await?;
    Ok(Json(record.into()))
}

async fn check_out(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Option<Json<ClockRequest>>,
) -> ApiResult<Json<AttendanceView>> {
    user.require(Permission::AttendanceWrite)?;
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let employee_id = user.scope_employee(body.employee_id)?;
    let record = products_hr::attendance::check_out(&state.pool, employee_id, Utc::now()).await?;
    Ok(Json(record.into()))
}
