use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use entity::employees;
use platform_api::ApiResult;
use platform_api::extract::{Json, Path, Query};
use platform_authz::Permission;
use products_hr::employees::{EmployeeFilter, NewEmployeeInput, UpdateEmployeeInput};
use uuid::Uuid;

use super::today;
use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/reports", get(reports))
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<EmployeeFilter>,
) -> ApiResult<Json<Vec<employees::Model>>> {
    user.require(Permission::EmployeesRead)?;
    Ok(Json(products_hr::employees::list(&state.pool, filter).await?))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<employees::Model>> {
    user.require(Permission::EmployeesRead)?;
    Ok(Json(products_hr::employees::get(&state.pool, id).await?))
}

async fn reports(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<employees::Model>>> {
    user.require(Permission::EmployeesRead)?;
    Ok(Json(products_hr::employees::direct_reports(&state.pool, id).await?))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewEmployeeInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::EmployeesWrite)?;
    let employee = products_hr::employees::create(&state.pool, input, today()).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEmployeeInput>,
) -> ApiResult<Json<employees::Model>> {
    user.require(Permission::EmployeesWrite)?;
    Ok(Json(
        products_hr::employees::update(&state.pool, id, input, today()).await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::EmployeesWrite)?;
    products_hr::employees::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
