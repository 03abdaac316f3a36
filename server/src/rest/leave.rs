use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Datelike;
use entity::leaves;
use platform_api::ApiResult;
use platform_api::extract::{Json, Path, Query};
use platform_authz::Permission;
use products_hr::HrError;
use products_hr::leave::{DecisionInput, LeaveBalance, LeaveFilter, NewLeaveInput, UpdateLeaveInput};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use uuid::Uuid;

use super::today;
use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/balance", get(balance))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/approve", post(approve))
        .route("/{id}/reject", post(reject))
        .route("/{id}/cancel", post(cancel))
}

#[derive(Debug, Deserialize)]
struct BalanceQuery {
    employee_id: Option<Uuid>,
    year: Option<i32>,
}

/// Loads a leave and checks the caller may touch it.
async fn scoped(state: &AppState, user: &CurrentUser, id: Uuid) -> ApiResult<leaves::Model> {
    let leave = products_hr::leave::get(&state.pool, id).await?;
    user.scope_employee(Some(leave.employee_id))?;
    Ok(leave)
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(mut filter): Query<LeaveFilter>,
) -> ApiResult<Json<Vec<leaves::Model>>> {
    user.require(Permission::LeaveRead)?;
    filter.employee_id = user.scope_filter(filter.employee_id)?;
    Ok(Json(products_hr::leave::list(&state.pool, filter).await?))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<leaves::Model>> {
    user.require(Permission::LeaveRead)?;
    Ok(Json(scoped(&state, &user, id).await?))
}

async fn balance(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Json<Vec<LeaveBalance>>> {
    user.require(Permission::LeaveRead)?;
    let employee_id = user.scope_employee(query.employee_id)?;
    let year = query.year.unwrap_or_else(|| today().year());
    Ok(Json(
        products_hr::leave::balance(&state.pool, employee_id, year).await?,
    ))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(mut input): Json<NewLeaveInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::LeaveWrite)?;
    input.employee_id = user.scope_employee(Some(input.employee_id))?;
    let leave = products_hr::leave::create(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(leave)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateLeaveInput>,
) -> ApiResult<Json<leaves::Model>> {
    user.require(Permission::LeaveWrite)?;
    scoped(&state, &user, id).await?;
    Ok(Json(products_hr::leave::update(&state.pool, id, input).await?))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::LeaveWrite)?;
    scoped(&state, &user, id).await?;
    products_hr::leave::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn approve(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    body: Option<Json<DecisionInput>>,
) -> ApiResult<Json<leaves::Model>> {
    user.require(Permission::LeaveApprove)?;
    let input = body.map(|Json(input)| input).unwrap_or_default();
    let txn = state.pool.begin().await.map_err(HrError::from)?;
    let leave = products_hr::leave::approve(&txn, id, Some(user.id), input).await?;
    txn.commit().await.map_err(HrError::from)?;
    Ok(Json(leave))
}

async fn reject(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    body: Option<Json<DecisionInput>>,
) -> ApiResult<Json<leaves::Model>> {
    user.require(Permission::LeaveApprove)?;
    let input = body.map(|Json(input)| input).unwrap_or_default();
    Ok(Json(
        products_hr::leave::reject(&state.pool, id, Some(user.id), input).await?,
    ))
}

async fn cancel(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<leaves::Model>> {
    user.require(Permission::LeaveWrite)?;
    scoped(&state, &user, id).await?;
    Ok(Json(products_hr::leave::cancel(&state.pool, id).await?))
}
