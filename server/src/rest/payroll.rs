use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use entity::payroll;
use platform_api::ApiResult;
use platform_api::extract::{Json, Path, Query};
use platform_authz::Permission;
use products_hr::HrError;
use products_hr::payroll::{NewPayrollInput, PayrollFilter, PayrollSummary, UpdatePayrollInput};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/generate", post(generate))
        .route("/summary/{period}", get(summary))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/process", post(process))
        .route("/{id}/pay", post(mark_paid))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    period: String,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<PayrollFilter>,
) -> ApiResult<Json<Vec<payroll::Model>>> {
    user.require(Permission::PayrollRead)?;
    Ok(Json(products_hr::payroll::list(&state.pool, filter).await?))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<payroll::Model>> {
    user.require(Permission::PayrollRead)?;
    Ok(Json(products_hr::payroll::get(&state.pool, id).await?))
}

async fn summary(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(period): Path<String>,
) -> ApiResult<Json<PayrollSummary>> {
    user.require(Permission::PayrollRead)?;
    Ok(Json(products_hr::payroll::summary(&state.pool, &period).await?))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewPayrollInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::PayrollWrite)?;
    let record = products_hr::payroll::create(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn generate(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<GenerateRequest>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::PayrollWrite)?;
    let txn = state.pool.begin().await.map_err(HrError::from)?;
    let created = products_hr::payroll::generate(&txn, &body.period).await?;
    txn.commit().await.map_err(HrError::from)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePayrollInput>,
) -> ApiResult<Json<payroll::Model>> {
    user.require(Permission::PayrollWrite)?;
    Ok(Json(products_hr::payroll::update(&state.pool, id, input).await?))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::PayrollWrite)?;
    products_hr::payroll::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn process(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<payroll::Model>> {
    user.require(Permission::PayrollWrite)?;
    Ok(Json(products_hr::payroll::process(&state.pool, id).await?))
}

async fn mark_paid(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<payroll::Model>> {
    user.require(Permission::PayrollWrite)?;
    Ok(Json(products_hr::payroll::mark_paid(&state.pool, id).await?))
}
