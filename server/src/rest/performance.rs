use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use entity::performance_reviews;
use platform_api::ApiResult;
use platform_api::extract::{Json, Path, Query};
use platform_authz::Permission;
use products_hr::performance::{NewReviewInput, ReviewFilter, UpdateReviewInput};
use uuid::Uuid;

use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/submit", post(submit))
        .route("/{id}/acknowledge", post(acknowledge))
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(mut filter): Query<ReviewFilter>,
) -> ApiResult<Json<Vec<performance_reviews::Model>>> {
    user.require(Permission::PerformanceRead)?;
    filter.employee_id = user.scope_filter(filter.employee_id)?;
    Ok(Json(products_hr::performance::list(&state.pool, filter).await?))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<performance_reviews::Model>> {
    user.require(Permission::PerformanceRead)?;
    let review = products_hr::performance::get(&state.pool, id).await?;
    user.scope_employee(Some(review.employee_id))?;
    Ok(Json(review))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewReviewInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::PerformanceWrite)?;
    let review = products_hr::performance::create(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateReviewInput>,
) -> ApiResult<Json<performance_reviews::Model>> {
    user.require(Permission::PerformanceWrite)?;
    Ok(Json(
        products_hr::performance::update(&state.pool, id, input).await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::PerformanceWrite)?;
    products_hr::performance::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<performance_reviews::Model>> {
    user.require(Permission::PerformanceWrite)?;
    Ok(Json(products_hr::performance::submit(&state.pool, id).await?))
}

/// The reviewed employee (or anyone who can read reviews for them) signs off.
async fn acknowledge(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<performance_reviews::Model>> {
    user.require(Permission::PerformanceRead)?;
    let review = products_hr::performance::get(&state.pool, id).await?;
    user.scope_employee(Some(review.employee_id))?;
    Ok(Json(
        products_hr::performance::acknowledge(&state.pool, id).await?,
    ))
}
