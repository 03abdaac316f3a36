use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use entity::{employees, positions};
use platform_api::ApiResult;
use platform_api::extract::{Json, Path, Query};
use platform_authz::Permission;
use products_hr::positions::{NewPositionInput, PositionFilter, UpdatePositionInput};
use uuid::Uuid;

use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/employees", get(holders))
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<PositionFilter>,
) -> ApiResult<Json<Vec<positions::Model>>> {
    user.require(Permission::PositionsRead)?;
    Ok(Json(products_hr::positions::list(&state.pool, filter).await?))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<positions::Model>> {
    user.require(Permission::PositionsRead)?;
    Ok(Json(products_hr::positions::get(&state.pool, id).await?))
}

async fn holders(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<employees::Model>>> {
    user.require(Permission::PositionsRead)?;
    Ok(Json(products_hr::positions::holders(&state.pool, id).await?))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewPositionInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::PositionsWrite)?;
    let position = products_hr::positions::create(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(position)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePositionInput>,
) -> ApiResult<Json<positions::Model>> {
    user.require(Permission::PositionsWrite)?;
    Ok(Json(products_hr::positions::update(&state.pool, id, input).await?))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::PositionsWrite)?;
    products_hr::positions::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
