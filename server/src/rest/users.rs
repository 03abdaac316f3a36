use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use entity::users;
use platform_api::ApiResult;
use platform_api::extract::{Json, Path};
use platform_authz::Permission;
use products_hr::users::UpdateUserInput;
use uuid::Uuid;

use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", put(update))
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<users::Model>>> {
    user.require(Permission::UsersWrite)?;
    Ok(Json(products_hr::users::list(&state.pool).await?))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> ApiResult<Json<users::Model>> {
    user.require(Permission::UsersWrite)?;
    Ok(Json(products_hr::users::update(&state.pool, id, input).await?))
}
