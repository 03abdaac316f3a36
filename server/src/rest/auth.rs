use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use entity::users;
use platform_api::{ApiError, ApiResult};
use platform_api::extract::Json;
use platform_authn::issue_token;
use platform_authz::{Permission, permissions_for_role};
use products_hr::users::NewUserInput;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/register", post(register))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    expires_at: DateTime<Utc>,
    user: users::Model,
    role: String,
    permissions: &'static [Permission],
}

#[derive(Debug, Serialize)]
struct MeResponse {
    user: users::Model,
    role: String,
    permissions: &'static [Permission],
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = products_hr::users::authenticate(&state.pool, &body.email, &body.password).await?;
    let issued = issue_token(user.id, &user.role, &state.config.auth)
        .map_err(|err| ApiError::internal(err.into()))?;
    info!(user_id = %user.id, "login succeeded");
    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        role: user.role.clone(),
        permissions: permissions_for_role(&user.role),
        user,
    }))
}

/// Tokens are stateless; the client discards its copy.
async fn logout(user: CurrentUser) -> StatusCode {
    info!(user_id = %user.id, "logout");
    StatusCode::NO_CONTENT
}

async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<MeResponse>> {
    let account = products_hr::users::get(&state.pool, user.id).await?;
    Ok(Json(MeResponse {
        permissions: permissions_for_role(&account.role),
        role: account.role.clone(),
        user: account,
    }))
}

async fn register(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewUserInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::UsersWrite)?;
    let created = products_hr::users::register(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
