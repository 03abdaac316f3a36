use axum::{Router, extract::State, routing::get};
use chrono::Utc;
use platform_api::ApiResult;
use platform_api::extract::Json;
use platform_authz::Permission;
use products_hr::company::{self, CompanyView, UpdateCompanyInput};

use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(show).put(update))
}

/// Branding is visible to every signed-in user.
async fn show(State(state): State<AppState>, _user: CurrentUser) -> ApiResult<Json<CompanyView>> {
    let settings = company::current(&state.pool).await?;
    Ok(Json(CompanyView::new(settings, Utc::now())))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<UpdateCompanyInput>,
) -> ApiResult<Json<CompanyView>> {
    user.require(Permission::CompanyWrite)?;
    let settings = company::update(&state.pool, input).await?;
    Ok(Json(CompanyView::new(settings, Utc::now())))
}
