use axum::{
    Router,
    extract::State,
    routing::get,
};
use chrono::NaiveDate;
use platform_api::ApiResult;
use platform_api::extract::{Json, Query};
use platform_authz::Permission;
use products_hr::analytics::{Dashboard, DepartmentHeadcount};
use serde::Deserialize;

use super::today;
use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/departments", get(departments))
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    date: Option<NaiveDate>,
}

async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<Dashboard>> {
    user.require(Permission::AnalyticsRead)?;
    let day = query.date.unwrap_or_else(today);
    Ok(Json(products_hr::analytics::dashboard(&state.pool, day).await?))
}

async fn departments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<DepartmentHeadcount>>> {
    user.require(Permission::AnalyticsRead)?;
    Ok(Json(
        products_hr::analytics::department_headcount(&state.pool).await?,
    ))
}
