use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use entity::{audits, certifications, violations};
use platform_api::ApiResult;
use platform_api::extract::{Json, Path, Query};
use platform_authz::Permission;
use products_hr::compliance::{
    AuditFilter, CertificationFilter, NewAuditInput, NewCertificationInput, NewViolationInput,
    UpdateAuditInput, UpdateCertificationInput, UpdateViolationInput, ViolationFilter,
};
use serde::Deserialize;
use uuid::Uuid;

use super::today;
use crate::{auth::CurrentUser, http::AppState};

pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/audits", get(list_audits).post(create_audit))
        .route(
            "/audits/{id}",
            get(show_audit).put(update_audit).delete(remove_audit),
        )
        .route("/violations", get(list_violations).post(report_violation))
        .route(
            "/violations/{id}",
            get(show_violation)
                .put(update_violation)
                .delete(remove_violation),
        )
        .route("/violations/{id}/resolve", post(resolve_violation))
        .route(
            "/certifications",
            get(list_certifications).post(create_certification),
        )
        .route("/certifications/expiring", get(expiring))
        .route(
            "/certifications/{id}",
            get(show_certification)
                .put(update_certification)
                .delete(remove_certification),
        )
}

#[derive(Debug, Deserialize)]
struct ExpiringQuery {
    within_days: Option<i64>,
}

async fn list_audits(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<AuditFilter>,
) -> ApiResult<Json<Vec<audits::Model>>> {
    user.require(Permission::ComplianceRead)?;
    Ok(Json(
        products_hr::compliance::list_audits(&state.pool, filter).await?,
    ))
}

async fn show_audit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<audits::Model>> {
    user.require(Permission::ComplianceRead)?;
    Ok(Json(products_hr::compliance::get_audit(&state.pool, id).await?))
}

async fn create_audit(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewAuditInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::ComplianceWrite)?;
    let audit = products_hr::compliance::create_audit(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(audit)))
}

async fn update_audit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAuditInput>,
) -> ApiResult<Json<audits::Model>> {
    user.require(Permission::ComplianceWrite)?;
    Ok(Json(
        products_hr::compliance::update_audit(&state.pool, id, input).await?,
    ))
}

async fn remove_audit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::ComplianceWrite)?;
    products_hr::compliance::delete_audit(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_violations(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<ViolationFilter>,
) -> ApiResult<Json<Vec<violations::Model>>> {
    user.require(Permission::ComplianceRead)?;
    Ok(Json(
        products_hr::compliance::list_violations(&state.pool, filter).await?,
    ))
}

async fn show_violation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<violations::Model>> {
    user.require(Permission::ComplianceRead)?;
    Ok(Json(
        products_hr::compliance::get_violation(&state.pool, id).await?,
    ))
}

async fn report_violation(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewViolationInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::ComplianceWrite)?;
    let violation = products_hr::compliance::report_violation(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(violation)))
}

async fn update_violation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateViolationInput>,
) -> ApiResult<Json<violations::Model>> {
    user.require(Permission::ComplianceWrite)?;
    Ok(Json(
        products_hr::compliance::update_violation(&state.pool, id, input).await?,
    ))
}

async fn resolve_violation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<violations::Model>> {
    user.require(Permission::ComplianceWrite)?;
    Ok(Json(
        products_hr::compliance::resolve_violation(&state.pool, id).await?,
    ))
}

async fn remove_violation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::ComplianceWrite)?;
    products_hr::compliance::delete_violation(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_certifications(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<CertificationFilter>,
) -> ApiResult<Json<Vec<certifications::Model>>> {
    user.require(Permission::ComplianceRead)?;
    Ok(Json(
        products_hr::compliance::list_certifications(&state.pool, filter).await?,
    ))
}

async fn expiring(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ExpiringQuery>,
) -> ApiResult<Json<Vec<certifications::Model>>> {
    user.require(Permission::ComplianceRead)?;
    let within_days = query.within_days.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS);
    Ok(Json(
        products_hr::compliance::expiring(&state.pool, today(), within_days).await?,
    ))
}

async fn show_certification(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<certifications::Model>> {
    user.require(Permission::ComplianceRead)?;
    Ok(Json(
        products_hr::compliance::get_certification(&state.pool, id).await?,
    ))
}

async fn create_certification(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewCertificationInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::ComplianceWrite)?;
    let certification = products_hr::compliance::create_certification(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(certification)))
}

async fn update_certification(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCertificationInput>,
) -> ApiResult<Json<certifications::Model>> {
    user.require(Permission::ComplianceWrite)?;
    Ok(Json(
        products_hr::compliance::update_certification(&state.pool, id, input).await?,
    ))
}

async fn remove_certification(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::ComplianceWrite)?;
    products_hr::compliance::delete_certification(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
