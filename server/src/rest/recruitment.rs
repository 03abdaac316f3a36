use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use entity::candidates::{self, Stage};
use entity::job_postings;
use platform_api::ApiResult;
use platform_api::extract::{Json, Path, Query};
use platform_authz::Permission;
use products_hr::HrError;
use products_hr::recruitment::{
    CandidateFilter, NewCandidateInput, NewPostingInput, PostingFilter, UpdateCandidateInput,
    UpdatePostingInput,
};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::CurrentUser, http::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/postings", get(list_postings).post(create_posting))
        .route(
            "/postings/{id}",
            get(show_posting).put(update_posting).delete(remove_posting),
        )
        .route(
            "/postings/{id}/candidates",
            get(list_candidates).post(add_candidate),
        )
        .route(
            "/candidates/{id}",
            get(show_candidate)
                .put(update_candidate)
                .delete(remove_candidate),
        )
        .route("/candidates/{id}/stage", post(move_candidate))
}

#[derive(Debug, Deserialize)]
struct StageRequest {
    stage: Stage,
}

async fn list_postings(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<PostingFilter>,
) -> ApiResult<Json<Vec<job_postings::Model>>> {
    user.require(Permission::RecruitmentRead)?;
    Ok(Json(
        products_hr::recruitment::list_postings(&state.pool, filter).await?,
    ))
}

async fn show_posting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<job_postings::Model>> {
    user.require(Permission::RecruitmentRead)?;
    Ok(Json(
        products_hr::recruitment::get_posting(&state.pool, id).await?,
    ))
}

async fn create_posting(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewPostingInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::RecruitmentWrite)?;
    let posting = products_hr::recruitment::create_posting(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(posting)))
}

async fn update_posting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePostingInput>,
) -> ApiResult<Json<job_postings::Model>> {
    user.require(Permission::RecruitmentWrite)?;
    Ok(Json(
        products_hr::recruitment::update_posting(&state.pool, id, input).await?,
    ))
}

async fn remove_posting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::RecruitmentWrite)?;
    products_hr::recruitment::delete_posting(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_candidates(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(filter): Query<CandidateFilter>,
) -> ApiResult<Json<Vec<candidates::Model>>> {
    user.require(Permission::RecruitmentRead)?;
    Ok(Json(
        products_hr::recruitment::list_candidates(&state.pool, id, filter).await?,
    ))
}

async fn add_candidate(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<NewCandidateInput>,
) -> ApiResult<impl IntoResponse> {
    user.require(Permission::RecruitmentWrite)?;
    let candidate = products_hr::recruitment::add_candidate(&state.pool, id, input).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

async fn show_candidate(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<candidates::Model>> {
    user.require(Permission::RecruitmentRead)?;
    Ok(Json(
        products_hr::recruitment::get_candidate(&state.pool, id).await?,
    ))
}

async fn update_candidate(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCandidateInput>,
) -> ApiResult<Json<candidates::Model>> {
    user.require(Permission::RecruitmentWrite)?;
    Ok(Json(
        products_hr::recruitment::update_candidate(&state.pool, id, input).await?,
    ))
}

async fn remove_candidate(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user.require(Permission::RecruitmentWrite)?;
    products_hr::recruitment::delete_candidate(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_candidate(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<StageRequest>,
) -> ApiResult<Json<candidates::Model>> {
    user.require(Permission::RecruitmentWrite)?;
    // hiring may also close the posting
    let txn = state.pool.begin().await.map_err(HrError::from)?;
    let candidate = products_hr::recruitment::move_candidate(&txn, id, body.stage).await?;
    txn.commit().await.map_err(HrError::from)?;
    Ok(Json(candidate))
}
