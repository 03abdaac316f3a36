//! Job postings and their candidate pipelines.

use chrono::Utc;
use entity::candidates::{self, Stage};
use entity::job_postings::{self, Status};
use entity::positions;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::validation::{normalize_email, optional, page_limit, required};
use crate::{HrError, HrResult};

#[derive(Debug, Clone, Deserialize)]
pub struct NewPostingInput {
    pub title: String,
    pub department: String,
    pub position_id: Option<Uuid>,
    pub description: Option<String>,
    #[serde(default = "one")]
    pub openings: i32,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostingInput {
    pub title: Option<String>,
    pub department: Option<String>,
    pub position_id: Option<Uuid>,
    pub description: Option<String>,
    pub openings: Option<i32>,
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostingFilter {
    pub department: Option<String>,
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCandidateInput {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCandidateInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateFilter {
    pub stage: Option<Stage>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

fn validate_openings(openings: i32) -> HrResult<i32> {
    if openings < 1 {
        return Err(HrError::validation("openings must be at least 1"));
    }
    Ok(openings)
}

async fn ensure_position<C: ConnectionTrait>(db: &C, position_id: Uuid) -> HrResult<()> {
    positions::Entity::find_by_id(position_id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("position", position_id))?;
    Ok(())
}

pub async fn get_posting<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<job_postings::Model> {
    job_postings::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("job posting", id))
}

pub async fn list_postings<C: ConnectionTrait>(
    db: &C,
    filter: PostingFilter,
) -> HrResult<Vec<job_postings::Model>> {
    let mut query = job_postings::Entity::find();
    if let Some(department) = filter.department.as_deref().map(str::trim) {
        if !department.is_empty() {
            query = query.filter(job_postings::Column::Department.eq(department));
        }
    }
    if let Some(status) = filter.status {
        query = query.filter(job_postings::Column::Status.eq(status));
    }
    Ok(query
        .order_by_desc(job_postings::Column::CreatedAt)
        .order_by_asc(job_postings::Column::Id)
        .all(db)
        .await?)
}

#[instrument(skip(db, input))]
pub async fn create_posting<C: ConnectionTrait>(
    db: &C,
    input: NewPostingInput,
) -> HrResult<job_postings::Model> {
    let title = required("title", &input.title, 200)?;
    let department = required("department", &input.department, 100)?;
    let openings = validate_openings(input.openings)?;
    if let Some(position_id) = input.position_id {
        ensure_position(db, position_id).await?;
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = job_postings::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        department: Set(department),
        position_id: Set(input.position_id),
        description: Set(optional("description", input.description, 8000)?),
        openings: Set(openings),
        status: Set(Status::Open),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(posting_id = %model.id, "job posting opened");
    Ok(model)
}

#[instrument(skip(db, input))]
pub async fn update_posting<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdatePostingInput,
) -> HrResult<job_postings::Model> {
    let existing = get_posting(db, id).await?;
    if let Some(position_id) = input.position_id {
        ensure_position(db, position_id).await?;
    }
    let mut active: job_postings::ActiveModel = existing.into();
    if let Some(value) = &input.title {
        active.title = Set(required("title", value, 200)?);
    }
    if let Some(value) = &input.department {
        active.department = Set(required("department", value, 100)?);
    }
    if input.position_id.is_some() {
        active.position_id = Set(input.position_id);
    }
    if input.description.is_some() {
        active.description = Set(optional("description", input.description, 8000)?);
    }
    if let Some(openings) = input.openings {
        active.openings = Set(validate_openings(openings)?);
    }
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete_posting<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = job_postings::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("job posting", id));
    }
    Ok(())
}

pub async fn get_candidate<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<candidates::Model> {
    candidates::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("candidate", id))
}

pub async fn list_candidates<C: ConnectionTrait>(
    db: &C,
    posting_id: Uuid,
    filter: CandidateFilter,
) -> HrResult<Vec<candidates::Model>> {
    get_posting(db, posting_id).await?;
    let limit = page_limit(filter.limit)?;
    let mut query = candidates::Entity::find()
        .filter(candidates::Column::JobPostingId.eq(posting_id));
    if let Some(stage) = filter.stage {
        query = query.filter(candidates::Column::Stage.eq(stage));
    }
    Ok(query
        .order_by_asc(candidates::Column::CreatedAt)
        .order_by_asc(candidates::Column::Id)
        .limit(limit)
        .offset(filter.offset.unwrap_or(0))
        .all(db)
        .await?)
}

/// Adds an applicant to an open posting.
#[instrument(skip(db, input))]
pub async fn add_candidate<C: ConnectionTrait>(
    db: &C,
    posting_id: Uuid,
    input: NewCandidateInput,
) -> HrResult<candidates::Model> {
    let posting = get_posting(db, posting_id).await?;
    if posting.status != Status::Open {
        return Err(HrError::validation("job posting is not accepting candidates"));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    Ok(candidates::ActiveModel {
        id: Set(Uuid::new_v4()),
        job_posting_id: Set(posting_id),
        full_name: Set(required("full_name", &input.full_name, 200)?),
        email: Set(normalize_email(&input.email)?),
        phone: Set(optional("phone", input.phone, 32)?),
        stage: Set(Stage::Applied),
        notes: Set(optional("notes", input.notes, 4000)?),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

#[instrument(skip(db, input))]
pub async fn update_candidate<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateCandidateInput,
) -> HrResult<candidates::Model> {
    let existing = get_candidate(db, id).await?;
    let mut active: candidates::ActiveModel = existing.into();
    if let Some(value) = &input.full_name {
        active.full_name = Set(required("full_name", value, 200)?);
    }
    if let Some(value) = &input.email {
        active.email = Set(normalize_email(value)?);
    }
    if input.phone.is_some() {
        active.phone = Set(optional("phone", input.phone, 32)?);
    }
    if input.notes.is_some() {
        active.notes = Set(optional("notes", input.notes, 4000)?);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete_candidate<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = candidates::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("candidate", id));
    }
    Ok(())
}

async fn hired_count<C: ConnectionTrait>(db: &C, posting_id: Uuid) -> HrResult<u64> {
    Ok(candidates::Entity::find()
        .filter(candidates::Column::JobPostingId.eq(posting_id))
        .filter(candidates::Column::Stage.eq(Stage::Hired))
        .count(db)
        .await?)
}

/// Moves a candidate through the pipeline. `HIRED` and `REJECTED` are final.
/// Filling the last opening closes the posting.
#[instrument(skip(db))]
pub async fn move_candidate<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    stage: Stage,
) -> HrResult<candidates::Model> {
    let existing = get_candidate(db, id).await?;
    if existing.stage == stage {
        return Ok(existing);
    }
    if existing.stage.is_terminal() {
        return Err(HrError::validation(format!(
            "candidate is already {:?}",
            existing.stage
        )));
    }
    let posting = get_posting(db, existing.job_posting_id).await?;
    let openings = u64::try_from(posting.openings).unwrap_or(0);
    if stage == Stage::Hired && hired_count(db, posting.id).await? >= openings {
        return Err(HrError::validation("job posting has no openings left"));
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: candidates::ActiveModel = existing.into();
    active.stage = Set(stage);
    active.updated_at = Set(now);
    let candidate = active.update(db).await?;

    if stage == Stage::Hired && hired_count(db, posting.id).await? >= openings {
        let mut posting: job_postings::ActiveModel = posting.into();
        posting.status = Set(Status::Closed);
        posting.updated_at = Set(now);
        let posting = posting.update(db).await?;
        info!(posting_id = %posting.id, "last opening filled, posting closed");
    }
    Ok(candidate)
}

pub async fn open_postings_count<C: ConnectionTrait>(db: &C) -> HrResult<u64> {
    Ok(job_postings::Entity::find()
        .filter(job_postings::Column::Status.eq(Status::Open))
        .count(db)
        .await?)
}
