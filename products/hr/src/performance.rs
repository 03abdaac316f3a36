//! Performance reviews.

use chrono::Utc;
use entity::performance_reviews::{self, Status};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::validation::{optional, page_limit, validate_period};
use crate::{HrError, HrResult, employees};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

pub fn validate_rating(rating: i16) -> HrResult<i16> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(HrError::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(rating)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReviewInput {
    pub employee_id: Uuid,
    pub reviewer_id: Option<Uuid>,
    pub period: String,
    pub rating: i16,
    pub goals: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReviewInput {
    pub reviewer_id: Option<Uuid>,
    pub period: Option<String>,
    pub rating: Option<i16>,
    pub goals: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewFilter {
    pub employee_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
    pub period: Option<String>,
    pub status: Option<Status>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<performance_reviews::Model> {
    performance_reviews::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("performance review", id))
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    filter: ReviewFilter,
) -> HrResult<Vec<performance_reviews::Model>> {
    let limit = page_limit(filter.limit)?;
    let mut query = performance_reviews::Entity::find();
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(performance_reviews::Column::EmployeeId.eq(employee_id));
    }
    if let Some(reviewer_id) = filter.reviewer_id {
        query = query.filter(performance_reviews::Column::ReviewerId.eq(reviewer_id));
    }
    if let Some(period) = filter.period.as_deref() {
        query = query.filter(performance_reviews::Column::Period.eq(validate_period(period)?));
    }
    if let Some(status) = filter.status {
        query = query.filter(performance_reviews::Column::Status.eq(status));
    }
    Ok(query
        .order_by_desc(performance_reviews::Column::Period)
        .order_by_asc(performance_reviews::Column::Id)
        .limit(limit)
        .offset(filter.offset.unwrap_or(0))
        .all(db)
        .await?)
}

#[instrument(skip(db, input), fields(employee_id = %input.employee_id))]
pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: NewReviewInput,
) -> HrResult<performance_reviews::Model> {
    let period = validate_period(&input.period)?;
    let rating = validate_rating(input.rating)?;
    employees::get(db, input.employee_id).await?;
    if let Some(reviewer_id) = input.reviewer_id {
        if reviewer_id == input.employee_id {
            return Err(HrError::validation("an employee cannot review themselves"));
        }
        employees::get(db, reviewer_id).await?;
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    Ok(performance_reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(input.employee_id),
        reviewer_id: Set(input.reviewer_id),
        period: Set(period),
        rating: Set(rating),
        goals: Set(optional("goals", input.goals, 4000)?),
        comments: Set(optional("comments", input.comments, 4000)?),
        status: Set(Status::Draft),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

/// Drafts are editable; submitted reviews are frozen.
#[instrument(skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateReviewInput,
) -> HrResult<performance_reviews::Model> {
    let existing = get(db, id).await?;
    if existing.status != Status::Draft {
        return Err(HrError::validation("only draft reviews can be edited"));
    }
    if let Some(reviewer_id) = input.reviewer_id {
        if reviewer_id == existing.employee_id {
            return Err(HrError::validation("an employee cannot review themselves"));
        }
        employees::get(db, reviewer_id).await?;
    }
    let mut active: performance_reviews::ActiveModel = existing.into();
    if input.reviewer_id.is_some() {
        active.reviewer_id = Set(input.reviewer_id);
    }
    if let Some(period) = &input.period {
        active.period = Set(validate_period(period)?);
    }
    if let Some(rating) = input.rating {
        active.rating = Set(validate_rating(rating)?);
    }
    if input.goals.is_some() {
        active.goals = Set(optional("goals", input.goals, 4000)?);
    }
    if input.comments.is_some() {
        active.comments = Set(optional("comments", input.comments, 4000)?);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = performance_reviews::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("performance review", id));
    }
    Ok(())
}

async fn transition<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    from: Status,
    to: Status,
) -> HrResult<performance_reviews::Model> {
    let existing = get(db, id).await?;
    if existing.status != from {
        return Err(HrError::validation(format!(
            "review must be {from:?} to become {to:?}"
        )));
    }
    let mut active: performance_reviews::ActiveModel = existing.into();
    active.status = Set(to);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn submit<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<performance_reviews::Model> {
    transition(db, id, Status::Draft, Status::Submitted).await
}

#[instrument(skip(db))]
pub async fn acknowledge<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> HrResult<performance_reviews::Model> {
    transition(db, id, Status::Submitted, Status::Acknowledged).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        for rating in 1..=5 {
            assert_eq!(validate_rating(rating).unwrap(), rating);
        }
    }
}
