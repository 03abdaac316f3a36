//! Positions and the reporting structure between them.

use chrono::Utc;
use entity::{employees, positions};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::validation::{non_negative_cents, required};
use crate::{HrError, HrResult};

#[derive(Debug, Clone, Deserialize)]
pub struct NewPositionInput {
    pub title: String,
    pub department: String,
    pub reports_to: Option<Uuid>,
    #[serde(default)]
    pub min_salary_cents: i64,
    #[serde(default)]
    pub max_salary_cents: i64,
    #[serde(default = "default_headcount")]
    pub headcount: i32,
    #[serde(default = "default_open")]
    pub is_open: bool,
}

fn default_headcount() -> i32 {
    1
}

fn default_open() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePositionInput {
    pub title: Option<String>,
    pub department: Option<String>,
    pub reports_to: Option<Uuid>,
    pub min_salary_cents: Option<i64>,
    pub max_salary_cents: Option<i64>,
    pub headcount: Option<i32>,
    pub is_open: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionFilter {
    pub department: Option<String>,
    #[serde(default)]
    pub open_only: bool,
}

fn validate_salary_band(min: i64, max: i64) -> HrResult<()> {
    non_negative_cents("min_salary_cents", min)?;
    non_negative_cents("max_salary_cents", max)?;
    if min > max {
        return Err(HrError::validation(
            "min_salary_cents must not exceed max_salary_cents",
        ));
    }
    Ok(())
}

fn validate_headcount(value: i32) -> HrResult<i32> {
    if value < 0 {
        return Err(HrError::validation("headcount must not be negative"));
    }
    Ok(value)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<positions::Model> {
    positions::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("position", id))
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    filter: PositionFilter,
) -> HrResult<Vec<positions::Model>> {
    let mut query = positions::Entity::find();
    if let Some(department) = filter.department.as_deref().map(str::trim) {
        if !department.is_empty() {
            query = query.filter(positions::Column::Department.eq(department));
        }
    }
    if filter.open_only {
        query = query.filter(positions::Column::IsOpen.eq(true));
    }
    Ok(query
        .order_by_asc(positions::Column::Department)
        .order_by_asc(positions::Column::Title)
        .all(db)
        .await?)
}

/// Employees currently holding the position.
pub async fn holders<C: ConnectionTrait>(
    db: &C,
    position_id: Uuid,
) -> HrResult<Vec<employees::Model>> {
    get(db, position_id).await?;
    Ok(employees::Entity::find()
        .filter(employees::Column::PositionId.eq(position_id))
        .order_by_asc(employees::Column::LastName)
        .all(db)
        .await?)
}

#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: NewPositionInput,
) -> HrResult<positions::Model> {
    let title = required("title", &input.title, 200)?;
    let department = required("department", &input.department, 100)?;
    validate_salary_band(input.min_salary_cents, input.max_salary_cents)?;
    let headcount = validate_headcount(input.headcount)?;
    if let Some(parent) = input.reports_to {
        get(db, parent).await?;
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    Ok(positions::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        department: Set(department),
        reports_to: Set(input.reports_to),
        min_salary_cents: Set(input.min_salary_cents),
        max_salary_cents: Set(input.max_salary_cents),
        headcount: Set(headcount),
        is_open: Set(input.is_open),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

#[instrument(skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdatePositionInput,
) -> HrResult<positions::Model> {
    let existing = get(db, id).await?;
    let min = input.min_salary_cents.unwrap_or(existing.min_salary_cents);
    let max = input.max_salary_cents.unwrap_or(existing.max_salary_cents);
    validate_salary_band(min, max)?;
    if let Some(parent) = input.reports_to {
        if parent == id {
            return Err(HrError::validation("a position cannot report to itself"));
        }
        get(db, parent).await?;
    }
    let mut active: positions::ActiveModel = existing.into();
    if let Some(title) = &input.title {
        active.title = Set(required("title", title, 200)?);
    }
    if let Some(department) = &input.department {
        active.department = Set(required("department", department, 100)?);
    }
    if input.reports_to.is_some() {
        active.reports_to = Set(input.reports_to);
    }
    if let Some(headcount) = input.headcount {
        active.headcount = Set(validate_headcount(headcount)?);
    }
    if let Some(is_open) = input.is_open {
        active.is_open = Set(is_open);
    }
    active.min_salary_cents = Set(min);
    active.max_salary_cents = Set(max);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = positions::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("position", id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_band_must_be_ordered() {
        assert!(validate_salary_band(100, 200).is_ok());
        assert!(validate_salary_band(200, 200).is_ok());
        assert!(validate_salary_band(300, 200).is_err());
        assert!(validate_salary_band(-1, 200).is_err());
    }
}
