//! Courses and enrollment progress.

use chrono::Utc;
use entity::courses;
use entity::enrollments::{self, Status};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::validation::{optional, required};
use crate::{HrError, HrResult, employees};

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourseInput {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub duration_hours: i32,
    #[serde(default)]
    pub mandatory: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration_hours: Option<i32>,
    pub mandatory: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub mandatory: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentFilter {
    pub course_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollInput {
    pub employee_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressInput {
    pub progress: i16,
}

/// Share of enrollments in mandatory courses that are completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CompletionRate {
    pub enrolled: u64,
    pub completed: u64,
    pub rate: f64,
}

fn validate_duration(hours: i32) -> HrResult<i32> {
    if hours < 0 {
        return Err(HrError::validation("duration_hours must not be negative"));
    }
    Ok(hours)
}

pub fn validate_progress(progress: i16) -> HrResult<i16> {
    if !(0..=100).contains(&progress) {
        return Err(HrError::validation("progress must be between 0 and 100"));
    }
    Ok(progress)
}

/// Status implied by a progress value.
pub fn status_for_progress(progress: i16) -> Status {
    match progress {
        100.. => Status::Completed,
        1..=99 => Status::InProgress,
        _ => Status::Enrolled,
    }
}

pub async fn get_course<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<courses::Model> {
    courses::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("course", id))
}

pub async fn list_courses<C: ConnectionTrait>(
    db: &C,
    filter: CourseFilter,
) -> HrResult<Vec<courses::Model>> {
    let mut query = courses::Entity::find();
    if let Some(category) = filter.category.as_deref().map(str::trim) {
        if !category.is_empty() {
            query = query.filter(courses::Column::Category.eq(category));
        }
    }
    if let Some(mandatory) = filter.mandatory {
        query = query.filter(courses::Column::Mandatory.eq(mandatory));
    }
    Ok(query.order_by_asc(courses::Column::Title).all(db).await?)
}

#[instrument(skip(db, input))]
pub async fn create_course<C: ConnectionTrait>(
    db: &C,
    input: NewCourseInput,
) -> HrResult<courses::Model> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    Ok(courses::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(required("title", &input.title, 200)?),
        description: Set(optional("description", input.description, 8000)?),
        category: Set(required("category", &input.category, 100)?),
        duration_hours: Set(validate_duration(input.duration_hours)?),
        mandatory: Set(input.mandatory),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

#[instrument(skip(db, input))]
pub async fn update_course<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateCourseInput,
) -> HrResult<courses::Model> {
    let existing = get_course(db, id).await?;
    let mut active: courses::ActiveModel = existing.into();
    if let Some(value) = &input.title {
        active.title = Set(required("title", value, 200)?);
    }
    if input.description.is_some() {
        active.description = Set(optional("description", input.description, 8000)?);
    }
    if let Some(value) = &input.category {
        active.category = Set(required("category", value, 100)?);
    }
    if let Some(hours) = input.duration_hours {
        active.duration_hours = Set(validate_duration(hours)?);
    }
    if let Some(mandatory) = input.mandatory {
        active.mandatory = Set(mandatory);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete_course<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = courses::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("course", id));
    }
    Ok(())
}

pub async fn get_enrollment<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> HrResult<enrollments::Model> {
    enrollments::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("enrollment", id))
}

pub async fn list_enrollments<C: ConnectionTrait>(
    db: &C,
    filter: EnrollmentFilter,
) -> HrResult<Vec<enrollments::Model>> {
    let mut query = enrollments::Entity::find();
    if let Some(course_id) = filter.course_id {
        query = query.filter(enrollments::Column::CourseId.eq(course_id));
    }
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(enrollments::Column::EmployeeId.eq(employee_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(enrollments::Column::Status.eq(status));
    }
    Ok(query
        .order_by_desc(enrollments::Column::CreatedAt)
        .order_by_asc(enrollments::Column::Id)
        .all(db)
        .await?)
}

#[instrument(skip(db, input))]
pub async fn enroll<C: ConnectionTrait>(
    db: &C,
    course_id: Uuid,
    input: EnrollInput,
) -> HrResult<enrollments::Model> {
    get_course(db, course_id).await?;
    employees::get(db, input.employee_id).await?;
    let existing = enrollments::Entity::find()
        .filter(enrollments::Column::CourseId.eq(course_id))
        .filter(enrollments::Column::EmployeeId.eq(input.employee_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(HrError::Conflict(
            "employee is already enrolled in this course".to_string(),
        ));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = enrollments::ActiveModel {
        id: Set(Uuid::new_v4()),
        course_id: Set(course_id),
        employee_id: Set(input.employee_id),
        status: Set(Status::Enrolled),
        progress: Set(0),
        completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(enrollment_id = %model.id, "employee enrolled");
    Ok(model)
}

/// Records progress. Reaching 100 completes the enrollment.
#[instrument(skip(db, input))]
pub async fn update_progress<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: ProgressInput,
) -> HrResult<enrollments::Model> {
    let progress = validate_progress(input.progress)?;
    let existing = get_enrollment(db, id).await?;
    match existing.status {
        Status::Completed => return Err(HrError::validation("enrollment is already completed")),
        Status::Dropped => return Err(HrError::validation("enrollment was dropped")),
        Status::Enrolled | Status::InProgress => {}
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let status = status_for_progress(progress);
    let mut active: enrollments::ActiveModel = existing.into();
    active.progress = Set(progress);
    active.status = Set(status);
    if status == Status::Completed {
        active.completed_at = Set(Some(now));
    }
    active.updated_at = Set(now);
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn drop_enrollment<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> HrResult<enrollments::Model> {
    let existing = get_enrollment(db, id).await?;
    if existing.status == Status::Completed {
        return Err(HrError::validation("completed enrollments cannot be dropped"));
    }
    let mut active: enrollments::ActiveModel = existing.into();
    active.status = Set(Status::Dropped);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete_enrollment<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = enrollments::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("enrollment", id));
    }
    Ok(())
}

pub async fn mandatory_completion<C: ConnectionTrait>(db: &C) -> HrResult<CompletionRate> {
    let rows = enrollments::Entity::find()
        .inner_join(courses::Entity)
        .filter(courses::Column::Mandatory.eq(true))
        .filter(enrollments::Column::Status.ne(Status::Dropped))
        .all(db)
        .await?;
    let enrolled = rows.len() as u64;
    let completed = rows
        .iter()
        .filter(|row| row.status == Status::Completed)
        .count() as u64;
    let rate = if enrolled == 0 {
        0.0
    } else {
        (completed as f64 / enrolled as f64 * 1000.0).round() / 1000.0
    };
    Ok(CompletionRate {
        enrolled,
        completed,
        rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_drives_status() {
        assert_eq!(status_for_progress(0), Status::Enrolled);
        assert_eq!(status_for_progress(40), Status::InProgress);
        assert_eq!(status_for_progress(100), Status::Completed);
    }

    #[test]
    fn progress_is_a_percentage() {
        assert!(validate_progress(-1).is_err());
        assert!(validate_progress(101).is_err());
        assert_eq!(validate_progress(100).unwrap(), 100);
    }
}
