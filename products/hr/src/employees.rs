//! Employee directory.

use chrono::{NaiveDate, Utc};
use entity::employees::{self, Gender, Status};
use entity::positions;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::validation::{
    non_negative_cents, normalize_email, optional, page_limit, required, validate_cnic,
    validate_date_of_birth,
};
use crate::{HrError, HrResult};

const MAX_REPORTING_DEPTH: usize = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployeeInput {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cnic: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<Gender>,
    pub department: String,
    pub position_id: Option<Uuid>,
    pub reports_to: Option<Uuid>,
    pub hire_date: NaiveDate,
    pub status: Option<Status>,
    #[serde(default)]
    pub base_salary_cents: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmployeeInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cnic: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub department: Option<String>,
    pub position_id: Option<Uuid>,
    pub reports_to: Option<Uuid>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<Status>,
    pub base_salary_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    pub status: Option<Status>,
    pub position_id: Option<Uuid>,
    pub q: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<employees::Model> {
    employees::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("employee", id))
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    filter: EmployeeFilter,
) -> HrResult<Vec<employees::Model>> {
    let limit = page_limit(filter.limit)?;
    let mut query = employees::Entity::find();
    if let Some(department) = filter.department.as_deref().map(str::trim) {
        if !department.is_empty() {
            query = query.filter(employees::Column::Department.eq(department));
        }
    }
    if let Some(status) = filter.status {
        query = query.filter(employees::Column::Status.eq(status));
    }
    if let Some(position_id) = filter.position_id {
        query = query.filter(employees::Column::PositionId.eq(position_id));
    }
    if let Some(q) = filter.q.as_deref().map(str::trim) {
        if !q.is_empty() {
            query = query.filter(
                Condition::any()
                    .add(employees::Column::FirstName.contains(q))
                    .add(employees::Column::LastName.contains(q))
                    .add(employees::Column::Email.contains(q.to_lowercase()))
                    .add(employees::Column::EmployeeCode.contains(q)),
            );
        }
    }
    Ok(query
        .order_by_asc(employees::Column::LastName)
        .order_by_asc(employees::Column::FirstName)
        .order_by_asc(employees::Column::Id)
        .limit(limit)
        .offset(filter.offset.unwrap_or(0))
        .all(db)
        .await?)
}

/// Employees whose `reports_to` points at `manager_id`.
pub async fn direct_reports<C: ConnectionTrait>(
    db: &C,
    manager_id: Uuid,
) -> HrResult<Vec<employees::Model>> {
    get(db, manager_id).await?;
    Ok(employees::Entity::find()
        .filter(employees::Column::ReportsTo.eq(manager_id))
        .order_by_asc(employees::Column::LastName)
        .all(db)
        .await?)
}

async fn ensure_position<C: ConnectionTrait>(db: &C, position_id: Uuid) -> HrResult<()> {
    positions::Entity::find_by_id(position_id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("position", position_id))?;
    Ok(())
}

/// Rejects a manager assignment that would make `employee_id` its own
/// (indirect) manager.
async fn ensure_no_reporting_cycle<C: ConnectionTrait>(
    db: &C,
    employee_id: Option<Uuid>,
    manager_id: Uuid,
) -> HrResult<()> {
    if employee_id == Some(manager_id) {
        return Err(HrError::validation("an employee cannot report to themselves"));
    }
    let mut cursor = Some(get(db, manager_id).await?);
    let mut depth = 0;
    while let Some(current) = cursor {
        if Some(current.id) == employee_id {
            return Err(HrError::validation("reporting line would form a cycle"));
        }
        depth += 1;
        if depth > MAX_REPORTING_DEPTH {
            return Err(HrError::validation("reporting line is too deep"));
        }
        cursor = match current.reports_to {
            Some(next) => employees::Entity::find_by_id(next).one(db).await?,
            None => None,
        };
    }
    Ok(())
}

#[instrument(skip(db, input), fields(code = %input.employee_code))]
pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: NewEmployeeInput,
    today: NaiveDate,
) -> HrResult<employees::Model> {
    let employee_code = required("employee_code", &input.employee_code, 32)?;
    let first_name = required("first_name", &input.first_name, 100)?;
    let last_name = required("last_name", &input.last_name, 100)?;
    let email = normalize_email(&input.email)?;
    let cnic = validate_cnic(&input.cnic)?;
    validate_date_of_birth(input.date_of_birth, input.hire_date, today)?;
    let department = required("department", &input.department, 100)?;
    let phone = optional("phone", input.phone, 32)?;
    let base_salary_cents = non_negative_cents("base_salary_cents", input.base_salary_cents)?;
    if let Some(position_id) = input.position_id {
        ensure_position(db, position_id).await?;
    }
    if let Some(manager_id) = input.reports_to {
        ensure_no_reporting_cycle(db, None, manager_id).await?;
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = employees::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_code: Set(employee_code),
        first_name: Set(first_name),
        last_name: Set(last_name),
        email: Set(email),
        phone: Set(phone),
        cnic: Set(cnic),
        date_of_birth: Set(input.date_of_birth),
        gender: Set(input.gender),
        department: Set(department),
        position_id: Set(input.position_id),
        reports_to: Set(input.reports_to),
        hire_date: Set(input.hire_date),
        status: Set(input.status.unwrap_or(Status::Active)),
        base_salary_cents: Set(base_salary_cents),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(employee_id = %model.id, "employee created");
    Ok(model)
}

#[instrument(skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateEmployeeInput,
    today: NaiveDate,
) -> HrResult<employees::Model> {
    let existing = get(db, id).await?;
    let date_of_birth = input.date_of_birth.unwrap_or(existing.date_of_birth);
    let hire_date = input.hire_date.unwrap_or(existing.hire_date);
    if input.date_of_birth.is_some() || input.hire_date.is_some() {
        validate_date_of_birth(date_of_birth, hire_date, today)?;
    }
    if let Some(position_id) = input.position_id {
        ensure_position(db, position_id).await?;
    }
    if let Some(manager_id) = input.reports_to {
        ensure_no_reporting_cycle(db, Some(id), manager_id).await?;
    }

    let mut active: employees::ActiveModel = existing.into();
    if let Some(value) = &input.first_name {
        active.first_name = Set(required("first_name", value, 100)?);
    }
    if let Some(value) = &input.last_name {
        active.last_name = Set(required("last_name", value, 100)?);
    }
    if let Some(value) = &input.email {
        active.email = Set(normalize_email(value)?);
    }
    if input.phone.is_some() {
        active.phone = Set(optional("phone", input.phone.clone(), 32)?);
    }
    if let Some(value) = &input.cnic {
        active.cnic = Set(validate_cnic(value)?);
    }
    if let Some(value) = &input.department {
        active.department = Set(required("department", value, 100)?);
    }
    if let Some(value) = input.base_salary_cents {
        active.base_salary_cents = Set(non_negative_cents("base_salary_cents", value)?);
    }
    if input.gender.is_some() {
        active.gender = Set(input.gender);
    }
    if input.position_id.is_some() {
        active.position_id = Set(input.position_id);
    }
    if input.reports_to.is_some() {
        active.reports_to = Set(input.reports_to);
    }
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    active.date_of_birth = Set(date_of_birth);
    active.hire_date = Set(hire_date);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = employees::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("employee", id));
    }
    info!(employee_id = %id, "employee deleted");
    Ok(())
}
