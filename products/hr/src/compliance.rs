//! Audits, policy violations and employee certifications.

use chrono::{Duration, NaiveDate, Utc};
use entity::audits;
use entity::certifications;
use entity::violations::{self, Severity};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::validation::{optional, required};
use crate::{HrError, HrResult, employees};

pub const MAX_EXPIRY_WINDOW_DAYS: i64 = 3650;

// Audits

#[derive(Debug, Clone, Deserialize)]
pub struct NewAuditInput {
    pub title: String,
    pub area: String,
    pub scheduled_for: NaiveDate,
    pub findings: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAuditInput {
    pub title: Option<String>,
    pub area: Option<String>,
    pub scheduled_for: Option<NaiveDate>,
    pub status: Option<audits::Status>,
    pub findings: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    pub status: Option<audits::Status>,
    pub area: Option<String>,
}

pub async fn get_audit<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<audits::Model> {
    audits::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("audit", id))
}

pub async fn list_audits<C: ConnectionTrait>(
    db: &C,
    filter: AuditFilter,
) -> HrResult<Vec<audits::Model>> {
    let mut query = audits::Entity::find();
    if let Some(status) = filter.status {
        query = query.filter(audits::Column::Status.eq(status));
    }
    if let Some(area) = filter.area.as_deref().map(str::trim) {
        if !area.is_empty() {
            query = query.filter(audits::Column::Area.eq(area));
        }
    }
    Ok(query
        .order_by_asc(audits::Column::ScheduledFor)
        .order_by_asc(audits::Column::Id)
        .all(db)
        .await?)
}

#[instrument(skip(db, input))]
pub async fn create_audit<C: ConnectionTrait>(
    db: &C,
    input: NewAuditInput,
) -> HrResult<audits::Model> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    Ok(audits::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(required("title", &input.title, 200)?),
        area: Set(required("area", &input.area, 100)?),
        scheduled_for: Set(input.scheduled_for),
        status: Set(audits::Status::Scheduled),
        findings: Set(optional("findings", input.findings, 8000)?),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

#[instrument(skip(db, input))]
pub async fn update_audit<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateAuditInput,
) -> HrResult<audits::Model> {
    let existing = get_audit(db, id).await?;
    let mut active: audits::ActiveModel = existing.into();
    if let Some(value) = &input.title {
        active.title = Set(required("title", value, 200)?);
    }
    if let Some(value) = &input.area {
        active.area = Set(required("area", value, 100)?);
    }
    if let Some(date) = input.scheduled_for {
        active.scheduled_for = Set(date);
    }
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    if input.findings.is_some() {
        active.findings = Set(optional("findings", input.findings, 8000)?);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete_audit<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = audits::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("audit", id));
    }
    Ok(())
}

// Violations

#[derive(Debug, Clone, Deserialize)]
pub struct NewViolationInput {
    pub employee_id: Option<Uuid>,
    pub policy: String,
    pub severity: Severity,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateViolationInput {
    pub employee_id: Option<Uuid>,
    pub policy: Option<String>,
    pub severity: Option<Severity>,
    pub description: Option<String>,
    pub status: Option<violations::Status>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViolationFilter {
    pub employee_id: Option<Uuid>,
    pub status: Option<violations::Status>,
    pub severity: Option<Severity>,
}

pub async fn get_violation<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<violations::Model> {
    violations::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("violation", id))
}

pub async fn list_violations<C: ConnectionTrait>(
    db: &C,
    filter: ViolationFilter,
) -> HrResult<Vec<violations::Model>> {
    let mut query = violations::Entity::find();
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(violations::Column::EmployeeId.eq(employee_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(violations::Column::Status.eq(status));
    }
    if let Some(severity) = filter.severity {
        query = query.filter(violations::Column::Severity.eq(severity));
    }
    Ok(query
        .order_by_desc(violations::Column::ReportedAt)
        .order_by_asc(violations::Column::Id)
        .all(db)
        .await?)
}

#[instrument(skip(db, input))]
pub async fn report_violation<C: ConnectionTrait>(
    db: &C,
    input: NewViolationInput,
) -> HrResult<violations::Model> {
    if let Some(employee_id) = input.employee_id {
        employees::get(db, employee_id).await?;
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = violations::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(input.employee_id),
        policy: Set(required("policy", &input.policy, 200)?),
        severity: Set(input.severity),
        description: Set(optional("description", input.description, 8000)?),
        status: Set(violations::Status::Open),
        reported_at: Set(now),
        resolved_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(violation_id = %model.id, severity = ?model.severity, "violation reported");
    Ok(model)
}

/// Field edits. Moving to `RESOLVED` goes through [`resolve_violation`].
#[instrument(skip(db, input))]
pub async fn update_violation<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateViolationInput,
) -> HrResult<violations::Model> {
    let existing = get_violation(db, id).await?;
    if let Some(employee_id) = input.employee_id {
        employees::get(db, employee_id).await?;
    }
    if input.status == Some(violations::Status::Resolved) {
        return Err(HrError::validation("use resolve to close a violation"));
    }
    let reopened = existing.status == violations::Status::Resolved && input.status.is_some();
    let mut active: violations::ActiveModel = existing.into();
    if input.employee_id.is_some() {
        active.employee_id = Set(input.employee_id);
    }
    if let Some(value) = &input.policy {
        active.policy = Set(required("policy", value, 200)?);
    }
    if let Some(severity) = input.severity {
        active.severity = Set(severity);
    }
    if input.description.is_some() {
        active.description = Set(optional("description", input.description, 8000)?);
    }
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    if reopened {
        active.resolved_at = Set(None);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn resolve_violation<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> HrResult<violations::Model> {
    let existing = get_violation(db, id).await?;
    if existing.status == violations::Status::Resolved {
        return Err(HrError::validation("violation is already resolved"));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: violations::ActiveModel = existing.into();
    active.status = Set(violations::Status::Resolved);
    active.resolved_at = Set(Some(now));
    active.updated_at = Set(now);
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete_violation<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = violations::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("violation", id));
    }
    Ok(())
}

pub async fn open_violations_count<C: ConnectionTrait>(db: &C) -> HrResult<u64> {
    Ok(violations::Entity::find()
        .filter(violations::Column::Status.ne(violations::Status::Resolved))
        .count(db)
        .await?)
}

// Certifications

#[derive(Debug, Clone, Deserialize)]
pub struct NewCertificationInput {
    pub employee_id: Uuid,
    pub name: String,
    pub issuer: String,
    pub issued_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCertificationInput {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CertificationFilter {
    pub employee_id: Option<Uuid>,
}

fn validate_validity(issued_on: NaiveDate, expires_on: Option<NaiveDate>) -> HrResult<()> {
    if expires_on.is_some_and(|expiry| expiry < issued_on) {
        return Err(HrError::validation("expires_on must not be before issued_on"));
    }
    Ok(())
}

pub async fn get_certification<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> HrResult<certifications::Model> {
    certifications::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("certification", id))
}

pub async fn list_certifications<C: ConnectionTrait>(
    db: &C,
    filter: CertificationFilter,
) -> HrResult<Vec<certifications::Model>> {
    let mut query = certifications::Entity::find();
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(certifications::Column::EmployeeId.eq(employee_id));
    }
    Ok(query
        .order_by_asc(certifications::Column::Name)
        .order_by_asc(certifications::Column::Id)
        .all(db)
        .await?)
}

#[instrument(skip(db, input), fields(employee_id = %input.employee_id))]
pub async fn create_certification<C: ConnectionTrait>(
    db: &C,
    input: NewCertificationInput,
) -> HrResult<certifications::Model> {
    validate_validity(input.issued_on, input.expires_on)?;
    employees::get(db, input.employee_id).await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    Ok(certifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(input.employee_id),
        name: Set(required("name", &input.name, 200)?),
        issuer: Set(required("issuer", &input.issuer, 200)?),
        issued_on: Set(input.issued_on),
        expires_on: Set(input.expires_on),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

#[instrument(skip(db, input))]
pub async fn update_certification<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateCertificationInput,
) -> HrResult<certifications::Model> {
    let existing = get_certification(db, id).await?;
    let issued_on = input.issued_on.unwrap_or(existing.issued_on);
    let expires_on = input.expires_on.or(existing.expires_on);
    validate_validity(issued_on, expires_on)?;
    let mut active: certifications::ActiveModel = existing.into();
    if let Some(value) = &input.name {
        active.name = Set(required("name", value, 200)?);
    }
    if let Some(value) = &input.issuer {
        active.issuer = Set(required("issuer", value, 200)?);
    }
    active.issued_on = Set(issued_on);
    active.expires_on = Set(expires_on);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete_certification<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = certifications::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("certification", id));
    }
    Ok(())
}

/// Certifications expiring between `today` and `today + within_days`,
/// soonest first. Already-expired ones are excluded.
pub async fn expiring<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
    within_days: i64,
) -> HrResult<Vec<certifications::Model>> {
    if !(0..=MAX_EXPIRY_WINDOW_DAYS).contains(&within_days) {
        return Err(HrError::validation(format!(
            "within_days must be between 0 and {MAX_EXPIRY_WINDOW_DAYS}"
        )));
    }
    let horizon = today + Duration::days(within_days);
    Ok(certifications::Entity::find()
        .filter(certifications::Column::ExpiresOn.between(today, horizon))
        .order_by_asc(certifications::Column::ExpiresOn)
        .all(db)
        .await?)
}
