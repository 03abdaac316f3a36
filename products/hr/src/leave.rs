//! Leave requests, approvals and yearly balances.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Utc};
use entity::leaves::{self, LeaveType, Status};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::validation::{optional, page_limit};
use crate::{HrError, HrResult, employees};

/// Yearly allocation per leave type. `None` means unlimited.
pub fn allocation(leave_type: LeaveType) -> Option<i32> {
    match leave_type {
        LeaveType::Annual => Some(20),
        LeaveType::Sick => Some(10),
        LeaveType::Casual => Some(7),
        LeaveType::Maternity => Some(90),
        LeaveType::Paternity => Some(10),
        LeaveType::Unpaid => None,
    }
}

const ALL_TYPES: [LeaveType; 6] = [
    LeaveType::Annual,
    LeaveType::Sick,
    LeaveType::Casual,
    LeaveType::Maternity,
    LeaveType::Paternity,
    LeaveType::Unpaid,
];

/// Inclusive calendar length of a leave. Weekends count.
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> HrResult<i32> {
    if end < start {
        return Err(HrError::validation("end_date must not be before start_date"));
    }
    let days = (end - start).num_days() + 1;
    i32::try_from(days).map_err(|_| HrError::validation("leave is too long"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaveBalance {
    pub leave_type: LeaveType,
    pub allocated: Option<i32>,
    pub used: i32,
    pub remaining: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLeaveInput {
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLeaveInput {
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionInput {
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaveFilter {
    pub employee_id: Option<Uuid>,
    pub status: Option<Status>,
    pub leave_type: Option<LeaveType>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<leaves::Model> {
    leaves::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("leave", id))
}

pub async fn list<C: ConnectionTrait>(db: &C, filter: LeaveFilter) -> HrResult<Vec<leaves::Model>> {
    let limit = page_limit(filter.limit)?;
    let mut query = leaves::Entity::find();
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(leaves::Column::EmployeeId.eq(employee_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(leaves::Column::Status.eq(status));
    }
    if let Some(leave_type) = filter.leave_type {
        query = query.filter(leaves::Column::LeaveType.eq(leave_type));
    }
    Ok(query
        .order_by_desc(leaves::Column::StartDate)
        .order_by_asc(leaves::Column::Id)
        .limit(limit)
        .offset(filter.offset.unwrap_or(0))
        .all(db)
        .await?)
}

/// Rejects a range that overlaps another pending or approved leave.
async fn ensure_no_overlap<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    exclude: Option<Uuid>,
) -> HrResult<()> {
    let mut query = leaves::Entity::find()
        .filter(leaves::Column::EmployeeId.eq(employee_id))
        .filter(leaves::Column::Status.is_in([Status::Pending, Status::Approved]))
        .filter(leaves::Column::StartDate.lte(end))
        .filter(leaves::Column::EndDate.gte(start));
    if let Some(id) = exclude {
        query = query.filter(leaves::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(HrError::Conflict(
            "leave overlaps an existing request".to_string(),
        ));
    }
    Ok(())
}

#[instrument(skip(db, input), fields(employee_id = %input.employee_id))]
pub async fn create<C: ConnectionTrait>(db: &C, input: NewLeaveInput) -> HrResult<leaves::Model> {
    let days = leave_days(input.start_date, input.end_date)?;
    employees::get(db, input.employee_id).await?;
    ensure_no_overlap(db, input.employee_id, input.start_date, input.end_date, None).await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = leaves::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(input.employee_id),
        leave_type: Set(input.leave_type),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        days: Set(days),
        reason: Set(optional("reason", input.reason, 2000)?),
        status: Set(Status::Pending),
        approved_by: Set(None),
        decided_at: Set(None),
        decision_note: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(leave_id = %model.id, days, "leave requested");
    Ok(model)
}

/// Edits a request that has not been decided yet.
#[instrument(skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateLeaveInput,
) -> HrResult<leaves::Model> {
    let existing = get(db, id).await?;
    if existing.status != Status::Pending {
        return Err(HrError::validation("only pending leave can be edited"));
    }
    let start = input.start_date.unwrap_or(existing.start_date);
    let end = input.end_date.unwrap_or(existing.end_date);
    let days = leave_days(start, end)?;
    ensure_no_overlap(db, existing.employee_id, start, end, Some(id)).await?;
    let mut active: leaves::ActiveModel = existing.into();
    if let Some(leave_type) = input.leave_type {
        active.leave_type = Set(leave_type);
    }
    if input.reason.is_some() {
        active.reason = Set(optional("reason", input.reason, 2000)?);
    }
    active.start_date = Set(start);
    active.end_date = Set(end);
    active.days = Set(days);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = leaves::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("leave", id));
    }
    Ok(())
}

/// Approved days per leave type for leaves starting in `year`.
pub async fn used_days<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
    year: i32,
) -> HrResult<BTreeMap<LeaveType, i32>> {
    let (first, last) = year_bounds(year)?;
    let approved = leaves::Entity::find()
        .filter(leaves::Column::EmployeeId.eq(employee_id))
        .filter(leaves::Column::Status.eq(Status::Approved))
        .filter(leaves::Column::StartDate.between(first, last))
        .all(db)
        .await?;
    let mut used = BTreeMap::new();
    for leave in approved {
        *used.entry(leave.leave_type).or_insert(0) += leave.days;
    }
    Ok(used)
}

fn year_bounds(year: i32) -> HrResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1);
    let last = NaiveDate::from_ymd_opt(year, 12, 31);
    first
        .zip(last)
        .ok_or_else(|| HrError::validation(format!("invalid year {year}")))
}

pub async fn balance<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
    year: i32,
) -> HrResult<Vec<LeaveBalance>> {
    employees::get(db, employee_id).await?;
    let used = used_days(db, employee_id, year).await?;
    Ok(ALL_TYPES
        .iter()
        .map(|&leave_type| {
            let used = used.get(&leave_type).copied().unwrap_or(0);
            let allocated = allocation(leave_type);
            LeaveBalance {
                leave_type,
                allocated,
                used,
                remaining: allocated.map(|total| (total - used).max(0)),
            }
        })
        .collect())
}

async fn decide<C: ConnectionTrait>(
    db: &C,
    existing: leaves::Model,
    status: Status,
    approver: Option<Uuid>,
    note: Option<String>,
) -> HrResult<leaves::Model> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: leaves::ActiveModel = existing.into();
    active.status = Set(status);
    active.approved_by = Set(approver);
    active.decided_at = Set(Some(now));
    active.decision_note = Set(optional("note", note, 2000)?);
    active.updated_at = Set(now);
    Ok(active.update(db).await?)
}

/// Approves a pending leave if the employee has enough balance left.
#[instrument(skip(db, input))]
pub async fn approve<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    approver: Option<Uuid>,
    input: DecisionInput,
) -> HrResult<leaves::Model> {
    let existing = get(db, id).await?;
    if existing.status != Status::Pending {
        return Err(HrError::validation("only pending leave can be approved"));
    }
    if let Some(total) = allocation(existing.leave_type) {
        let used = used_days(db, existing.employee_id, existing.start_date.year())
            .await?
            .get(&existing.leave_type)
            .copied()
            .unwrap_or(0);
        let remaining = total - used;
        if remaining < existing.days {
            return Err(HrError::validation(format!(
                "insufficient {:?} balance: {remaining} day(s) remaining, {} requested",
                existing.leave_type, existing.days
            )));
        }
    }
    let model = decide(db, existing, Status::Approved, approver, input.note).await?;
    info!(leave_id = %model.id, "leave approved");
    Ok(model)
}

#[instrument(skip(db, input))]
pub async fn reject<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    approver: Option<Uuid>,
    input: DecisionInput,
) -> HrResult<leaves::Model> {
    let existing = get(db, id).await?;
    if existing.status != Status::Pending {
        return Err(HrError::validation("only pending leave can be rejected"));
    }
    decide(db, existing, Status::Rejected, approver, input.note).await
}

#[instrument(skip(db))]
pub async fn cancel<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<leaves::Model> {
    let existing = get(db, id).await?;
    if !matches!(existing.status, Status::Pending | Status::Approved) {
        return Err(HrError::validation(
            "only pending or approved leave can be cancelled",
        ));
    }
    let mut active: leaves::ActiveModel = existing.into();
    active.status = Set(Status::Cancelled);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

pub async fn pending_count<C: ConnectionTrait>(db: &C) -> HrResult<u64> {
    Ok(leaves::Entity::find()
        .filter(leaves::Column::Status.eq(Status::Pending))
        .count(db)
        .await?)
}

/// Distinct employees with approved leave covering `day`.
pub async fn on_leave<C: ConnectionTrait>(db: &C, day: NaiveDate) -> HrResult<Vec<Uuid>> {
    let mut ids: Vec<Uuid> = leaves::Entity::find()
        .select_only()
        .column(leaves::Column::EmployeeId)
        .filter(leaves::Column::Status.eq(Status::Approved))
        .filter(leaves::Column::StartDate.lte(day))
        .filter(leaves::Column::EndDate.gte(day))
        .into_tuple()
        .all(db)
        .await?;
    ids.sort();
    ids.dedup();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leave_days_is_inclusive() {
        assert_eq!(leave_days(date(2026, 10, 12), date(2026, 10, 12)).unwrap(), 1);
        assert_eq!(leave_days(date(2026, 10, 12), date(2026, 10, 16)).unwrap(), 5);
        assert_eq!(leave_days(date(2026, 12, 30), date(2027, 1, 2)).unwrap(), 4);
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(matches!(
            leave_days(date(2026, 10, 16), date(2026, 10, 12)),
            Err(HrError::Validation(_))
        ));
    }

    #[test]
    fn unpaid_leave_is_unlimited() {
        assert_eq!(allocation(LeaveType::Unpaid), None);
        assert_eq!(allocation(LeaveType::Annual), Some(20));
        assert_eq!(allocation(LeaveType::Maternity), Some(90));
    }
}
