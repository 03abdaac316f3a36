//! Daily attendance: manual records plus check-in/check-out.
//!
//! Times are evaluated in UTC.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use entity::attendance::{self, Status};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::validation::{optional, page_limit};
use crate::{HrError, HrResult, employees};

/// Check-ins strictly after this time are recorded as late.
pub const LATE_AFTER: NaiveTime = match NaiveTime::from_hms_opt(9, 15, 0) {
    Some(time) => time,
    None => panic!("invalid late threshold"),
};

/// Shifts shorter than this are downgraded to a half day at check-out.
pub const HALF_DAY_HOURS: f64 = 4.0;

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceView {
    #[serde(flatten)]
    pub record: attendance::Model,
    pub worked_hours: Option<f64>,
}

impl From<attendance::Model> for AttendanceView {
    fn from(record: attendance::Model) -> Self {
        let worked_hours = match (record.check_in, record.check_out) {
            (Some(check_in), Some(check_out)) => worked_hours(check_in, check_out),
            _ => None,
        };
        Self {
            record,
            worked_hours,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAttendanceInput {
    pub employee_id: Uuid,
    pub work_date: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: Status,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAttendanceInput {
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: Option<Status>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceFilter {
    pub employee_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<Status>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Hours between check-in and check-out, rounded to two decimals. `None` when
/// check-out does not come after check-in.
pub fn worked_hours(
    check_in: DateTimeWithTimeZone,
    check_out: DateTimeWithTimeZone,
) -> Option<f64> {
    if check_out <= check_in {
        return None;
    }
    let seconds = (check_out - check_in).num_milliseconds() as f64 / 1_000.0;
    Some((seconds / 3_600.0 * 100.0).round() / 100.0)
}

pub fn status_for_check_in(at: DateTime<Utc>) -> Status {
    if at.time() > LATE_AFTER {
        Status::Late
    } else {
        Status::Present
    }
}

fn validate_times(
    check_in: Option<DateTimeWithTimeZone>,
    check_out: Option<DateTimeWithTimeZone>,
) -> HrResult<()> {
    match (check_in, check_out) {
        (None, Some(_)) => Err(HrError::validation("check_out requires check_in")),
        (Some(start), Some(end)) if end <= start => {
            Err(HrError::validation("check_out must be after check_in"))
        }
        _ => Ok(()),
    }
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<attendance::Model> {
    attendance::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("attendance", id))
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    filter: AttendanceFilter,
) -> HrResult<Vec<attendance::Model>> {
    let limit = page_limit(filter.limit)?;
    let mut query = attendance::Entity::find();
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(attendance::Column::EmployeeId.eq(employee_id));
    }
    if let Some(from) = filter.from {
        query = query.filter(attendance::Column::WorkDate.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(attendance::Column::WorkDate.lte(to));
    }
    if let Some(status) = filter.status {
        query = query.filter(attendance::Column::Status.eq(status));
    }
    Ok(query
        .order_by_desc(attendance::Column::WorkDate)
        .order_by_asc(attendance::Column::Id)
        .limit(limit)
        .offset(filter.offset.unwrap_or(0))
        .all(db)
        .await?)
}

async fn find_day<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
    day: NaiveDate,
) -> HrResult<Option<attendance::Model>> {
    Ok(attendance::Entity::find()
        .filter(attendance::Column::EmployeeId.eq(employee_id))
        .filter(attendance::Column::WorkDate.eq(day))
        .one(db)
        .await?)
}

#[instrument(skip(db, input), fields(employee_id = %input.employee_id))]
pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: NewAttendanceInput,
) -> HrResult<attendance::Model> {
    employees::get(db, input.employee_id).await?;
    let check_in = input.check_in.map(DateTimeWithTimeZone::from);
    let check_out = input.check_out.map(DateTimeWithTimeZone::from);
    validate_times(check_in, check_out)?;
    if find_day(db, input.employee_id, input.work_date).await?.is_some() {
        return Err(HrError::Conflict(format!(
            "attendance for {} already recorded",
            input.work_date
        )));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    Ok(attendance::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(input.employee_id),
        work_date: Set(input.work_date),
        check_in: Set(check_in),
        check_out: Set(check_out),
        status: Set(input.status),
        notes: Set(optional("notes", input.notes, 2000)?),
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
    input: UpdateAttendanceInput,
) -> HrResult<attendance::Model> {
    let existing = get(db, id).await?;
    let check_in = input
        .check_in
        .map(DateTimeWithTimeZone::from)
        .or(existing.check_in);
    let check_out = input
        .check_out
        .map(DateTimeWithTimeZone::from)
        .or(existing.check_out);
    validate_times(check_in, check_out)?;
    let mut active: attendance::ActiveModel = existing.into();
    active.check_in = Set(check_in);
    active.check_out = Set(check_out);
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    if input.notes.is_some() {
        active.notes = Set(optional("notes", input.notes, 2000)?);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let result = attendance::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(HrError::not_found("attendance", id));
    }
    Ok(())
}

/// Opens today's record for the employee.
#[instrument(skip(db))]
pub async fn check_in<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
    at: DateTime<Utc>,
) -> HrResult<attendance::Model> {
    employees::get(db, employee_id).await?;
    let day = at.date_naive();
    let stamp: DateTimeWithTimeZone = at.into();
    let status = status_for_check_in(at);
    let record = match find_day(db, employee_id, day).await? {
        Some(existing) if existing.check_in.is_some() => {
            return Err(HrError::Conflict(format!("already checked in on {day}")));
        }
        Some(existing) => {
            let mut active: attendance::ActiveModel = existing.into();
            active.check_in = Set(Some(stamp));
            active.status = Set(status);
            active.updated_at = Set(stamp);
            active.update(db).await?
        }
        None => {
            attendance::ActiveModel {
                id: Set(Uuid::new_v4()),
                employee_id: Set(employee_id),
                work_date: Set(day),
                check_in: Set(Some(stamp)),
                check_out: Set(None),
                status: Set(status),
                notes: Set(None),
                created_at: Set(stamp),
                updated_at: Set(stamp),
            }
            .insert(db)
            .await?
        }
    };
    info!(attendance_id = %record.id, status = ?record.status, "checked in");
    Ok(record)
}

/// Closes today's record. Short shifts become half days.
#[instrument(skip(db))]
pub async fn check_out<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
    at: DateTime<Utc>,
) -> HrResult<attendance::Model> {
    let day = at.date_naive();
    let existing = find_day(db, employee_id, day)
        .await?
        .ok_or_else(|| HrError::validation(format!("no check-in recorded on {day}")))?;
    let Some(check_in) = existing.check_in else {
        return Err(HrError::validation(format!("no check-in recorded on {day}")));
    };
    if existing.check_out.is_some() {
        return Err(HrError::Conflict(format!("already checked out on {day}")));
    }
    let stamp: DateTimeWithTimeZone = at.into();
    let hours = worked_hours(check_in, stamp)
        .ok_or_else(|| HrError::validation("check_out must be after check_in"))?;
    let status = if hours < HALF_DAY_HOURS {
        Status::HalfDay
    } else {
        existing.status
    };
    let mut active: attendance::ActiveModel = existing.into();
    active.check_out = Set(Some(stamp));
    active.status = Set(status);
    active.updated_at = Set(stamp);
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 12, h, m, 0).single().unwrap()
    }

    #[test]
    fn worked_hours_rounds_to_two_decimals() {
        assert_eq!(worked_hours(at(9, 0).into(), at(17, 20).into()), Some(8.33));
        assert_eq!(worked_hours(at(9, 0).into(), at(9, 0).into()), None);
        assert_eq!(worked_hours(at(10, 0).into(), at(9, 0).into()), None);
        let seconds_later = at(9, 0) + chrono::Duration::seconds(30);
        assert_eq!(worked_hours(at(9, 0).into(), seconds_later.into()), Some(0.01));
    }

    #[test]
    fn late_threshold_is_exclusive() {
        assert_eq!(status_for_check_in(at(9, 15)), Status::Present);
        assert_eq!(status_for_check_in(at(9, 16)), Status::Late);
        assert_eq!(status_for_check_in(at(8, 0)), Status::Present);
    }

    #[test]
    fn check_out_requires_check_in() {
        assert!(validate_times(None, Some(at(17, 0).into())).is_err());
        assert!(validate_times(Some(at(17, 0).into()), Some(at(9, 0).into())).is_err());
        assert!(validate_times(Some(at(9, 0).into()), None).is_ok());
    }
}
