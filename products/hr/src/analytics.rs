//! Read-only aggregates behind the dashboard.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use entity::attendance;
use entity::employees::{self, Status};
use entity::positions;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;

use crate::learning::{self, CompletionRate};
use crate::payroll::{self, PayrollSummary};
use crate::{HrResult, compliance, leave, recruitment};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Headcount {
    pub total: u64,
    pub active: u64,
    pub on_leave: u64,
    pub terminated: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentHeadcount {
    pub department: String,
    pub headcount: u64,
}

/// Today's attendance by status. `unmarked` counts active employees with no
/// record for the day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceBreakdown {
    pub present: u64,
    pub late: u64,
    pub absent: u64,
    pub half_day: u64,
    pub remote: u64,
    pub unmarked: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub headcount: Headcount,
    pub departments: Vec<DepartmentHeadcount>,
    pub pending_leave: u64,
    pub on_leave_today: u64,
    pub attendance_today: AttendanceBreakdown,
    pub open_positions: u64,
    pub open_postings: u64,
    pub latest_payroll: Option<PayrollSummary>,
    pub mandatory_training: CompletionRate,
    pub open_violations: u64,
}

pub fn headcount_of(staff: &[employees::Model]) -> Headcount {
    let mut counts = Headcount {
        total: staff.len() as u64,
        ..Headcount::default()
    };
    for employee in staff {
        match employee.status {
            Status::Active => counts.active += 1,
            Status::OnLeave => counts.on_leave += 1,
            Status::Terminated => counts.terminated += 1,
        }
    }
    counts
}

/// Non-terminated employees per department, alphabetical.
pub fn departments_of(staff: &[employees::Model]) -> Vec<DepartmentHeadcount> {
    let mut by_department: BTreeMap<&str, u64> = BTreeMap::new();
    for employee in staff.iter().filter(|e| e.status != Status::Terminated) {
        *by_department.entry(employee.department.as_str()).or_default() += 1;
    }
    by_department
        .into_iter()
        .map(|(department, headcount)| DepartmentHeadcount {
            department: department.to_string(),
            headcount,
        })
        .collect()
}

pub async fn department_headcount<C: ConnectionTrait>(
    db: &C,
) -> HrResult<Vec<DepartmentHeadcount>> {
    let staff = employees::Entity::find().all(db).await?;
    Ok(departments_of(&staff))
}

async fn attendance_on<C: ConnectionTrait>(
    db: &C,
    day: NaiveDate,
    active: u64,
) -> HrResult<AttendanceBreakdown> {
    let records = attendance::Entity::find()
        .filter(attendance::Column::WorkDate.eq(day))
        .all(db)
        .await?;
    let mut breakdown = AttendanceBreakdown::default();
    for record in &records {
        match record.status {
            attendance::Status::Present => breakdown.present += 1,
            attendance::Status::Late => breakdown.late += 1,
            attendance::Status::Absent => breakdown.absent += 1,
            attendance::Status::HalfDay => breakdown.half_day += 1,
            attendance::Status::Remote => breakdown.remote += 1,
        }
    }
    breakdown.unmarked = active.saturating_sub(records.len() as u64);
    Ok(breakdown)
}

#[instrument(skip(db))]
pub async fn dashboard<C: ConnectionTrait>(db: &C, today: NaiveDate) -> HrResult<Dashboard> {
    let staff = employees::Entity::find().all(db).await?;
    let headcount = headcount_of(&staff);
    let attendance_today = attendance_on(db, today, headcount.active).await?;
    let open_positions = positions::Entity::find()
        .filter(positions::Column::IsOpen.eq(true))
        .count(db)
        .await?;
    let latest_payroll = match payroll::latest_period(db).await? {
        Some(period) => Some(payroll::summary(db, &period).await?),
        None => None,
    };
    Ok(Dashboard {
        date: today,
        departments: departments_of(&staff),
        headcount,
        pending_leave: leave::pending_count(db).await?,
        on_leave_today: leave::on_leave(db, today).await?.len() as u64,
        attendance_today,
        open_positions,
        open_postings: recruitment::open_postings_count(db).await?,
        latest_payroll,
        mandatory_training: learning::mandatory_completion(db).await?,
        open_violations: compliance::open_violations_count(db).await?,
    })
}
