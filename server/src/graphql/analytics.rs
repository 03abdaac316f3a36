//! GraphQL views of the dashboard aggregates. Money stays in cents.

use async_graphql::SimpleObject;
use chrono::NaiveDate;
use products_hr::analytics::{AttendanceBreakdown, Dashboard, DepartmentHeadcount, Headcount};
use products_hr::learning::CompletionRate;
use products_hr::leave::LeaveBalance;
use products_hr::payroll::PayrollSummary;
use sea_orm::ActiveEnum;

#[derive(Clone, Debug, SimpleObject)]
pub struct HeadcountPayload {
    pub total: u64,
    pub active: u64,
    pub on_leave: u64,
    pub terminated: u64,
}

impl From<Headcount> for HeadcountPayload {
    fn from(value: Headcount) -> Self {
        Self {
            total: value.total,
            active: value.active,
            on_leave: value.on_leave,
            terminated: value.terminated,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DepartmentPayload {
    pub department: String,
    pub headcount: u64,
}

impl From<DepartmentHeadcount> for DepartmentPayload {
    fn from(value: DepartmentHeadcount) -> Self {
        Self {
            department: value.department,
            headcount: value.headcount,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct AttendancePayload {
    pub present: u64,
    pub late: u64,
    pub absent: u64,
    pub half_day: u64,
    pub remote: u64,
    pub unmarked: u64,
}

impl From<AttendanceBreakdown> for AttendancePayload {
    fn from(value: AttendanceBreakdown) -> Self {
        Self {
            present: value.present,
            late: value.late,
            absent: value.absent,
            half_day: value.half_day,
            remote: value.remote,
            unmarked: value.unmarked,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct PayrollSummaryPayload {
    pub period: String,
    pub records: u64,
    pub draft: u64,
    pub processed: u64,
    pub paid: u64,
    pub total_basic_cents: i64,
    pub total_allowances_cents: i64,
    pub total_deductions_cents: i64,
    pub total_tax_cents: i64,
    pub total_net_cents: i64,
}

impl From<PayrollSummary> for PayrollSummaryPayload {
    fn from(value: PayrollSummary) -> Self {
        Self {
            period: value.period,
            records: value.records,
            draft: value.draft,
            processed: value.processed,
            paid: value.paid,
            total_basic_cents: value.total_basic_cents,
            total_allowances_cents: value.total_allowances_cents,
            total_deductions_cents: value.total_deductions_cents,
            total_tax_cents: value.total_tax_cents,
            total_net_cents: value.total_net_cents,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct CompletionPayload {
    pub enrolled: u64,
    pub completed: u64,
    pub rate: f64,
}

impl From<CompletionRate> for CompletionPayload {
    fn from(value: CompletionRate) -> Self {
        Self {
            enrolled: value.enrolled,
            completed: value.completed,
            rate: value.rate,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DashboardPayload {
    pub date: NaiveDate,
    pub headcount: HeadcountPayload,
    pub departments: Vec<DepartmentPayload>,
    pub pending_leave: u64,
    pub on_leave_today: u64,
    pub attendance_today: AttendancePayload,
    pub open_positions: u64,
    pub open_postings: u64,
    pub latest_payroll: Option<PayrollSummaryPayload>,
    pub mandatory_training: CompletionPayload,
    pub open_violations: u64,
}

impl From<Dashboard> for DashboardPayload {
    fn from(value: Dashboard) -> Self {
        Self {
            date: value.date,
            headcount: value.headcount.into(),
            departments: value.departments.into_iter().map(Into::into).collect(),
            pending_leave: value.pending_leave,
            on_leave_today: value.on_leave_today,
            attendance_today: value.attendance_today.into(),
            open_positions: value.open_positions,
            open_postings: value.open_postings,
            latest_payroll: value.latest_payroll.map(Into::into),
            mandatory_training: value.mandatory_training.into(),
            open_violations: value.open_violations,
        }
    }
}

/// `allocated` and `remaining` are null for unlimited leave types.
#[derive(Clone, Debug, SimpleObject)]
pub struct LeaveBalancePayload {
    pub leave_type: String,
    pub allocated: Option<i32>,
    pub used: i32,
    pub remaining: Option<i32>,
}

impl From<LeaveBalance> for LeaveBalancePayload {
    fn from(value: LeaveBalance) -> Self {
        Self {
            leave_type: value.leave_type.to_value(),
            allocated: value.allocated,
            used: value.used,
            remaining: value.remaining,
        }
    }
}
