//! Monthly payroll runs.
//!
//! Amounts are integer cents. A record is computed once at generation time
//! from the employee's base salary and approved unpaid leave, then moves
//! `DRAFT -> PROCESSED -> PAID`.

use chrono::{NaiveDate, Utc};
use entity::employees;
use entity::leaves::{self, LeaveType};
use entity::payroll::{self, Status};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::validation::{non_negative_cents, page_limit, period_bounds, validate_period};
use crate::{HrError, HrResult};

/// House rent allowance, in basis points of basic.
pub const HOUSE_RENT_BP: i64 = 1_000;
/// Medical allowance, in basis points of basic.
pub const MEDICAL_BP: i64 = 500;
/// Unpaid leave is deducted at basic / this many days.
pub const DAYS_PER_MONTH: i64 = 30;

/// `(inclusive upper bound of monthly basic in cents, rate in basis points)`.
/// The rate of the matching bracket applies to the whole basic.
pub const TAX_BRACKETS: [(i64, i64); 4] = [
    (5_000_000, 0),
    (10_000_000, 500),
    (20_000_000, 1_000),
    (40_000_000, 1_500),
];
pub const TOP_TAX_BP: i64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayBreakdown {
    pub basic_cents: i64,
    pub allowances_cents: i64,
    pub deductions_cents: i64,
    pub tax_cents: i64,
    pub net_cents: i64,
}

fn out_of_range() -> HrError {
    HrError::validation("payroll amount out of range")
}

fn share(amount: i64, basis_points: i64) -> i64 {
    (i128::from(amount) * i128::from(basis_points) / 10_000)
        .try_into()
        .unwrap_or(i64::MAX)
}

pub fn monthly_tax(basic_cents: i64) -> i64 {
    let rate = TAX_BRACKETS
        .iter()
        .find(|(upper, _)| basic_cents <= *upper)
        .map_or(TOP_TAX_BP, |(_, rate)| *rate);
    share(basic_cents, rate)
}

/// Net pay floored at zero. Fails when the components leave the `i64` range.
pub fn net_pay(basic: i64, allowances: i64, deductions: i64, tax: i64) -> HrResult<i64> {
    let net = basic
        .checked_add(allowances)
        .and_then(|gross| gross.checked_sub(deductions))
        .and_then(|net| net.checked_sub(tax))
        .ok_or_else(out_of_range)?;
    Ok(net.max(0))
}

pub fn compute(basic_cents: i64, unpaid_days: i64) -> HrResult<PayBreakdown> {
    let basic_cents = non_negative_cents("basic_cents", basic_cents.max(0))?;
    let allowances_cents = share(basic_cents, HOUSE_RENT_BP)
        .checked_add(share(basic_cents, MEDICAL_BP))
        .ok_or_else(out_of_range)?;
    let deductions_cents = unpaid_days
        .max(0)
        .checked_mul(basic_cents)
        .ok_or_else(out_of_range)?
        / DAYS_PER_MONTH;
    let tax_cents = monthly_tax(basic_cents);
    Ok(PayBreakdown {
        basic_cents,
        allowances_cents,
        deductions_cents,
        tax_cents,
        net_cents: net_pay(basic_cents, allowances_cents, deductions_cents, tax_cents)?,
    })
}

/// Approved unpaid leave days that fall inside `[first, last]`.
async fn unpaid_days<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
    first: NaiveDate,
    last: NaiveDate,
) -> HrResult<i64> {
    let overlapping = leaves::Entity::find()
        .filter(leaves::Column::EmployeeId.eq(employee_id))
        .filter(leaves::Column::LeaveType.eq(LeaveType::Unpaid))
        .filter(leaves::Column::Status.eq(leaves::Status::Approved))
        .filter(leaves::Column::StartDate.lte(last))
        .filter(leaves::Column::EndDate.gte(first))
        .all(db)
        .await?;
    Ok(overlapping
        .iter()
        .map(|leave| {
            let start = leave.start_date.max(first);
            let end = leave.end_date.min(last);
            (end - start).num_days() + 1
        })
        .sum())
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPayrollInput {
    pub employee_id: Uuid,
    pub period: String,
}

/// Manual adjustments to a draft. Net pay is recomputed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePayrollInput {
    pub allowances_cents: Option<i64>,
    pub deductions_cents: Option<i64>,
    pub tax_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayrollFilter {
    pub period: Option<String>,
    pub employee_id: Option<Uuid>,
    pub status: Option<Status>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PayrollSummary {
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

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<payroll::Model> {
    payroll::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("payroll", id))
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    filter: PayrollFilter,
) -> HrResult<Vec<payroll::Model>> {
    let limit = page_limit(filter.limit)?;
    let mut query = payroll::Entity::find();
    if let Some(period) = filter.period.as_deref() {
        query = query.filter(payroll::Column::Period.eq(validate_period(period)?));
    }
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(payroll::Column::EmployeeId.eq(employee_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(payroll::Column::Status.eq(status));
    }
    Ok(query
        .order_by_desc(payroll::Column::Period)
        .order_by_asc(payroll::Column::EmployeeId)
        .limit(limit)
        .offset(filter.offset.unwrap_or(0))
        .all(db)
        .await?)
}

async fn insert_for<C: ConnectionTrait>(
    db: &C,
    employee: &employees::Model,
    period: &str,
    bounds: (NaiveDate, NaiveDate),
    now: DateTimeWithTimeZone,
) -> HrResult<payroll::Model> {
    let unpaid = unpaid_days(db, employee.id, bounds.0, bounds.1).await?;
    let pay = compute(employee.base_salary_cents, unpaid)?;
    Ok(payroll::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(employee.id),
        period: Set(period.to_string()),
        basic_cents: Set(pay.basic_cents),
        allowances_cents: Set(pay.allowances_cents),
        deductions_cents: Set(pay.deductions_cents),
        tax_cents: Set(pay.tax_cents),
        net_cents: Set(pay.net_cents),
        status: Set(Status::Draft),
        paid_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

/// Payroll for a single employee, regardless of employment status.
#[instrument(skip(db, input), fields(employee_id = %input.employee_id))]
pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: NewPayrollInput,
) -> HrResult<payroll::Model> {
    let period = validate_period(&input.period)?;
    let bounds = period_bounds(&period)?;
    let employee = employees::Entity::find_by_id(input.employee_id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("employee", input.employee_id))?;
    let existing = payroll::Entity::find()
        .filter(payroll::Column::EmployeeId.eq(employee.id))
        .filter(payroll::Column::Period.eq(period.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(HrError::Conflict(format!(
            "payroll for {period} already exists"
        )));
    }
    insert_for(db, &employee, &period, bounds, Utc::now().into()).await
}

/// Creates a draft for every active employee that has none for `period`.
/// Returns only the records created by this call.
#[instrument(skip(db))]
pub async fn generate<C: ConnectionTrait>(db: &C, period: &str) -> HrResult<Vec<payroll::Model>> {
    let period = validate_period(period)?;
    let bounds = period_bounds(&period)?;
    let already: Vec<Uuid> = payroll::Entity::find()
        .select_only()
        .column(payroll::Column::EmployeeId)
        .filter(payroll::Column::Period.eq(period.as_str()))
        .into_tuple()
        .all(db)
        .await?;
    let active = employees::Entity::find()
        .filter(employees::Column::Status.eq(employees::Status::Active))
        .order_by_asc(employees::Column::EmployeeCode)
        .all(db)
        .await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut created = Vec::new();
    for employee in active.iter().filter(|e| !already.contains(&e.id)) {
        created.push(insert_for(db, employee, &period, bounds, now).await?);
    }
    info!(%period, created = created.len(), "payroll generated");
    Ok(created)
}

#[instrument(skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdatePayrollInput,
) -> HrResult<payroll::Model> {
    let existing = get(db, id).await?;
    if existing.status != Status::Draft {
        return Err(HrError::validation("only draft payroll can be adjusted"));
    }
    let allowances = match input.allowances_cents {
        Some(value) => non_negative_cents("allowances_cents", value)?,
        None => existing.allowances_cents,
    };
    let deductions = match input.deductions_cents {
        Some(value) => non_negative_cents("deductions_cents", value)?,
        None => existing.deductions_cents,
    };
    let tax = match input.tax_cents {
        Some(value) => non_negative_cents("tax_cents", value)?,
        None => existing.tax_cents,
    };
    let net = net_pay(existing.basic_cents, allowances, deductions, tax)?;
    let mut active: payroll::ActiveModel = existing.into();
    active.allowances_cents = Set(allowances);
    active.deductions_cents = Set(deductions);
    active.tax_cents = Set(tax);
    active.net_cents = Set(net);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<()> {
    let existing = get(db, id).await?;
    if existing.status == Status::Paid {
        return Err(HrError::validation("paid payroll cannot be deleted"));
    }
    payroll::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

#[instrument(skip(db))]
pub async fn process<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<payroll::Model> {
    let existing = get(db, id).await?;
    if existing.status != Status::Draft {
        return Err(HrError::validation("only draft payroll can be processed"));
    }
    let mut active: payroll::ActiveModel = existing.into();
    active.status = Set(Status::Processed);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(skip(db))]
pub async fn mark_paid<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<payroll::Model> {
    let existing = get(db, id).await?;
    if existing.status != Status::Processed {
        return Err(HrError::validation("only processed payroll can be paid"));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: payroll::ActiveModel = existing.into();
    active.status = Set(Status::Paid);
    active.paid_at = Set(Some(now));
    active.updated_at = Set(now);
    let model = active.update(db).await?;
    info!(payroll_id = %model.id, net_cents = model.net_cents, "payroll paid");
    Ok(model)
}

pub async fn summary<C: ConnectionTrait>(db: &C, period: &str) -> HrResult<PayrollSummary> {
    let period = validate_period(period)?;
    let records = payroll::Entity::find()
        .filter(payroll::Column::Period.eq(period.as_str()))
        .all(db)
        .await?;
    let mut summary = PayrollSummary {
        period,
        ..PayrollSummary::default()
    };
    for record in &records {
        summary.records += 1;
        match record.status {
            Status::Draft => summary.draft += 1,
            Status::Processed => summary.processed += 1,
            Status::Paid => summary.paid += 1,
        }
        for (total, value) in [
            (&mut summary.total_basic_cents, record.basic_cents),
            (&mut summary.total_allowances_cents, record.allowances_cents),
            (&mut summary.total_deductions_cents, record.deductions_cents),
            (&mut summary.total_tax_cents, record.tax_cents),
            (&mut summary.total_net_cents, record.net_cents),
        ] {
            *total = total.checked_add(value).ok_or_else(out_of_range)?;
        }
    }
    Ok(summary)
}

/// Most recent period that has any payroll.
pub async fn latest_period<C: ConnectionTrait>(db: &C) -> HrResult<Option<String>> {
    Ok(payroll::Entity::find()
        .order_by_desc(payroll::Column::Period)
        .one(db)
        .await?
        .map(|record| record.period))
}
