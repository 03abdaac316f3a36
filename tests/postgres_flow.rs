use anyhow::Result;
use chrono::{NaiveDate, Utc};
use hr_tests::{PgTestContext, setup_pg};
use products_hr::employees::{EmployeeFilter, NewEmployeeInput, UpdateEmployeeInput};
use products_hr::leave::{DecisionInput, NewLeaveInput};
use products_hr::{HrError, seed};
use sea_orm::TransactionTrait;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Both flows share one database, so they run in order from a single test.
#[tokio::test]
async fn postgres_end_to_end() -> Result<()> {
    let Some(ctx) = setup_pg().await? else {
        return Ok(());
    };
    employee_and_leave_flow(&ctx).await?;
    seeded_database_serves_dashboard(&ctx).await
}

async fn seeded_database_serves_dashboard(ctx: &PgTestContext) -> Result<()> {
    let today = Utc::now().date_naive();
    platform_db::ensure_company(&ctx.pool, "Acme HR").await?;

    let txn = ctx.pool.begin().await?;
    let report = seed::seed(&txn, today).await?;
    txn.commit().await?;
    assert!(!report.skipped);
    assert!(seed::seed(&ctx.pool, today).await?.skipped);

    let dashboard = products_hr::analytics::dashboard(&ctx.pool, today).await?;
    assert_eq!(dashboard.headcount.total, report.employees as u64);
    assert_eq!(dashboard.pending_leave, 1);
    assert_eq!(dashboard.open_postings, 1);
    assert!(dashboard.latest_payroll.is_some());
    Ok(())
}

async fn employee_and_leave_flow(ctx: &PgTestContext) -> Result<()> {
    let today = date(2026, 3, 2);
    let input = NewEmployeeInput {
        employee_code: "PG-001".into(),
        first_name: "Usman".into(),
        last_name: "Tariq".into(),
        email: "usman.tariq@example.test".into(),
        phone: None,
        cnic: "35202-1111111-1".into(),
        date_of_birth: date(1991, 8, 20),
        gender: None,
        department: "Finance".into(),
        position_id: None,
        reports_to: None,
        hire_date: date(2022, 4, 1),
        status: None,
        base_salary_cents: 9_000_000,
    };
    let employee = products_hr::employees::create(&ctx.pool, input.clone(), today).await?;

    let duplicate = products_hr::employees::create(&ctx.pool, input, today).await;
    assert!(matches!(duplicate, Err(HrError::Conflict(_))));

    let updated = products_hr::employees::update(
        &ctx.pool,
        employee.id,
        UpdateEmployeeInput {
            department: Some("Operations".into()),
            ..Default::default()
        },
        today,
    )
    .await?;
    assert_eq!(updated.department, "Operations");

    let listed = products_hr::employees::list(
        &ctx.pool,
        EmployeeFilter {
            department: Some("Operations".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(listed.len(), 1);

    let leave = products_hr::leave::create(
        &ctx.pool,
        NewLeaveInput {
            employee_id: employee.id,
            leave_type: entity::leaves::LeaveType::Annual,
            start_date: date(2026, 3, 9),
            end_date: date(2026, 3, 11),
            reason: Some("family visit".into()),
        },
    )
    .await?;
    assert_eq!(leave.days, 3);

    let txn = ctx.pool.begin().await?;
    let approved =
        products_hr::leave::approve(&txn, leave.id, None, DecisionInput::default()).await?;
    txn.commit().await?;
    assert_eq!(approved.status, entity::leaves::Status::Approved);

    products_hr::leave::delete(&ctx.pool, leave.id).await?;
    products_hr::employees::delete(&ctx.pool, employee.id).await?;
    let gone = products_hr::employees::get(&ctx.pool, employee.id).await;
    assert!(matches!(gone, Err(HrError::NotFound { .. })));
    Ok(())
}
