mod common;

use common::{date, employee, employee_input, setup_db, today};
use entity::leaves::{LeaveType, Status as LeaveStatus};
use entity::payroll::Status as PayrollStatus;
use products_hr::HrError;
use products_hr::employees::{self, UpdateEmployeeInput};
use products_hr::leave::{self, DecisionInput, NewLeaveInput};
use products_hr::payroll::{self, UpdatePayrollInput};

fn request(
    employee_id: uuid::Uuid,
    leave_type: LeaveType,
    start: (u32, u32),
    end: (u32, u32),
) -> NewLeaveInput {
    NewLeaveInput {
        employee_id,
        leave_type,
        start_date: date(2026, start.0, start.1),
        end_date: date(2026, end.0, end.1),
        reason: None,
    }
}

#[tokio::test]
async fn leave_lifecycle() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;

    let created = leave::create(&pool, request(ada.id, LeaveType::Annual, (10, 5), (10, 9)))
        .await
        .unwrap();
    assert_eq!(created.days, 5);
    assert_eq!(created.status, LeaveStatus::Pending);

    let approved = leave::approve(&pool, created.id, None, DecisionInput::default())
        .await
        .unwrap();
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert!(approved.decided_at.is_some());

    // approved leave cannot be rejected, but can be cancelled
    assert!(matches!(
        leave::reject(&pool, created.id, None, DecisionInput::default()).await,
        Err(HrError::Validation(_))
    ));
    let cancelled = leave::cancel(&pool, created.id).await.unwrap();
    assert_eq!(cancelled.status, LeaveStatus::Cancelled);
    assert!(leave::cancel(&pool, created.id).await.is_err());
}

#[tokio::test]
async fn reversed_dates_are_rejected() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;
    let err = leave::create(&pool, request(ada.id, LeaveType::Casual, (10, 9), (10, 5)))
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Validation(_)));
}

#[tokio::test]
async fn overlapping_requests_conflict() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;
    leave::create(&pool, request(ada.id, LeaveType::Annual, (10, 5), (10, 9)))
        .await
        .unwrap();
    let err = leave::create(&pool, request(ada.id, LeaveType::Sick, (10, 9), (10, 10)))
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Conflict(_)));
}

#[tokio::test]
async fn approval_enforces_remaining_balance() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;

    let first = leave::create(&pool, request(ada.id, LeaveType::Casual, (3, 2), (3, 6)))
        .await
        .unwrap();
    leave::approve(&pool, first.id, None, DecisionInput::default())
        .await
        .unwrap();

    // 5 of 7 casual days used; 3 more do not fit
    let second = leave::create(&pool, request(ada.id, LeaveType::Casual, (4, 6), (4, 8)))
        .await
        .unwrap();
    let err = leave::approve(&pool, second.id, None, DecisionInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Validation(_)), "{err:?}");

    let balance = leave::balance(&pool, ada.id, 2026).await.unwrap();
    let casual = balance
        .iter()
        .find(|entry| entry.leave_type == LeaveType::Casual)
        .unwrap();
    assert_eq!(casual.allocated, Some(7));
    assert_eq!(casual.used, 5);
    assert_eq!(casual.remaining, Some(2));

    // unpaid leave has no ceiling
    let unpaid = leave::create(&pool, request(ada.id, LeaveType::Unpaid, (5, 1), (5, 30)))
        .await
        .unwrap();
    leave::approve(&pool, unpaid.id, None, DecisionInput::default())
        .await
        .unwrap();
    let balance = leave::balance(&pool, ada.id, 2026).await.unwrap();
    let unpaid = balance
        .iter()
        .find(|entry| entry.leave_type == LeaveType::Unpaid)
        .unwrap();
    assert_eq!(unpaid.remaining, None);
    assert_eq!(unpaid.used, 30);
}

#[tokio::test]
async fn payroll_generation_and_transitions() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;
    let grace = employee(&pool, "E-2").await;
    let gone = employee(&pool, "E-3").await;
    employees::update(
        &pool,
        gone.id,
        UpdateEmployeeInput {
            status: Some(entity::employees::Status::Terminated),
            ..Default::default()
        },
        common::today(),
    )
    .await
    .unwrap();

    // two unpaid days inside September for Ada, one spilling into October
    let unpaid = leave::create(&pool, request(ada.id, LeaveType::Unpaid, (9, 29), (10, 1)))
        .await
        .unwrap();
    leave::approve(&pool, unpaid.id, None, DecisionInput::default())
        .await
        .unwrap();

    let created = payroll::generate(&pool, "2026-09").await.unwrap();
    assert_eq!(created.len(), 2);
    let ada_pay = created.iter().find(|p| p.employee_id == ada.id).unwrap();
    let grace_pay = created.iter().find(|p| p.employee_id == grace.id).unwrap();
    assert_eq!(ada_pay.deductions_cents, 2 * 15_000_000 / 30);
    assert_eq!(grace_pay.deductions_cents, 0);
    assert_eq!(grace_pay.allowances_cents, 2_250_000);
    assert_eq!(grace_pay.tax_cents, 1_500_000);
    assert_eq!(grace_pay.net_cents, 15_750_000);

    // second run creates nothing new
    assert!(payroll::generate(&pool, "2026-09").await.unwrap().is_empty());
    assert!(matches!(
        payroll::generate(&pool, "2026-9").await,
        Err(HrError::Validation(_))
    ));

    assert!(payroll::mark_paid(&pool, grace_pay.id).await.is_err());
    let processed = payroll::process(&pool, grace_pay.id).await.unwrap();
    assert_eq!(processed.status, PayrollStatus::Processed);
    let paid = payroll::mark_paid(&pool, grace_pay.id).await.unwrap();
    assert_eq!(paid.status, PayrollStatus::Paid);
    assert!(paid.paid_at.is_some());
    assert!(payroll::process(&pool, grace_pay.id).await.is_err());

    let summary = payroll::summary(&pool, "2026-09").await.unwrap();
    assert_eq!(summary.records, 2);
    assert_eq!(summary.paid, 1);
    assert_eq!(summary.draft, 1);
    assert_eq!(
        summary.total_net_cents,
        ada_pay.net_cents + grace_pay.net_cents
    );
}

#[tokio::test]
async fn payroll_amounts_stay_in_range() {
    let pool = setup_db().await;
    let mut input = employee_input("E-9", "e-9@example.test");
    input.base_salary_cents = i64::MAX;
    assert!(matches!(
        employees::create(&pool, input, today()).await,
        Err(HrError::Validation(_))
    ));

    let ada = employee(&pool, "E-1").await;
    assert!(matches!(
        employees::update(
            &pool,
            ada.id,
            UpdateEmployeeInput {
                base_salary_cents: Some(i64::MAX / 2),
                ..Default::default()
            },
            today(),
        )
        .await,
        Err(HrError::Validation(_))
    ));

    let created = payroll::generate(&pool, "2026-09").await.unwrap();
    let draft = &created[0];
    for input in [
        UpdatePayrollInput {
            allowances_cents: Some(i64::MAX),
            ..Default::default()
        },
        UpdatePayrollInput {
            deductions_cents: Some(i64::MAX),
            tax_cents: Some(i64::MAX),
            ..Default::default()
        },
    ] {
        assert!(matches!(
            payroll::update(&pool, draft.id, input).await,
            Err(HrError::Validation(_))
        ));
    }

    let adjusted = payroll::update(
        &pool,
        draft.id,
        UpdatePayrollInput {
            allowances_cents: Some(0),
            tax_cents: Some(0),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(adjusted.net_cents, 15_000_000);
}

#[tokio::test]
async fn paid_payroll_is_frozen() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;
    let created = payroll::generate(&pool, "2026-09").await.unwrap();
    let record = created.iter().find(|p| p.employee_id == ada.id).unwrap();
    payroll::process(&pool, record.id).await.unwrap();
    payroll::mark_paid(&pool, record.id).await.unwrap();

    let adjust = UpdatePayrollInput {
        allowances_cents: Some(0),
        ..Default::default()
    };
    assert!(matches!(
        payroll::update(&pool, record.id, adjust).await,
        Err(HrError::Validation(_))
    ));
    assert!(matches!(
        payroll::delete(&pool, record.id).await,
        Err(HrError::Validation(_))
    ));
    let kept = payroll::get(&pool, record.id).await.unwrap();
    assert_eq!(kept.status, PayrollStatus::Paid);
    assert_eq!(kept.allowances_cents, record.allowances_cents);
}
