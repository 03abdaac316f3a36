mod common;

use common::{date, employee, employee_input, setup_db, today};
use products_hr::HrError;
use products_hr::employees::{self, EmployeeFilter, UpdateEmployeeInput};
use products_hr::positions::{self, NewPositionInput};

#[tokio::test]
async fn create_and_filter_employees() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;
    let mut input = employee_input("E-2", "grace@example.test");
    input.first_name = "Grace".to_string();
    input.department = "Finance".to_string();
    employees::create(&pool, input, today()).await.unwrap();

    assert_eq!(ada.email, "e-1@example.test");
    let finance = employees::list(
        &pool,
        EmployeeFilter {
            department: Some("Finance".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(finance.len(), 1);
    assert_eq!(finance[0].first_name, "Grace");

    let found = employees::list(
        &pool,
        EmployeeFilter {
            q: Some("grace".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn invalid_fields_are_rejected() {
    let pool = setup_db().await;
    let mut bad_cnic = employee_input("E-1", "a@example.test");
    bad_cnic.cnic = "1234".to_string();
    assert!(matches!(
        employees::create(&pool, bad_cnic, today()).await,
        Err(HrError::Validation(_))
    ));

    let mut minor = employee_input("E-2", "b@example.test");
    minor.date_of_birth = date(2010, 1, 1);
    assert!(matches!(
        employees::create(&pool, minor, today()).await,
        Err(HrError::Validation(_))
    ));

    let mut negative = employee_input("E-3", "c@example.test");
    negative.base_salary_cents = -1;
    assert!(matches!(
        employees::create(&pool, negative, today()).await,
        Err(HrError::Validation(_))
    ));
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let pool = setup_db().await;
    employees::create(&pool, employee_input("E-1", "same@example.test"), today())
        .await
        .unwrap();
    let err = employees::create(&pool, employee_input("E-2", "same@example.test"), today())
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn reporting_lines_cannot_loop() {
    let pool = setup_db().await;
    let boss = employee(&pool, "E-1").await;
    let mut input = employee_input("E-2", "report@example.test");
    input.reports_to = Some(boss.id);
    let report = employees::create(&pool, input, today()).await.unwrap();

    let reports = employees::direct_reports(&pool, boss.id).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, report.id);

    let self_managed = employees::update(
        &pool,
        boss.id,
        UpdateEmployeeInput {
            reports_to: Some(boss.id),
            ..Default::default()
        },
        today(),
    )
    .await;
    assert!(matches!(self_managed, Err(HrError::Validation(_))));

    let cycle = employees::update(
        &pool,
        boss.id,
        UpdateEmployeeInput {
            reports_to: Some(report.id),
            ..Default::default()
        },
        today(),
    )
    .await;
    assert!(matches!(cycle, Err(HrError::Validation(_))));
}

#[tokio::test]
async fn positions_list_their_holders() {
    let pool = setup_db().await;
    let position = positions::create(
        &pool,
        NewPositionInput {
            title: "Engineer".into(),
            department: "Engineering".into(),
            reports_to: None,
            min_salary_cents: 10_000_000,
            max_salary_cents: 20_000_000,
            headcount: 3,
            is_open: true,
        },
    )
    .await
    .unwrap();
    let mut input = employee_input("E-1", "holder@example.test");
    input.position_id = Some(position.id);
    employees::create(&pool, input, today()).await.unwrap();

    let holders = positions::holders(&pool, position.id).await.unwrap();
    assert_eq!(holders.len(), 1);

    employees::delete(&pool, holders[0].id).await.unwrap();
    assert!(matches!(
        employees::get(&pool, holders[0].id).await,
        Err(HrError::NotFound { .. })
    ));
}
