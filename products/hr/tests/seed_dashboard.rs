mod common;

use common::{setup_db, today};
use products_hr::{analytics, seed, users};

#[tokio::test]
async fn seed_is_idempotent_and_feeds_the_dashboard() {
    let pool = setup_db().await;
    let report = seed::seed(&pool, today()).await.unwrap();
    assert!(!report.skipped);
    assert_eq!(report.users, 4);
    assert_eq!(report.employees, 6);
    assert_eq!(report.payroll, 6);

    let again = seed::seed(&pool, today()).await.unwrap();
    assert!(again.skipped);

    let admin = users::authenticate(&pool, seed::ADMIN_EMAIL, seed::DEMO_PASSWORD)
        .await
        .unwrap();
    assert_eq!(admin.role, "ADMIN");
    assert!(
        users::authenticate(&pool, seed::ADMIN_EMAIL, "wrong-password")
            .await
            .is_err()
    );

    let dashboard = analytics::dashboard(&pool, today()).await.unwrap();
    assert_eq!(dashboard.headcount.total, 6);
    assert_eq!(dashboard.headcount.active, 6);
    assert_eq!(dashboard.pending_leave, 1);
    assert_eq!(dashboard.attendance_today.present, 1);
    assert_eq!(dashboard.attendance_today.late, 1);
    assert_eq!(dashboard.attendance_today.unmarked, 4);
    assert_eq!(dashboard.open_postings, 1);
    assert_eq!(dashboard.open_violations, 1);
    assert_eq!(dashboard.mandatory_training.enrolled, 6);
    assert_eq!(dashboard.mandatory_training.completed, 3);
    let payroll = dashboard.latest_payroll.expect("payroll summary");
    assert_eq!(payroll.period, "2026-09");
    assert_eq!(payroll.records, 6);

    let engineering = dashboard
        .departments
        .iter()
        .find(|d| d.department == "Engineering")
        .unwrap();
    assert_eq!(engineering.headcount, 3);
}
