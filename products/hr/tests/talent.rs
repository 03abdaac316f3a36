mod common;

use chrono::{TimeZone, Utc};
use common::{date, employee, setup_db, today};
use entity::attendance::Status as AttendanceStatus;
use entity::candidates::Stage;
use entity::enrollments::Status as EnrollmentStatus;
use entity::job_postings::Status as PostingStatus;
use entity::performance_reviews::Status as ReviewStatus;
use entity::violations::{Severity, Status as ViolationStatus};
use products_hr::HrError;
use products_hr::attendance;
use products_hr::compliance::{self, NewCertificationInput, NewViolationInput};
use products_hr::learning::{self, EnrollInput, NewCourseInput, ProgressInput};
use products_hr::performance::{self, NewReviewInput};
use products_hr::recruitment::{self, NewCandidateInput, NewPostingInput};

#[tokio::test]
async fn check_in_and_out() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;
    let grace = employee(&pool, "E-2").await;
    let at = |h, m| Utc.with_ymd_and_hms(2026, 10, 12, h, m, 0).single().unwrap();

    assert!(matches!(
        attendance::check_out(&pool, ada.id, at(17, 0)).await,
        Err(HrError::Validation(_))
    ));

    let on_time = attendance::check_in(&pool, ada.id, at(9, 0)).await.unwrap();
    assert_eq!(on_time.status, AttendanceStatus::Present);
    assert_eq!(on_time.work_date, today());
    assert!(matches!(
        attendance::check_in(&pool, ada.id, at(9, 5)).await,
        Err(HrError::Conflict(_))
    ));

    let late = attendance::check_in(&pool, grace.id, at(9, 30)).await.unwrap();
    assert_eq!(late.status, AttendanceStatus::Late);

    let closed = attendance::check_out(&pool, ada.id, at(17, 30)).await.unwrap();
    let view = attendance::AttendanceView::from(closed);
    assert_eq!(view.worked_hours, Some(8.5));
    assert_eq!(view.record.status, AttendanceStatus::Present);

    let short = attendance::check_out(&pool, grace.id, at(12, 0)).await.unwrap();
    assert_eq!(short.status, AttendanceStatus::HalfDay);

    // a check-out inside the first minute still closes the day
    let brief = employee(&pool, "E-3").await;
    attendance::check_in(&pool, brief.id, at(10, 0)).await.unwrap();
    let moment = at(10, 0) + chrono::Duration::seconds(30);
    let closed = attendance::check_out(&pool, brief.id, moment).await.unwrap();
    assert_eq!(closed.status, AttendanceStatus::HalfDay);
}

#[tokio::test]
async fn hiring_last_opening_closes_posting() {
    let pool = setup_db().await;
    let posting = recruitment::create_posting(
        &pool,
        NewPostingInput {
            title: "Engineer".into(),
            department: "Engineering".into(),
            position_id: None,
            description: None,
            openings: 1,
        },
    )
    .await
    .unwrap();
    let candidate = |name: &str| NewCandidateInput {
        full_name: name.to_string(),
        email: format!("{}@example.test", name.to_lowercase()),
        phone: None,
        notes: None,
    };
    let first = recruitment::add_candidate(&pool, posting.id, candidate("Linus"))
        .await
        .unwrap();
    let second = recruitment::add_candidate(&pool, posting.id, candidate("Ken"))
        .await
        .unwrap();
    assert_eq!(first.stage, Stage::Applied);

    recruitment::move_candidate(&pool, first.id, Stage::Interview)
        .await
        .unwrap();
    recruitment::move_candidate(&pool, first.id, Stage::Hired)
        .await
        .unwrap();
    let posting = recruitment::get_posting(&pool, posting.id).await.unwrap();
    assert_eq!(posting.status, PostingStatus::Closed);

    assert!(matches!(
        recruitment::move_candidate(&pool, first.id, Stage::Offer).await,
        Err(HrError::Validation(_))
    ));
    assert!(matches!(
        recruitment::move_candidate(&pool, second.id, Stage::Hired).await,
        Err(HrError::Validation(_))
    ));
    assert!(
        recruitment::add_candidate(&pool, posting.id, candidate("Grace"))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn course_completion() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;
    let course = learning::create_course(
        &pool,
        NewCourseInput {
            title: "Code of Conduct".into(),
            description: None,
            category: "Compliance".into(),
            duration_hours: 2,
            mandatory: true,
        },
    )
    .await
    .unwrap();
    let enrollment = learning::enroll(&pool, course.id, EnrollInput { employee_id: ada.id })
        .await
        .unwrap();
    assert!(matches!(
        learning::enroll(&pool, course.id, EnrollInput { employee_id: ada.id }).await,
        Err(HrError::Conflict(_))
    ));
    assert!(
        learning::update_progress(&pool, enrollment.id, ProgressInput { progress: 120 })
            .await
            .is_err()
    );

    let halfway = learning::update_progress(&pool, enrollment.id, ProgressInput { progress: 50 })
        .await
        .unwrap();
    assert_eq!(halfway.status, EnrollmentStatus::InProgress);
    assert!(halfway.completed_at.is_none());

    let done = learning::update_progress(&pool, enrollment.id, ProgressInput { progress: 100 })
        .await
        .unwrap();
    assert_eq!(done.status, EnrollmentStatus::Completed);
    assert!(done.completed_at.is_some());

    let rate = learning::mandatory_completion(&pool).await.unwrap();
    assert_eq!((rate.enrolled, rate.completed), (1, 1));
    assert_eq!(rate.rate, 1.0);
}

#[tokio::test]
async fn review_workflow() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;
    let boss = employee(&pool, "E-2").await;
    let input = |rating| NewReviewInput {
        employee_id: ada.id,
        reviewer_id: Some(boss.id),
        period: "2026-09".into(),
        rating,
        goals: Some("Ship payroll".into()),
        comments: None,
    };
    assert!(performance::create(&pool, input(6)).await.is_err());
    let review = performance::create(&pool, input(4)).await.unwrap();
    assert_eq!(review.status, ReviewStatus::Draft);

    assert!(performance::acknowledge(&pool, review.id).await.is_err());
    let submitted = performance::submit(&pool, review.id).await.unwrap();
    assert_eq!(submitted.status, ReviewStatus::Submitted);
    let acknowledged = performance::acknowledge(&pool, review.id).await.unwrap();
    assert_eq!(acknowledged.status, ReviewStatus::Acknowledged);
}

#[tokio::test]
async fn violations_and_expiring_certifications() {
    let pool = setup_db().await;
    let ada = employee(&pool, "E-1").await;

    let violation = compliance::report_violation(
        &pool,
        NewViolationInput {
            employee_id: Some(ada.id),
            policy: "Data handling".into(),
            severity: Severity::High,
            description: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(compliance::open_violations_count(&pool).await.unwrap(), 1);
    let resolved = compliance::resolve_violation(&pool, violation.id)
        .await
        .unwrap();
    assert_eq!(resolved.status, ViolationStatus::Resolved);
    assert!(resolved.resolved_at.is_some());
    assert_eq!(compliance::open_violations_count(&pool).await.unwrap(), 0);

    for (name, expires_on) in [
        ("Soon", Some(date(2026, 10, 30))),
        ("Later", Some(date(2027, 6, 1))),
        ("Lapsed", Some(date(2026, 9, 1))),
        ("Lifetime", None),
    ] {
        compliance::create_certification(
            &pool,
            NewCertificationInput {
                employee_id: ada.id,
                name: name.into(),
                issuer: "Board".into(),
                issued_on: date(2024, 1, 1),
                expires_on,
            },
        )
        .await
        .unwrap();
    }
    let expiring = compliance::expiring(&pool, today(), 30).await.unwrap();
    let names: Vec<_> = expiring.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Soon"]);
}
