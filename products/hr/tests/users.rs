mod common;

use common::{employee, setup_db};
use products_hr::HrError;
use products_hr::users::{self, NewUserInput, UpdateUserInput};
use uuid::Uuid;

fn account(email: &str) -> NewUserInput {
    NewUserInput {
        email: email.to_string(),
        display_name: "Noor Siddiqui".to_string(),
        password: "first-password".to_string(),
        role: "EMPLOYEE".to_string(),
        employee_id: None,
    }
}

#[tokio::test]
async fn accounts_can_be_relinked_and_reset() {
    let pool = setup_db().await;
    let staff = employee(&pool, "E-1").await;
    let user = users::register(&pool, account("Noor@Example.test")).await.unwrap();
    assert_eq!(user.email, "noor@example.test");
    assert_eq!(user.employee_id, None);

    let short = UpdateUserInput {
        password: Some("x".repeat(users::MIN_PASSWORD_LEN - 1)),
        ..Default::default()
    };
    assert!(matches!(
        users::update(&pool, user.id, short).await,
        Err(HrError::Validation(_))
    ));
    let missing = UpdateUserInput {
        employee_id: Some(Uuid::new_v4()),
        ..Default::default()
    };
    assert!(matches!(
        users::update(&pool, user.id, missing).await,
        Err(HrError::NotFound { .. })
    ));
    let bad_role = UpdateUserInput {
        role: Some("super_admin".into()),
        ..Default::default()
    };
    assert!(matches!(
        users::update(&pool, user.id, bad_role).await,
        Err(HrError::Validation(_))
    ));

    let updated = users::update(
        &pool,
        user.id,
        UpdateUserInput {
            role: Some("hr".into()),
            password: Some("second-password".into()),
            employee_id: Some(staff.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.role, "HR_MANAGER");
    assert_eq!(updated.employee_id, Some(staff.id));

    assert!(matches!(
        users::authenticate(&pool, "noor@example.test", "first-password").await,
        Err(HrError::InvalidCredentials)
    ));
    let signed_in = users::authenticate(&pool, "noor@example.test", "second-password")
        .await
        .unwrap();
    assert_eq!(signed_in.id, user.id);
}

#[tokio::test]
async fn disabled_accounts_cannot_sign_in() {
    let pool = setup_db().await;
    let user = users::register(&pool, account("noor@example.test")).await.unwrap();
    users::update(
        &pool,
        user.id,
        UpdateUserInput {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(matches!(
        users::authenticate(&pool, "noor@example.test", "first-password").await,
        Err(HrError::InvalidCredentials)
    ));
    assert!(matches!(
        users::register(&pool, account("NOOR@example.test")).await,
        Err(HrError::Conflict(_))
    ));
}
