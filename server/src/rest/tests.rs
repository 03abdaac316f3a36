use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use platform_authn::AuthConfig;
use platform_db::DatabaseSettings;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{
    config::AppConfig,
    graphql,
    http::{AppState, build_router},
};

async fn app() -> Router {
    let pool = platform_db::connect(&DatabaseSettings::new("sqlite::memory:"))
        .await
        .unwrap();
    Migrator::up(&pool, None).await.unwrap();
    platform_db::ensure_company(&pool, "Acme HR").await.unwrap();
    products_hr::seed::seed(&pool, super::today()).await.unwrap();
    let config = AppConfig {
        company_name: "Acme HR".into(),
        auth: AuthConfig::new(vec![7u8; 32], 60),
        cors_allowed_origins: vec!["http://localhost:5173".into()],
    };
    build_router(AppState {
        schema: graphql::build_schema(pool.clone()),
        pool,
        config: Arc::new(config),
    })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": products_hr::seed::DEMO_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_database() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["db_ok"], json!(true));
}

#[tokio::test]
async fn missing_token_is_unauthorized_with_envelope() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/employees", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"error": {"code": "UNAUTHORIZED", "message": "unauthorized"}})
    );

    let (status, _) = send(&app, "GET", "/api/employees", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": products_hr::seed::ADMIN_EMAIL, "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_returns_role_and_permissions() {
    let app = app().await;
    let token = login(&app, "employee@hrms.local").await;
    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], json!("EMPLOYEE"));
    let permissions = body["permissions"].as_array().unwrap();
    assert!(permissions.contains(&json!("leave:write")));
    assert!(!permissions.contains(&json!("payroll:read")));
}

#[tokio::test]
async fn employee_crud_round() {
    let app = app().await;
    let token = login(&app, products_hr::seed::ADMIN_EMAIL).await;
    let (status, created) = send(
        &app,
        "POST",
        "/api/employees",
        Some(&token),
        Some(json!({
            "employee_code": "EMP-900",
            "first_name": "Zara",
            "last_name": "Farooq",
            "email": "zara.farooq@example.test",
            "cnic": "35202-7654321-3",
            "date_of_birth": "1994-03-14",
            "department": "Finance",
            "hire_date": "2024-02-01",
            "base_salary_cents": 12_000_000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let id = created["id"].as_str().unwrap().to_string();

    let path = format!("/api/employees/{id}");
    let (status, fetched) = send(&app, "GET", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["employee_code"], json!("EMP-900"));

    let (status, updated) = send(
        &app,
        "PUT",
        &path,
        Some(&token),
        Some(json!({"department": "Operations"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["department"], json!("Operations"));

    let (status, _) = send(&app, "DELETE", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn invalid_employee_input_is_bad_request() {
    let app = app().await;
    let token = login(&app, products_hr::seed::ADMIN_EMAIL).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/employees",
        Some(&token),
        Some(json!({
            "employee_code": "EMP-901",
            "first_name": "Bad",
            "last_name": "Email",
            "email": "not-an-email",
            "cnic": "35202-7654321-3",
            "date_of_birth": "1994-03-14",
            "department": "Finance",
            "hire_date": "2024-02-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_INPUT"));
}

#[tokio::test]
async fn malformed_requests_use_error_envelope() {
    let app = app().await;
    let token = login(&app, products_hr::seed::ADMIN_EMAIL).await;

    // missing required fields
    let (status, body) = send(
        &app,
        "POST",
        "/api/positions",
        Some(&token),
        Some(json!({"title": "Analyst"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_INPUT"));

    let (status, body) =
        send(&app, "GET", "/api/employees/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_INPUT"));

    let (status, body) =
        send(&app, "GET", "/api/employees?limit=many", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_INPUT"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], json!("INVALID_INPUT"));
}

#[tokio::test]
async fn employee_role_is_forbidden_from_payroll() {
    let app = app().await;
    let token = login(&app, "employee@hrms.local").await;
    let (status, body) = send(&app, "GET", "/api/payroll", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], json!("FORBIDDEN"));

    let (status, _) = send(&app, "GET", "/api/analytics/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn employees_only_see_their_own_leave() {
    let app = app().await;
    let token = login(&app, "employee@hrms.local").await;
    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let own = me["user"]["employee_id"].clone();

    let (status, rows) = send(&app, "GET", "/api/leave", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(rows.as_array().unwrap().iter().all(|row| row["employee_id"] == own));

    let (status, balance) = send(&app, "GET", "/api/leave/balance", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!balance.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn manager_reads_dashboard() {
    let app = app().await;
    let token = login(&app, "manager@hrms.local").await;
    let (status, body) = send(&app, "GET", "/api/analytics/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["headcount"]["total"], json!(6));
    assert_eq!(body["open_postings"], json!(1));
}

#[tokio::test]
async fn graphql_uses_bearer_token() {
    let app = app().await;
    let token = login(&app, "hr@hrms.local").await;
    let (status, body) = send(
        &app,
        "POST",
        "/graphql",
        Some(&token),
        Some(json!({"query": "{ me { role } departmentHeadcount { department headcount } }"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["me"]["role"], json!("HR_MANAGER"));
    assert!(body["data"]["departmentHeadcount"].is_array());
}

async fn user_id(app: &Router, admin: &str, email: &str) -> String {
    let (status, users) = send(app, "GET", "/api/users", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    users
        .as_array()
        .unwrap()
        .iter()
        .find(|user| user["email"] == json!(email))
        .and_then(|user| user["id"].as_str())
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn admin_updates_user_accounts() {
    let app = app().await;
    let admin = login(&app, products_hr::seed::ADMIN_EMAIL).await;
    let id = user_id(&app, &admin, "employee@hrms.local").await;
    let path = format!("/api/users/{id}");
    let (_, staff) = send(&app, "GET", "/api/employees", Some(&admin), None).await;
    let employee_id = staff[0]["id"].clone();

    let (status, body) = send(
        &app,
        "PUT",
        &path,
        Some(&admin),
        Some(json!({"password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = send(
        &app,
        "PUT",
        &path,
        Some(&admin),
        Some(json!({"employee_id": "00000000-0000-0000-0000-000000000001"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    let (status, updated) = send(
        &app,
        "PUT",
        &path,
        Some(&admin),
        Some(json!({
            "role": "manager",
            "password": "a-fresh-password",
            "employee_id": employee_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["role"], json!("MANAGER"));
    assert_eq!(updated["employee_id"], employee_id);
    assert!(updated.get("password_hash").is_none());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": "employee@hrms.local",
            "password": products_hr::seed::DEMO_PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "employee@hrms.local", "password": "a-fresh-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], json!("MANAGER"));

    let hr = login(&app, "hr@hrms.local").await;
    let (status, _) = send(&app, "GET", "/api/users", Some(&hr), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn disabled_accounts_are_unauthorized() {
    let app = app().await;
    let admin = login(&app, products_hr::seed::ADMIN_EMAIL).await;
    let token = login(&app, "employee@hrms.local").await;
    let id = user_id(&app, &admin, "employee@hrms.local").await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/users/{id}"),
        Some(&admin),
        Some(json!({"is_active": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": "employee@hrms.local",
            "password": products_hr::seed::DEMO_PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn company_settings_report_subscription_state() {
    let app = app().await;
    let admin = login(&app, products_hr::seed::ADMIN_EMAIL).await;
    let hr = login(&app, "hr@hrms.local").await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/company",
        Some(&hr),
        Some(json!({"name": "Other"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/company",
        Some(&admin),
        Some(json!({
            "primary_color": "#112233",
            "subscription_plan": "ENTERPRISE",
            "subscription_expires_at": "2999-01-01T00:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["subscription_plan"], json!("ENTERPRISE"));
    assert_eq!(body["subscription_active"], json!(true));

    let (status, body) = send(
        &app,
        "PUT",
        "/api/company",
        Some(&admin),
        Some(json!({"subscription_expires_at": "2000-01-01T00:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscription_active"], json!(false));

    let (status, _) = send(
        &app,
        "PUT",
        "/api/company",
        Some(&admin),
        Some(json!({"primary_color": "blue"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let employee = login(&app, "employee@hrms.local").await;
    let (status, body) = send(&app, "GET", "/api/company", Some(&employee), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["primary_color"], json!("#112233"));
    assert_eq!(body["subscription_active"], json!(false));
}

#[tokio::test]
async fn paid_payroll_rejects_changes() {
    let app = app().await;
    let admin = login(&app, products_hr::seed::ADMIN_EMAIL).await;
    let drafts = "/api/payroll?status=DRAFT";
    let (status, rows) = send(&app, "GET", drafts, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK, "{rows}");
    let id = rows[0]["id"].as_str().unwrap().to_string();

    let process = format!("/api/payroll/{id}/process");
    let (status, _) = send(&app, "POST", &process, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let pay = format!("/api/payroll/{id}/pay");
    let (status, paid) = send(&app, "POST", &pay, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], json!("PAID"));

    let path = format!("/api/payroll/{id}");
    let (status, body) = send(
        &app,
        "PUT",
        &path,
        Some(&admin),
        Some(json!({"allowances_cents": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_INPUT"));

    let (status, _) = send(&app, "DELETE", &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, kept) = send(&app, "GET", &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kept["status"], json!("PAID"));
}
