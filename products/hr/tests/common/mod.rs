#![allow(dead_code)]

use chrono::NaiveDate;
use entity::employees;
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use products_hr::employees::NewEmployeeInput;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn today() -> NaiveDate {
    date(2026, 10, 12)
}

pub async fn setup_db() -> DbPool {
    let pool = connect(&DatabaseSettings::new("sqlite::memory:"))
        .await
        .expect("connect sqlite");
    Migrator::up(&pool, None).await.expect("migrate");
    pool
}

pub fn employee_input(code: &str, email: &str) -> NewEmployeeInput {
    NewEmployeeInput {
        employee_code: code.to_string(),
        first_name: "Ada".to_string(),
        last_name: format!("Tester {code}"),
        email: email.to_string(),
        phone: None,
        cnic: "35202-1234567-1".to_string(),
        date_of_birth: date(1990, 5, 1),
        gender: None,
        department: "Engineering".to_string(),
        position_id: None,
        reports_to: None,
        hire_date: date(2020, 1, 6),
        status: None,
        base_salary_cents: 15_000_000,
    }
}

pub async fn employee(pool: &DbPool, code: &str) -> employees::Model {
    let email = format!("{}@example.test", code.to_lowercase());
    products_hr::employees::create(pool, employee_input(code, &email), today())
        .await
        .expect("create employee")
}
