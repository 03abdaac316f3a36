//! Deterministic demo dataset for local runs and screenshots.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use entity::employees::Gender;
use entity::enrollments;
use entity::leaves::LeaveType;
use entity::violations::Severity;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::employees::NewEmployeeInput;
use crate::learning::{EnrollInput, NewCourseInput, ProgressInput};
use crate::leave::{DecisionInput, NewLeaveInput};
use crate::positions::NewPositionInput;
use crate::users::NewUserInput;
use crate::validation::period_of;
use crate::{
    HrError, HrResult, attendance, compliance, employees, learning, leave, payroll, positions,
    recruitment, users,
};

pub const ADMIN_EMAIL: &str = "admin@hrms.local";
pub const DEMO_PASSWORD: &str = "hrms-demo-pass";

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub skipped: bool,
    pub users: usize,
    pub employees: usize,
    pub payroll: usize,
}

struct Person {
    code: &'static str,
    first: &'static str,
    last: &'static str,
    cnic: &'static str,
    born: (i32, u32, u32),
    hired: (i32, u32, u32),
    gender: Gender,
    department: &'static str,
    position: usize,
    manager: Option<usize>,
    salary_cents: i64,
}

const POSITIONS: [(&str, &str, i64, i64); 5] = [
    ("Head of Engineering", "Engineering", 40_000_000, 60_000_000),
    ("Software Engineer", "Engineering", 15_000_000, 35_000_000),
    ("HR Manager", "Human Resources", 20_000_000, 35_000_000),
    ("Accountant", "Finance", 10_000_000, 20_000_000),
    ("Sales Executive", "Sales", 8_000_000, 15_000_000),
];

const PEOPLE: [Person; 6] = [
    Person {
        code: "EMP-001",
        first: "Ayesha",
        last: "Khan",
        cnic: "35202-1000001-2",
        born: (1984, 3, 14),
        hired: (2018, 1, 8),
        gender: Gender::Female,
        department: "Engineering",
        position: 0,
        manager: None,
        salary_cents: 45_000_000,
    },
    Person {
        code: "EMP-002",
        first: "Bilal",
        last: "Ahmed",
        cnic: "35202-1000002-3",
        born: (1988, 7, 2),
        hired: (2019, 4, 15),
        gender: Gender::Male,
        department: "Human Resources",
        position: 2,
        manager: None,
        salary_cents: 25_000_000,
    },
    Person {
        code: "EMP-003",
        first: "Sara",
        last: "Malik",
        cnic: "35202-1000003-4",
        born: (1995, 11, 20),
        hired: (2021, 9, 1),
        gender: Gender::Female,
        department: "Engineering",
        position: 1,
        manager: Some(0),
        salary_cents: 18_000_000,
    },
    Person {
        code: "EMP-004",
        first: "Usman",
        last: "Raza",
        cnic: "35202-1000004-5",
        born: (1993, 5, 9),
        hired: (2022, 2, 14),
        gender: Gender::Male,
        department: "Engineering",
        position: 1,
        manager: Some(0),
        salary_cents: 16_000_000,
    },
    Person {
        code: "EMP-005",
        first: "Hina",
        last: "Qureshi",
        cnic: "35202-1000005-6",
        born: (1990, 1, 30),
        hired: (2020, 6, 1),
        gender: Gender::Female,
        department: "Finance",
        position: 3,
        manager: Some(1),
        salary_cents: 12_000_000,
    },
    Person {
        code: "EMP-006",
        first: "Omar",
        last: "Farooq",
        cnic: "35202-1000006-7",
        born: (1998, 8, 17),
        hired: (2023, 3, 6),
        gender: Gender::Male,
        department: "Sales",
        position: 4,
        manager: Some(1),
        salary_cents: 9_000_000,
    },
];

fn date((y, m, d): (i32, u32, u32)) -> HrResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| HrError::validation(format!("invalid seed date {y}-{m}-{d}")))
}

fn at(day: NaiveDate, hour: u32, minute: u32) -> HrResult<DateTime<Utc>> {
    day.and_hms_opt(hour, minute, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| HrError::validation("invalid seed time"))
}

/// Inserts the demo dataset unless the admin login already exists.
#[instrument(skip(db))]
pub async fn seed<C: ConnectionTrait>(db: &C, today: NaiveDate) -> HrResult<SeedReport> {
    if users::find_by_email(db, ADMIN_EMAIL).await?.is_some() {
        info!("demo data already present");
        return Ok(SeedReport {
            skipped: true,
            ..SeedReport::default()
        });
    }

    let mut position_ids = Vec::with_capacity(POSITIONS.len());
    for (title, department, min, max) in POSITIONS {
        let position = positions::create(
            db,
            NewPositionInput {
                title: title.to_string(),
                department: department.to_string(),
                reports_to: position_ids.first().copied(),
                min_salary_cents: min,
                max_salary_cents: max,
                headcount: 2,
                is_open: true,
            },
        )
        .await?;
        position_ids.push(position.id);
    }

    let mut staff: Vec<Uuid> = Vec::with_capacity(PEOPLE.len());
    for person in &PEOPLE {
        let reports_to = person.manager.and_then(|index| staff.get(index).copied());
        let employee = employees::create(
            db,
            NewEmployeeInput {
                employee_code: person.code.to_string(),
                first_name: person.first.to_string(),
                last_name: person.last.to_string(),
                email: format!(
                    "{}.{}@hrms.local",
                    person.first.to_lowercase(),
                    person.last.to_lowercase()
                ),
                phone: None,
                cnic: person.cnic.to_string(),
                date_of_birth: date(person.born)?,
                gender: Some(person.gender),
                department: person.department.to_string(),
                position_id: position_ids.get(person.position).copied(),
                reports_to,
                hire_date: date(person.hired)?,
                status: None,
                base_salary_cents: person.salary_cents,
            },
            today,
        )
        .await?;
        staff.push(employee.id);
    }

    let logins = [
        (ADMIN_EMAIL, "Administrator", "ADMIN", None),
        ("hr@hrms.local", "Bilal Ahmed", "HR_MANAGER", staff.get(1).copied()),
        ("manager@hrms.local", "Ayesha Khan", "MANAGER", staff.first().copied()),
        ("employee@hrms.local", "Sara Malik", "EMPLOYEE", staff.get(2).copied()),
    ];
    let mut admin_id = None;
    for (email, name, role, employee_id) in logins {
        let user = users::register(
            db,
            NewUserInput {
                email: email.to_string(),
                display_name: name.to_string(),
                password: DEMO_PASSWORD.to_string(),
                role: role.to_string(),
                employee_id,
            },
        )
        .await?;
        admin_id.get_or_insert(user.id);
    }

    // Leave: one approved in the past, one pending next week.
    if let (Some(&sara), Some(&usman)) = (staff.get(2), staff.get(3)) {
        let past = leave::create(
            db,
            NewLeaveInput {
                employee_id: sara,
                leave_type: LeaveType::Annual,
                start_date: today - Duration::days(20),
                end_date: today - Duration::days(18),
                reason: Some("Family trip".to_string()),
            },
        )
        .await?;
        leave::approve(db, past.id, admin_id, DecisionInput::default()).await?;
        leave::create(
            db,
            NewLeaveInput {
                employee_id: usman,
                leave_type: LeaveType::Sick,
                start_date: today + Duration::days(7),
                end_date: today + Duration::days(8),
                reason: Some("Medical appointment".to_string()),
            },
        )
        .await?;
    }

    // Today's attendance: one on time, one late.
    for (index, (hour, minute)) in [(8, 55), (9, 40)].into_iter().enumerate() {
        if let Some(&employee_id) = staff.get(index + 2) {
            attendance::check_in(db, employee_id, at(today, hour, minute)?).await?;
        }
    }

    let last_month = today
        .with_day(1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(today);
    let generated = payroll::generate(db, &period_of(last_month)).await?;

    let conduct = learning::create_course(
        db,
        NewCourseInput {
            title: "Code of Conduct".to_string(),
            description: Some("Workplace policies and ethics".to_string()),
            category: "Compliance".to_string(),
            duration_hours: 2,
            mandatory: true,
        },
    )
    .await?;
    learning::create_course(
        db,
        NewCourseInput {
            title: "Async Rust for Services".to_string(),
            description: None,
            category: "Engineering".to_string(),
            duration_hours: 16,
            mandatory: false,
        },
    )
    .await?;
    for (index, employee_id) in staff.iter().enumerate() {
        let enrollment: enrollments::Model =
            learning::enroll(db, conduct.id, EnrollInput { employee_id: *employee_id }).await?;
        if index % 2 == 0 {
            learning::update_progress(db, enrollment.id, ProgressInput { progress: 100 }).await?;
        }
    }

    recruitment::create_posting(
        db,
        recruitment::NewPostingInput {
            title: "Senior Software Engineer".to_string(),
            department: "Engineering".to_string(),
            position_id: position_ids.get(1).copied(),
            description: Some("Backend services in Rust".to_string()),
            openings: 2,
        },
    )
    .await?;

    compliance::create_audit(
        db,
        compliance::NewAuditInput {
            title: "Annual payroll audit".to_string(),
            area: "Finance".to_string(),
            scheduled_for: today + Duration::days(30),
            findings: None,
        },
    )
    .await?;
    compliance::report_violation(
        db,
        compliance::NewViolationInput {
            employee_id: staff.get(5).copied(),
            policy: "Attendance policy".to_string(),
            severity: Severity::Low,
            description: Some("Repeated late arrivals".to_string()),
        },
    )
    .await?;
    if let Some(&ayesha) = staff.first() {
        compliance::create_certification(
            db,
            compliance::NewCertificationInput {
                employee_id: ayesha,
                name: "Certified Kubernetes Administrator".to_string(),
                issuer: "CNCF".to_string(),
                issued_on: today - Duration::days(700),
                expires_on: Some(today + Duration::days(30)),
            },
        )
        .await?;
    }

    let report = SeedReport {
        skipped: false,
        users: logins.len(),
        employees: staff.len(),
        payroll: generated.len(),
    };
    info!(?report, "demo data seeded");
    Ok(report)
}
