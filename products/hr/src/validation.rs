//! Field validators shared by the domain modules.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{HrError, HrResult};

static CNIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}-\d{7}-\d$").expect("cnic regex"));
static PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("period regex"));

pub const MIN_EMPLOYEE_AGE: u32 = 18;
pub const DEFAULT_PAGE: u64 = 50;
pub const MAX_PAGE: u64 = 200;
/// Largest money amount accepted anywhere, in cents.
pub const MAX_CENTS: i64 = 10_000_000_000_000;

pub fn required(field: &str, value: &str, max: usize) -> HrResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HrError::validation(format!("{field} is required")));
    }
    max_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Trims, and maps blank strings to `None`.
pub fn optional(field: &str, value: Option<String>, max: usize) -> HrResult<Option<String>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            max_length(field, trimmed, max)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

pub fn max_length(field: &str, value: &str, max: usize) -> HrResult<()> {
    if value.chars().count() > max {
        return Err(HrError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn normalize_email(value: &str) -> HrResult<String> {
    let trimmed = value.trim().to_lowercase();
    let invalid = || HrError::validation("invalid email address");
    let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || trimmed.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    max_length("email", &trimmed, 320)?;
    Ok(trimmed)
}

/// National identity number in `#####-#######-#` form.
pub fn validate_cnic(value: &str) -> HrResult<String> {
    let trimmed = value.trim();
    if !CNIC_RE.is_match(trimmed) {
        return Err(HrError::validation("cnic must match #####-#######-#"));
    }
    Ok(trimmed.to_string())
}

pub fn age_on(date_of_birth: NaiveDate, on: NaiveDate) -> Option<u32> {
    on.years_since(date_of_birth)
}

/// Date of birth must be in the past and the person must be of working age on
/// `hire_date`.
pub fn validate_date_of_birth(
    date_of_birth: NaiveDate,
    hire_date: NaiveDate,
    today: NaiveDate,
) -> HrResult<()> {
    if date_of_birth >= today {
        return Err(HrError::validation("date_of_birth must be in the past"));
    }
    match age_on(date_of_birth, hire_date) {
        Some(age) if age >= MIN_EMPLOYEE_AGE => Ok(()),
        _ => Err(HrError::validation(format!(
            "employee must be at least {MIN_EMPLOYEE_AGE} years old at hire_date"
        ))),
    }
}

/// Payroll/review period in `YYYY-MM` form.
pub fn validate_period(value: &str) -> HrResult<String> {
    let trimmed = value.trim();
    if !PERIOD_RE.is_match(trimmed) {
        return Err(HrError::validation("period must be formatted as YYYY-MM"));
    }
    Ok(trimmed.to_string())
}

/// First and last day of a validated `YYYY-MM` period.
pub fn period_bounds(period: &str) -> HrResult<(NaiveDate, NaiveDate)> {
    let period = validate_period(period)?;
    let (year, month) = period.split_at(4);
    let year: i32 = year
        .parse()
        .map_err(|_| HrError::validation("invalid period year"))?;
    let month: u32 = month[1..]
        .parse()
        .map_err(|_| HrError::validation("invalid period month"))?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| HrError::validation("invalid period"))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| HrError::validation("invalid period"))?;
    Ok((first, next.pred_opt().unwrap_or(first)))
}

pub fn period_of(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub fn non_negative_cents(field: &str, value: i64) -> HrResult<i64> {
    if value < 0 {
        return Err(HrError::validation(format!("{field} must not be negative")));
    }
    if value > MAX_CENTS {
        return Err(HrError::validation(format!(
            "{field} must be at most {MAX_CENTS} cents"
        )));
    }
    Ok(value)
}

pub fn page_limit(limit: Option<u64>) -> HrResult<u64> {
    match limit {
        None => Ok(DEFAULT_PAGE),
        Some(0) => Err(HrError::validation("limit must be positive")),
        Some(value) if value > MAX_PAGE => Err(HrError::validation(format!(
            "cannot request more than {MAX_PAGE} records at once"
        ))),
        Some(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cents_are_bounded() {
        assert_eq!(non_negative_cents("basic", 0).unwrap(), 0);
        assert_eq!(non_negative_cents("basic", MAX_CENTS).unwrap(), MAX_CENTS);
        assert!(non_negative_cents("basic", -1).is_err());
        assert!(non_negative_cents("basic", MAX_CENTS + 1).is_err());
        assert!(non_negative_cents("basic", i64::MAX).is_err());
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Ada.Lovelace@Example.COM ").unwrap(),
            "ada.lovelace@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in [
            "", "ada", "@example.com", "ada@", "ada@example", "a b@x.io", "a@@x.io", "a@.io",
        ] {
            assert!(normalize_email(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn cnic_format() {
        assert!(validate_cnic("35202-1234567-1").is_ok());
        assert!(validate_cnic(" 35202-1234567-1 ").is_ok());
        for bad in ["3520212345671", "35202-123456-1", "35202-1234567-12", "abcde-1234567-1"] {
            assert!(validate_cnic(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn date_of_birth_rules() {
        let today = date(2026, 10, 18);
        assert!(validate_date_of_birth(date(1990, 5, 1), date(2020, 1, 1), today).is_ok());
        // born in the future
        assert!(validate_date_of_birth(date(2027, 1, 1), date(2026, 1, 1), today).is_err());
        // seventeen at hire
        assert!(validate_date_of_birth(date(2003, 6, 2), date(2021, 6, 1), today).is_err());
        // eighteenth birthday on hire date
        assert!(validate_date_of_birth(date(2003, 6, 1), date(2021, 6, 1), today).is_ok());
    }

    #[test]
    fn period_parsing() {
        assert_eq!(
            period_bounds("2026-02").unwrap(),
            (date(2026, 2, 1), date(2026, 2, 28))
        );
        assert_eq!(
            period_bounds("2024-12").unwrap(),
            (date(2024, 12, 1), date(2024, 12, 31))
        );
        assert!(validate_period("2026-13").is_err());
        assert!(validate_period("26-01").is_err());
        assert_eq!(period_of(date(2026, 3, 9)), "2026-03");
    }

    #[test]
    fn page_limits() {
        assert_eq!(page_limit(None).unwrap(), DEFAULT_PAGE);
        assert_eq!(page_limit(Some(10)).unwrap(), 10);
        assert!(page_limit(Some(0)).is_err());
        assert!(page_limit(Some(MAX_PAGE + 1)).is_err());
    }

    #[test]
    fn optional_blank_becomes_none() {
        assert_eq!(optional("phone", Some("   ".into()), 32).unwrap(), None);
        assert_eq!(
            optional("phone", Some(" 0300 ".into()), 32).unwrap(),
            Some("0300".into())
        );
        assert!(optional("phone", Some("x".repeat(40)), 32).is_err());
    }
}
