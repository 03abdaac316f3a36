//! REST surface under `/api`. Every route except login resolves a
//! [`CurrentUser`](crate::auth::CurrentUser) and checks a permission before
//! calling into `products_hr`.

use axum::Router;
use chrono::{NaiveDate, Utc};

use crate::http::AppState;

mod analytics;
mod attendance;
mod auth;
mod company;
mod compliance;
mod employees;
mod leave;
mod learning;
mod payroll;
mod performance;
mod positions;
mod recruitment;
mod users;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/company", company::router())
        .nest("/employees", employees::router())
        .nest("/positions", positions::router())
        .nest("/attendance", attendance::router())
        .nest("/leave", leave::router())
        .nest("/payroll", payroll::router())
        .nest("/performance", performance::router())
        .nest("/recruitment", recruitment::router())
        .nest("/learning", learning::router())
        .nest("/compliance", compliance::router())
        .nest("/analytics", analytics::router())
        .nest("/users", users::router())
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests;
