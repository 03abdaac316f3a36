//! Database entities for the HRMS suite.
//!
//! Every table keys on a UUID v4, stores money as integer cents and enums as
//! upper-case strings so the same schema runs on Postgres and SQLite.

pub mod attendance;
pub mod audits;
pub mod candidates;
pub mod certifications;
pub mod company;
pub mod courses;
pub mod employees;
pub mod enrollments;
pub mod job_postings;
pub mod leaves;
pub mod payroll;
pub mod performance_reviews;
pub mod positions;
pub mod users;
pub mod violations;
