//! HR service layer.
//!
//! One module per domain area. Every module exposes plain async functions that
//! take a connection and typed inputs and return entity models, so the HTTP
//! and GraphQL surfaces stay thin.

pub mod analytics;
pub mod attendance;
pub mod company;
pub mod compliance;
pub mod employees;
mod error;
pub mod leave;
pub mod learning;
pub mod payroll;
pub mod performance;
pub mod positions;
pub mod recruitment;
pub mod seed;
pub mod users;
pub mod validation;

pub use error::{HrError, HrResult};
