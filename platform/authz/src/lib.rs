//! Authorization primitives for HR modules.
//!
//! Roles map to a fixed permission list. The mapping is a pure function of the
//! role string so the same answer is produced at login and on every request.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("permission {permission} denied for role {role}")]
    Denied { role: String, permission: Permission },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    HrManager,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::HrManager => "HR_MANAGER",
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
        }
    }

    /// Case-insensitive; `hr` is accepted as shorthand for `HR_MANAGER`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "ADMIN" => Some(Role::Admin),
            "HR" | "HR_MANAGER" => Some(Role::HrManager),
            "MANAGER" => Some(Role::Manager),
            "EMPLOYEE" => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Role::Admin => ADMIN_PERMISSIONS,
            Role::HrManager => HR_MANAGER_PERMISSIONS,
            Role::Manager => MANAGER_PERMISSIONS,
            Role::Employee => EMPLOYEE_PERMISSIONS,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "employees:read")]
    EmployeesRead,
    #[serde(rename = "employees:write")]
    EmployeesWrite,
    #[serde(rename = "positions:read")]
    PositionsRead,
    #[serde(rename = "positions:write")]
    PositionsWrite,
    #[serde(rename = "attendance:read")]
    AttendanceRead,
    #[serde(rename = "attendance:write")]
    AttendanceWrite,
    #[serde(rename = "leave:read")]
    LeaveRead,
    #[serde(rename = "leave:write")]
    LeaveWrite,
    #[serde(rename = "leave:approve")]
    LeaveApprove,
    #[serde(rename = "payroll:read")]
    PayrollRead,
    #[serde(rename = "payroll:write")]
    PayrollWrite,
    #[serde(rename = "performance:read")]
    PerformanceRead,
    #[serde(rename = "performance:write")]
    PerformanceWrite,
    #[serde(rename = "recruitment:read")]
    RecruitmentRead,
    #[serde(rename = "recruitment:write")]
    RecruitmentWrite,
    #[serde(rename = "learning:read")]
    LearningRead,
    #[serde(rename = "learning:write")]
    LearningWrite,
    #[serde(rename = "compliance:read")]
    ComplianceRead,
    #[serde(rename = "compliance:write")]
    ComplianceWrite,
    #[serde(rename = "analytics:read")]
    AnalyticsRead,
    #[serde(rename = "company:write")]
    CompanyWrite,
    #[serde(rename = "users:write")]
    UsersWrite,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::EmployeesRead => "employees:read",
            Permission::EmployeesWrite => "employees:write",
            Permission::PositionsRead => "positions:read",
            Permission::PositionsWrite => "positions:write",
            Permission::AttendanceRead => "attendance:read",
            Permission::AttendanceWrite => "attendance:write",
            Permission::LeaveRead => "leave:read",
            Permission::LeaveWrite => "leave:write",
            Permission::LeaveApprove => "leave:approve",
            Permission::PayrollRead => "payroll:read",
            Permission::PayrollWrite => "payroll:write",
            Permission::PerformanceRead => "performance:read",
            Permission::PerformanceWrite => "performance:write",
            Permission::RecruitmentRead => "recruitment:read",
            Permission::RecruitmentWrite => "recruitment:write",
            Permission::LearningRead => "learning:read",
            Permission::LearningWrite => "learning:write",
            Permission::ComplianceRead => "compliance:read",
            Permission::ComplianceWrite => "compliance:write",
            Permission::AnalyticsRead => "analytics:read",
            Permission::CompanyWrite => "company:write",
            Permission::UsersWrite => "users:write",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use Permission::*;

const ADMIN_PERMISSIONS: &[Permission] = &[
    EmployeesRead,
    EmployeesWrite,
    PositionsRead,
    PositionsWrite,
    AttendanceRead,
    AttendanceWrite,
    LeaveRead,
    LeaveWrite,
    LeaveApprove,
    PayrollRead,
    PayrollWrite,
    PerformanceRead,
    PerformanceWrite,
    RecruitmentRead,
    RecruitmentWrite,
    LearningRead,
    LearningWrite,
    ComplianceRead,
    ComplianceWrite,
    AnalyticsRead,
    CompanyWrite,
    UsersWrite,
];

const HR_MANAGER_PERMISSIONS: &[Permission] = &[
    EmployeesRead,
    EmployeesWrite,
    PositionsRead,
    PositionsWrite,
    AttendanceRead,
    AttendanceWrite,
    LeaveRead,
    LeaveWrite,
    LeaveApprove,
    PayrollRead,
    PayrollWrite,
    PerformanceRead,
    PerformanceWrite,
    RecruitmentRead,
    RecruitmentWrite,
    LearningRead,
    LearningWrite,
    ComplianceRead,
    ComplianceWrite,
    AnalyticsRead,
];

const MANAGER_PERMISSIONS: &[Permission] = &[
    EmployeesRead,
    PositionsRead,
    AttendanceRead,
    AttendanceWrite,
    LeaveRead,
    LeaveApprove,
    PerformanceRead,
    PerformanceWrite,
    RecruitmentRead,
    LearningRead,
    ComplianceRead,
    AnalyticsRead,
];

const EMPLOYEE_PERMISSIONS: &[Permission] = &[
    EmployeesRead,
    AttendanceRead,
    AttendanceWrite,
    LeaveRead,
    LeaveWrite,
    LearningRead,
    PerformanceRead,
];

/// Permission list for a raw role string. Unknown roles get nothing.
pub fn permissions_for_role(role: &str) -> &'static [Permission] {
    Role::parse(role).map(Role::permissions).unwrap_or(&[])
}

#[derive(Default, Debug)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn check(&self, role: &str, permission: Permission) -> Result<(), AuthzError> {
        if permissions_for_role(role).contains(&permission) {
            Ok(())
        } else {
            Err(AuthzError::Denied {
                role: role.to_string(),
                permission,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("Hr"), Some(Role::HrManager));
        assert_eq!(Role::parse("hr-manager"), Some(Role::HrManager));
        assert_eq!(Role::parse(" EMPLOYEE "), Some(Role::Employee));
        assert_eq!(Role::parse("intern"), None);
        assert_eq!(Role::parse("super_admin"), None);
    }

    #[test]
    fn admin_holds_every_permission() {
        let admin = permissions_for_role("admin");
        for permission in HR_MANAGER_PERMISSIONS
            .iter()
            .chain(MANAGER_PERMISSIONS)
            .chain(EMPLOYEE_PERMISSIONS)
        {
            assert!(admin.contains(permission), "admin lacks {permission}");
        }
        assert!(admin.contains(&CompanyWrite));
        assert!(admin.contains(&UsersWrite));
    }

    #[test]
    fn hr_manager_cannot_touch_company_or_users() {
        let hr = permissions_for_role("HR_MANAGER");
        assert!(hr.contains(&PayrollWrite));
        assert!(!hr.contains(&CompanyWrite));
        assert!(!hr.contains(&UsersWrite));
    }

    #[test]
    fn mapping_is_pure_and_unknown_roles_are_empty() {
        assert_eq!(permissions_for_role("manager"), permissions_for_role("MANAGER"));
        assert!(permissions_for_role("").is_empty());
        assert!(permissions_for_role("contractor").is_empty());
    }

    #[test]
    fn policy_engine_denies_missing_permission() {
        let engine = PolicyEngine;
        assert!(engine.check("employee", LeaveWrite).is_ok());
        assert_eq!(
            engine.check("employee", PayrollRead),
            Err(AuthzError::Denied {
                role: "employee".into(),
                permission: PayrollRead,
            })
        );
    }

    #[test]
    fn permissions_serialize_as_scoped_strings() {
        let value = serde_json::to_value(LeaveApprove).unwrap();
        assert_eq!(value, serde_json::json!("leave:approve"));
    }
}
