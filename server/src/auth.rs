//! Bearer-token extraction and permission checks for handlers.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};
use platform_api::{ApiError, ApiResult};
use platform_authn::{bearer_token, decode_token};
use platform_authz::{Permission, PolicyEngine, Role};
use tracing::debug;
use uuid::Uuid;

use crate::http::AppState;

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub employee_id: Option<Uuid>,
}

impl CurrentUser {
    pub fn require(&self, permission: Permission) -> ApiResult<()> {
        PolicyEngine
            .check(&self.role, permission)
            .map_err(|err| ApiError::Forbidden(err.to_string()))
    }

    pub fn is_employee(&self) -> bool {
        Role::parse(&self.role) == Some(Role::Employee)
    }

    /// Resolves which employee a self-service request acts on. Plain employees
    /// may only act on their own record.
    pub fn scope_employee(&self, requested: Option<Uuid>) -> ApiResult<Uuid> {
        match (requested, self.employee_id) {
            (Some(requested), Some(own)) if self.is_employee() && requested != own => Err(
                ApiError::Forbidden("employees may only act on their own records".into()),
            ),
            (Some(requested), _) if !self.is_employee() => Ok(requested),
            (_, Some(own)) => Ok(own),
            (None, None) => Err(ApiError::invalid(
                "employee_id is required for accounts without an employee record",
            )),
            (Some(_), None) => Err(ApiError::Forbidden(
                "account is not linked to an employee".into(),
            )),
        }
    }

    /// Narrows a list filter so plain employees only see their own rows.
    pub fn scope_filter(&self, requested: Option<Uuid>) -> ApiResult<Option<Uuid>> {
        if self.is_employee() {
            self.scope_employee(requested).map(Some)
        } else {
            Ok(requested)
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = bearer_token(header).ok_or(ApiError::Unauthorized)?;
        let claims = decode_token(token, &state.config.auth).map_err(|err| {
            debug!(error = %err, "rejected bearer token");
            ApiError::Unauthorized
        })?;
        let user = products_hr::users::get(&state.pool, claims.sub)
            .await
            .map_err(|err| match err {
                products_hr::HrError::NotFound { .. } => ApiError::Unauthorized,
                other => other.into(),
            })?;
        if !user.is_active {
            return Err(ApiError::Unauthorized);
        }
        Ok(Self {
            id: user.id,
            email: user.email,
            role: user.role,
            employee_id: user.employee_id,
        })
    }
}

/// `Option<CurrentUser>`: no header means anonymous, a bad token is still 401.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> ApiResult<Option<Self>> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }
        <Self as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str, employee_id: Option<Uuid>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "someone@example.test".into(),
            role: role.into(),
            employee_id,
        }
    }

    #[test]
    fn employees_are_scoped_to_themselves() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let employee = user("EMPLOYEE", Some(own));
        assert_eq!(employee.scope_employee(None).unwrap(), own);
        assert_eq!(employee.scope_employee(Some(own)).unwrap(), own);
        assert!(employee.scope_employee(Some(other)).is_err());
        assert_eq!(employee.scope_filter(None).unwrap(), Some(own));

        let hr = user("HR_MANAGER", None);
        assert_eq!(hr.scope_employee(Some(other)).unwrap(), other);
        assert!(hr.scope_employee(None).is_err());
        assert_eq!(hr.scope_filter(None).unwrap(), None);
    }

    #[test]
    fn require_maps_to_forbidden() {
        let manager = user("MANAGER", None);
        assert!(manager.require(Permission::LeaveApprove).is_ok());
        assert!(matches!(
            manager.require(Permission::PayrollWrite),
            Err(ApiError::Forbidden(_))
        ));
    }
}
