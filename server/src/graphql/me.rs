use async_graphql::SimpleObject;
use platform_authz::permissions_for_role;
use uuid::Uuid;

use crate::auth::CurrentUser;

#[derive(Clone, Debug, SimpleObject)]
pub struct MePayload {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub employee_id: Option<Uuid>,
    pub permissions: Vec<String>,
}

impl MePayload {
    pub fn from_user(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            employee_id: user.employee_id,
            permissions: permissions_for_role(&user.role)
                .iter()
                .map(|permission| permission.as_str().to_string())
                .collect(),
        }
    }
}
