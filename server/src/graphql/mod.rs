mod analytics;
mod me;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Schema, SimpleObject,
};
use chrono::{Datelike, Utc};
use platform_api::ApiError;
use platform_authz::Permission;
use platform_db::DbPool;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::CurrentUser;

use analytics::{DashboardPayload, DepartmentPayload, LeaveBalancePayload};
use me::MePayload;

pub type SchemaType = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(pool: DbPool) -> SchemaType {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(pool)
        .finish()
}

/// SDL for `schema:print`; needs no database.
pub fn sdl() -> String {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .finish()
        .sdl()
}

fn caller<'a>(ctx: &'a Context<'_>) -> async_graphql::Result<&'a CurrentUser> {
    ctx.data_opt::<CurrentUser>()
        .ok_or_else(|| ApiError::Unauthorized.extend())
}

fn authorize<'a>(
    ctx: &'a Context<'_>,
    permission: Permission,
) -> async_graphql::Result<&'a CurrentUser> {
    let user = caller(ctx)?;
    user.require(permission).map_err(|err| err.extend())?;
    Ok(user)
}

fn hr_error(err: products_hr::HrError) -> async_graphql::Error {
    ApiError::from(err).extend()
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self, ctx: &Context<'_>) -> async_graphql::Result<HealthPayload> {
        let pool = ctx.data::<DbPool>()?;
        let db_ok = platform_db::ping(pool).await;
        Ok(HealthPayload { ok: db_ok, db_ok })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// The caller, or null for anonymous requests.
    #[instrument(name = "graphql.me", skip_all)]
    async fn me(&self, ctx: &Context<'_>) -> Option<MePayload> {
        ctx.data_opt::<CurrentUser>().map(MePayload::from_user)
    }

    #[instrument(name = "graphql.dashboard", skip_all)]
    async fn dashboard(&self, ctx: &Context<'_>) -> async_graphql::Result<DashboardPayload> {
        authorize(ctx, Permission::AnalyticsRead)?;
        let pool = ctx.data::<DbPool>()?;
        let today = Utc::now().date_naive();
        let dashboard = products_hr::analytics::dashboard(pool, today)
            .await
            .map_err(hr_error)?;
        Ok(dashboard.into())
    }

    #[instrument(name = "graphql.department_headcount", skip_all)]
    async fn department_headcount(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<DepartmentPayload>> {
        authorize(ctx, Permission::AnalyticsRead)?;
        let pool = ctx.data::<DbPool>()?;
        let departments = products_hr::analytics::department_headcount(pool)
            .await
            .map_err(hr_error)?;
        Ok(departments.into_iter().map(Into::into).collect())
    }

    /// Defaults to the caller's own record and the current year.
    #[instrument(name = "graphql.leave_balance", skip(self, ctx))]
    async fn leave_balance(
        &self,
        ctx: &Context<'_>,
        employee_id: Option<Uuid>,
        year: Option<i32>,
    ) -> async_graphql::Result<Vec<LeaveBalancePayload>> {
        let user = authorize(ctx, Permission::LeaveRead)?;
        let employee_id = user.scope_employee(employee_id).map_err(|err| err.extend())?;
        let year = year.unwrap_or_else(|| Utc::now().year());
        let pool = ctx.data::<DbPool>()?;
        let balances = products_hr::leave::balance(pool, employee_id, year)
            .await
            .map_err(hr_error)?;
        Ok(balances.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
    pub db_ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Request;
    use migration::{Migrator, MigratorTrait};
    use platform_db::DatabaseSettings;
    use serde_json::json;

    async fn schema() -> (SchemaType, DbPool) {
        let pool = platform_db::connect(&DatabaseSettings::new("sqlite::memory:"))
            .await
            .unwrap();
        Migrator::up(&pool, None).await.unwrap();
        (build_schema(pool.clone()), pool)
    }

    async fn admin(pool: &DbPool) -> CurrentUser {
        platform_db::ensure_company(pool, "Acme HR").await.unwrap();
        products_hr::seed::seed(pool, Utc::now().date_naive())
            .await
            .unwrap();
        let user = products_hr::users::find_by_email(pool, products_hr::seed::ADMIN_EMAIL)
            .await
            .unwrap()
            .unwrap();
        CurrentUser {
            id: user.id,
            email: user.email,
            role: user.role,
            employee_id: user.employee_id,
        }
    }

    #[tokio::test]
    async fn health_query_returns_ok() {
        let (schema, _pool) = schema().await;
        let response = schema.execute(Request::new("{ health { ok dbOk } }")).await;
        assert!(response.errors.is_empty());
        let body = response.data.into_json().unwrap();
        assert_eq!(body, json!({"health": {"ok": true, "dbOk": true}}));
    }

    #[tokio::test]
    async fn anonymous_me_is_null_and_dashboard_is_rejected() {
        let (schema, _pool) = schema().await;
        let response = schema.execute(Request::new("{ me { email } }")).await;
        assert!(response.errors.is_empty());
        assert_eq!(response.data.into_json().unwrap(), json!({"me": null}));

        let response = schema
            .execute(Request::new("{ dashboard { openPostings } }"))
            .await;
        assert_eq!(response.errors.len(), 1);
        let code = response.errors[0]
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("UNAUTHORIZED")));
    }

    #[tokio::test]
    async fn admin_reads_dashboard_and_departments() {
        let (schema, pool) = schema().await;
        let user = admin(&pool).await;
        let query = "{ me { role permissions } dashboard { openPostings headcount { total } } \
                     departmentHeadcount { department headcount } }";
        let response = schema.execute(Request::new(query).data(user)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(body["me"]["role"], json!("ADMIN"));
        assert_eq!(body["dashboard"]["openPostings"], json!(1));
        assert_eq!(body["dashboard"]["headcount"]["total"], json!(6));
        assert!(
            body["departmentHeadcount"]
                .as_array()
                .unwrap()
                .iter()
                .any(|row| row["department"] == json!("Engineering"))
        );
    }

    #[test]
    fn sdl_lists_query_fields() {
        let sdl = sdl();
        for field in ["dashboard", "departmentHeadcount", "leaveBalance", "me"] {
            assert!(sdl.contains(field), "missing {field}");
        }
    }
}
