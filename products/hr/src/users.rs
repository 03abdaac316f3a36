//! Login accounts.

use chrono::Utc;
use entity::{employees, users};
use platform_authn::{hash_password, verify_password};
use platform_authz::Role;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::validation::{normalize_email, required};
use crate::{HrError, HrResult};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct NewUserInput {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub role: String,
    pub employee_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub employee_id: Option<Uuid>,
}

fn parse_role(value: &str) -> HrResult<Role> {
    Role::parse(value).ok_or_else(|| HrError::validation(format!("unknown role {value}")))
}

fn validate_password(value: &str) -> HrResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(HrError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

async fn ensure_employee<C: ConnectionTrait>(db: &C, employee_id: Uuid) -> HrResult<()> {
    employees::Entity::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("employee", employee_id))?;
    Ok(())
}

fn hash(value: &str) -> HrResult<String> {
    hash_password(value).map_err(|err| HrError::Database(DbErr::Custom(err.to_string())))
}

/// Checks email/password and returns the active account.
#[instrument(skip(db, password))]
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
) -> HrResult<users::Model> {
    let email = normalize_email(email).map_err(|_| HrError::InvalidCredentials)?;
    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or(HrError::InvalidCredentials)?;
    if !user.is_active {
        return Err(HrError::InvalidCredentials);
    }
    verify_password(password, &user.password_hash).map_err(|_| HrError::InvalidCredentials)?;
    Ok(user)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HrResult<users::Model> {
    users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("user", id))
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> HrResult<Option<users::Model>> {
    let email = normalize_email(email)?;
    Ok(users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn list<C: ConnectionTrait>(db: &C) -> HrResult<Vec<users::Model>> {
    Ok(users::Entity::find()
        .order_by_asc(users::Column::Email)
        .all(db)
        .await?)
}

#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn register<C: ConnectionTrait>(db: &C, input: NewUserInput) -> HrResult<users::Model> {
    let email = normalize_email(&input.email)?;
    let display_name = required("display_name", &input.display_name, 100)?;
    let role = parse_role(&input.role)?;
    validate_password(&input.password)?;
    if let Some(employee_id) = input.employee_id {
        ensure_employee(db, employee_id).await?;
    }
    if find_by_email(db, &email).await?.is_some() {
        return Err(HrError::Conflict(format!("user {email} already exists")));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        display_name: Set(display_name),
        password_hash: Set(hash(&input.password)?),
        role: Set(role.as_str().to_string()),
        employee_id: Set(input.employee_id),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(user)
}

#[instrument(skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateUserInput,
) -> HrResult<users::Model> {
    let existing = get(db, id).await?;
    let mut active: users::ActiveModel = existing.into();
    if let Some(name) = &input.display_name {
        active.display_name = Set(required("display_name", name, 100)?);
    }
    if let Some(role) = &input.role {
        active.role = Set(parse_role(role)?.as_str().to_string());
    }
    if let Some(password) = &input.password {
        validate_password(password)?;
        active.password_hash = Set(hash(password)?);
    }
    if let Some(is_active) = input.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(employee_id) = input.employee_id {
        ensure_employee(db, employee_id).await?;
        active.employee_id = Set(Some(employee_id));
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}
