//! Company branding and subscription settings.

use chrono::{DateTime, Utc};
use entity::company::{self, SubscriptionPlan};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::validation::{optional, required};
use crate::{HrError, HrResult};

/// Settings row plus the derived subscription flag.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyView {
    #[serde(flatten)]
    pub company: company::Model,
    pub subscription_active: bool,
}

impl CompanyView {
    pub fn new(company: company::Model, now: DateTime<Utc>) -> Self {
        let subscription_active = is_subscription_active(company.subscription_expires_at, now);
        Self {
            company,
            subscription_active,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCompanyInput {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub subscription_plan: Option<SubscriptionPlan>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
}

/// Active iff an expiry is stored and it is still in the future.
pub fn is_subscription_active(
    expires_at: Option<DateTimeWithTimeZone>,
    now: DateTime<Utc>,
) -> bool {
    expires_at.is_some_and(|expiry| now < expiry.with_timezone(&Utc))
}

fn validate_color(field: &str, value: Option<String>) -> HrResult<Option<String>> {
    let value = optional(field, value, 16)?;
    if let Some(color) = &value {
        let hex = color.strip_prefix('#').unwrap_or("");
        if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HrError::validation(format!("{field} must be a hex color like #1a2b3c")));
        }
    }
    Ok(value)
}

pub async fn current<C: ConnectionTrait>(db: &C) -> HrResult<company::Model> {
    company::Entity::find()
        .one(db)
        .await?
        .ok_or_else(|| HrError::not_found("company", Uuid::nil()))
}

#[instrument(skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    input: UpdateCompanyInput,
) -> HrResult<company::Model> {
    let existing = current(db).await?;
    let mut active: company::ActiveModel = existing.into();
    if let Some(name) = &input.name {
        active.name = Set(required("name", name, 200)?);
    }
    if input.logo_url.is_some() {
        active.logo_url = Set(optional("logo_url", input.logo_url, 512)?);
    }
    if input.primary_color.is_some() {
        active.primary_color = Set(validate_color("primary_color", input.primary_color)?);
    }
    if input.secondary_color.is_some() {
        active.secondary_color = Set(validate_color("secondary_color", input.secondary_color)?);
    }
    if let Some(plan) = input.subscription_plan {
        active.subscription_plan = Set(plan);
    }
    if let Some(expires_at) = input.subscription_expires_at {
        active.subscription_expires_at = Set(Some(expires_at.into()));
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn subscription_active_compares_expiry_with_now() {
        let now = Utc::now();
        assert!(is_subscription_active(Some((now + Duration::days(1)).into()), now));
        assert!(!is_subscription_active(Some((now - Duration::seconds(1)).into()), now));
        assert!(!is_subscription_active(Some(now.into()), now));
        assert!(!is_subscription_active(None, now));
    }

    #[test]
    fn colors_must_be_hex() {
        assert_eq!(
            validate_color("primary_color", Some("#1A2b3c".into())).unwrap(),
            Some("#1A2b3c".into())
        );
        assert!(validate_color("primary_color", Some("#fff".into())).is_ok());
        assert!(validate_color("primary_color", Some("blue".into())).is_err());
        assert!(validate_color("primary_color", Some("#12345".into())).is_err());
    }
}
