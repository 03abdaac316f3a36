//! Postgres harness for the cross-crate suite. Tests skip themselves when
//! `TEST_DATABASE_URL` is unset.

use anyhow::{Context, Result, bail};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use url::Url;

pub struct PgTestContext {
    pub pool: DbPool,
}

/// Connects to `TEST_DATABASE_URL` and rebuilds the schema from scratch.
/// Every table is dropped, so never point this at a database you care about.
pub async fn setup_pg() -> Result<Option<PgTestContext>> {
    let raw = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping Postgres tests: TEST_DATABASE_URL not set");
            return Ok(None);
        }
    };
    let url = Url::parse(&raw).context("TEST_DATABASE_URL is not a valid URL")?;
    if !matches!(url.scheme(), "postgres" | "postgresql") {
        bail!("TEST_DATABASE_URL must use the postgres scheme");
    }

    let pool = connect(&DatabaseSettings::new(url.as_str())).await?;
    Migrator::refresh(&pool).await?;
    Ok(Some(PgTestContext { pool }))
}
