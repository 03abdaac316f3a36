pub use sea_orm_migration::prelude::*;

mod m20261001_000001_people;
mod m20261001_000002_operations;
mod m20261001_000003_talent_compliance;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_people::Migration),
            Box::new(m20261001_000002_operations::Migration),
            Box::new(m20261001_000003_talent_compliance::Migration),
        ]
    }
}

pub(crate) fn uuid_pk(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

/// Appends the `created_at`/`updated_at` pair every HR table carries.
pub(crate) fn with_timestamps(
    table: &mut TableCreateStatement,
    created_at: impl IntoIden,
    updated_at: impl IntoIden,
) -> TableCreateStatement {
    table
        .col(
            ColumnDef::new(created_at)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(updated_at)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned()
}
