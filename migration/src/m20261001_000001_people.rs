use sea_orm_migration::prelude::*;

use crate::{uuid_pk, with_timestamps};

#[derive(DeriveIden)]
enum Company {
    Table,
    Id,
    Name,
    LogoUrl,
    PrimaryColor,
    SecondaryColor,
    SubscriptionPlan,
    SubscriptionExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Positions {
    Table,
    Id,
    Title,
    Department,
    ReportsTo,
    MinSalaryCents,
    MaxSalaryCents,
    Headcount,
    IsOpen,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Employees {
    Table,
    Id,
    EmployeeCode,
    FirstName,
    LastName,
    Email,
    Phone,
    Cnic,
    DateOfBirth,
    Gender,
    Department,
    PositionId,
    ReportsTo,
    HireDate,
    Status,
    BaseSalaryCents,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    PasswordHash,
    Role,
    EmployeeId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Company::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Company::Id))
                    .col(ColumnDef::new(Company::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Company::LogoUrl).string_len(512))
                    .col(ColumnDef::new(Company::PrimaryColor).string_len(16))
                    .col(ColumnDef::new(Company::SecondaryColor).string_len(16))
                    .col(
                        ColumnDef::new(Company::SubscriptionPlan)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Company::SubscriptionExpiresAt).timestamp_with_time_zone()),
                Company::CreatedAt,
                Company::UpdatedAt,
            ))
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Positions::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Positions::Id))
                    .col(ColumnDef::new(Positions::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Positions::Department).string_len(100).not_null())
                    .col(ColumnDef::new(Positions::ReportsTo).uuid())
                    .col(
                        ColumnDef::new(Positions::MinSalaryCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Positions::MaxSalaryCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Positions::Headcount).integer().not_null())
                    .col(ColumnDef::new(Positions::IsOpen).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_positions_reports_to")
                            .from(Positions::Table, Positions::ReportsTo)
                            .to(Positions::Table, Positions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    ),
                Positions::CreatedAt,
                Positions::UpdatedAt,
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_positions_department")
                    .table(Positions::Table)
                    .col(Positions::Department)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Employees::Id))
                    .col(
                        ColumnDef::new(Employees::EmployeeCode)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Employees::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Employees::LastName).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Employees::Email)
                            .string_len(320)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Employees::Phone).string_len(32))
                    .col(ColumnDef::new(Employees::Cnic).string_len(15).not_null())
                    .col(ColumnDef::new(Employees::DateOfBirth).date().not_null())
                    .col(ColumnDef::new(Employees::Gender).string_len(16))
                    .col(ColumnDef::new(Employees::Department).string_len(100).not_null())
                    .col(ColumnDef::new(Employees::PositionId).uuid())
                    .col(ColumnDef::new(Employees::ReportsTo).uuid())
                    .col(ColumnDef::new(Employees::HireDate).date().not_null())
                    .col(ColumnDef::new(Employees::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Employees::BaseSalaryCents)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_position")
                            .from(Employees::Table, Employees::PositionId)
                            .to(Positions::Table, Positions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_reports_to")
                            .from(Employees::Table, Employees::ReportsTo)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    ),
                Employees::CreatedAt,
                Employees::UpdatedAt,
            ))
            .await?;

        for (name, col) in [
            ("idx_employees_department", Employees::Department),
            ("idx_employees_position", Employees::PositionId),
            ("idx_employees_reports_to", Employees::ReportsTo),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Employees::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Users::Id))
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(320)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::DisplayName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(32).not_null())
                    .col(ColumnDef::new(Users::EmployeeId).uuid())
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_employee")
                            .from(Users::Table, Users::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    ),
                Users::CreatedAt,
                Users::UpdatedAt,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Positions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Company::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
