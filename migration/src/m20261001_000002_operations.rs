use sea_orm_migration::prelude::*;

use crate::m20261001_000001_people::{Employees, Users};
use crate::{uuid_pk, with_timestamps};

#[derive(DeriveIden)]
enum Attendance {
    Table,
    Id,
    EmployeeId,
    WorkDate,
    CheckIn,
    CheckOut,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Leaves {
    Table,
    Id,
    EmployeeId,
    LeaveType,
    StartDate,
    EndDate,
    Days,
    Reason,
    Status,
    ApprovedBy,
    DecidedAt,
    DecisionNote,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Payroll {
    Table,
    Id,
    EmployeeId,
    Period,
    BasicCents,
    AllowancesCents,
    DeductionsCents,
    TaxCents,
    NetCents,
    Status,
    PaidAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PerformanceReviews {
    Table,
    Id,
    EmployeeId,
    ReviewerId,
    Period,
    Rating,
    Goals,
    Comments,
    Status,
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
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Attendance::Id))
                    .col(ColumnDef::new(Attendance::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Attendance::WorkDate).date().not_null())
                    .col(ColumnDef::new(Attendance::CheckIn).timestamp_with_time_zone())
                    .col(ColumnDef::new(Attendance::CheckOut).timestamp_with_time_zone())
                    .col(ColumnDef::new(Attendance::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Attendance::Notes).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_employee")
                            .from(Attendance::Table, Attendance::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    ),
                Attendance::CreatedAt,
                Attendance::UpdatedAt,
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_employee_day")
                    .table(Attendance::Table)
                    .col(Attendance::EmployeeId)
                    .col(Attendance::WorkDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Leaves::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Leaves::Id))
                    .col(ColumnDef::new(Leaves::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Leaves::LeaveType).string_len(16).not_null())
                    .col(ColumnDef::new(Leaves::StartDate).date().not_null())
                    .col(ColumnDef::new(Leaves::EndDate).date().not_null())
                    .col(ColumnDef::new(Leaves::Days).integer().not_null())
                    .col(ColumnDef::new(Leaves::Reason).text())
                    .col(ColumnDef::new(Leaves::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Leaves::ApprovedBy).uuid())
                    .col(ColumnDef::new(Leaves::DecidedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Leaves::DecisionNote).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leaves_employee")
                            .from(Leaves::Table, Leaves::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leaves_approved_by")
                            .from(Leaves::Table, Leaves::ApprovedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    ),
                Leaves::CreatedAt,
                Leaves::UpdatedAt,
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_leaves_employee")
                    .table(Leaves::Table)
                    .col(Leaves::EmployeeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Payroll::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Payroll::Id))
                    .col(ColumnDef::new(Payroll::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Payroll::Period).string_len(7).not_null())
                    .col(ColumnDef::new(Payroll::BasicCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payroll::AllowancesCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payroll::DeductionsCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payroll::TaxCents).big_integer().not_null())
                    .col(ColumnDef::new(Payroll::NetCents).big_integer().not_null())
                    .col(ColumnDef::new(Payroll::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Payroll::PaidAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payroll_employee")
                            .from(Payroll::Table, Payroll::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    ),
                Payroll::CreatedAt,
                Payroll::UpdatedAt,
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payroll_employee_period")
                    .table(Payroll::Table)
                    .col(Payroll::EmployeeId)
                    .col(Payroll::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(PerformanceReviews::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(PerformanceReviews::Id))
                    .col(
                        ColumnDef::new(PerformanceReviews::EmployeeId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PerformanceReviews::ReviewerId).uuid())
                    .col(
                        ColumnDef::new(PerformanceReviews::Period)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PerformanceReviews::Rating)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PerformanceReviews::Goals).text())
                    .col(ColumnDef::new(PerformanceReviews::Comments).text())
                    .col(
                        ColumnDef::new(PerformanceReviews::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_employee")
                            .from(PerformanceReviews::Table, PerformanceReviews::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_reviewer")
                            .from(PerformanceReviews::Table, PerformanceReviews::ReviewerId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    ),
                PerformanceReviews::CreatedAt,
                PerformanceReviews::UpdatedAt,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(PerformanceReviews::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Payroll::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Leaves::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attendance::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
