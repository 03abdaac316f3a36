use sea_orm_migration::prelude::*;

use crate::m20261001_000001_people::{Employees, Positions};
use crate::{uuid_pk, with_timestamps};

#[derive(DeriveIden)]
enum JobPostings {
    Table,
    Id,
    Title,
    Department,
    PositionId,
    Description,
    Openings,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Candidates {
    Table,
    Id,
    JobPostingId,
    FullName,
    Email,
    Phone,
    Stage,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Title,
    Description,
    Category,
    DurationHours,
    Mandatory,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Enrollments {
    Table,
    Id,
    CourseId,
    EmployeeId,
    Status,
    Progress,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Audits {
    Table,
    Id,
    Title,
    Area,
    ScheduledFor,
    Status,
    Findings,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Violations {
    Table,
    Id,
    EmployeeId,
    Policy,
    Severity,
    Description,
    Status,
    ReportedAt,
    ResolvedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Certifications {
    Table,
    Id,
    EmployeeId,
    Name,
    Issuer,
    IssuedOn,
    ExpiresOn,
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
                    .table(JobPostings::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(JobPostings::Id))
                    .col(ColumnDef::new(JobPostings::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(JobPostings::Department)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(JobPostings::PositionId).uuid())
                    .col(ColumnDef::new(JobPostings::Description).text())
                    .col(ColumnDef::new(JobPostings::Openings).integer().not_null())
                    .col(ColumnDef::new(JobPostings::Status).string_len(16).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_postings_position")
                            .from(JobPostings::Table, JobPostings::PositionId)
                            .to(Positions::Table, Positions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    ),
                JobPostings::CreatedAt,
                JobPostings::UpdatedAt,
            ))
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Candidates::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Candidates::Id))
                    .col(ColumnDef::new(Candidates::JobPostingId).uuid().not_null())
                    .col(ColumnDef::new(Candidates::FullName).string_len(200).not_null())
                    .col(ColumnDef::new(Candidates::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Candidates::Phone).string_len(32))
                    .col(ColumnDef::new(Candidates::Stage).string_len(16).not_null())
                    .col(ColumnDef::new(Candidates::Notes).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidates_job_posting")
                            .from(Candidates::Table, Candidates::JobPostingId)
                            .to(JobPostings::Table, JobPostings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    ),
                Candidates::CreatedAt,
                Candidates::UpdatedAt,
            ))
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Courses::Id))
                    .col(ColumnDef::new(Courses::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Courses::Description).text())
                    .col(ColumnDef::new(Courses::Category).string_len(100).not_null())
                    .col(ColumnDef::new(Courses::DurationHours).integer().not_null())
                    .col(ColumnDef::new(Courses::Mandatory).boolean().not_null()),
                Courses::CreatedAt,
                Courses::UpdatedAt,
            ))
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Enrollments::Id))
                    .col(ColumnDef::new(Enrollments::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Enrollments::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Enrollments::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Enrollments::Progress).small_integer().not_null())
                    .col(ColumnDef::new(Enrollments::CompletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_course")
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_employee")
                            .from(Enrollments::Table, Enrollments::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    ),
                Enrollments::CreatedAt,
                Enrollments::UpdatedAt,
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enrollments_course_employee")
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .col(Enrollments::EmployeeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Audits::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Audits::Id))
                    .col(ColumnDef::new(Audits::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Audits::Area).string_len(100).not_null())
                    .col(ColumnDef::new(Audits::ScheduledFor).date().not_null())
                    .col(ColumnDef::new(Audits::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Audits::Findings).text()),
                Audits::CreatedAt,
                Audits::UpdatedAt,
            ))
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Violations::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Violations::Id))
                    .col(ColumnDef::new(Violations::EmployeeId).uuid())
                    .col(ColumnDef::new(Violations::Policy).string_len(200).not_null())
                    .col(ColumnDef::new(Violations::Severity).string_len(16).not_null())
                    .col(ColumnDef::new(Violations::Description).text())
                    .col(ColumnDef::new(Violations::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Violations::ReportedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Violations::ResolvedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_violations_employee")
                            .from(Violations::Table, Violations::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    ),
                Violations::CreatedAt,
                Violations::UpdatedAt,
            ))
            .await?;

        manager
            .create_table(with_timestamps(
                Table::create()
                    .table(Certifications::Table)
                    .if_not_exists()
                    .col(&mut uuid_pk(Certifications::Id))
                    .col(ColumnDef::new(Certifications::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Certifications::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Certifications::Issuer).string_len(200).not_null())
                    .col(ColumnDef::new(Certifications::IssuedOn).date().not_null())
                    .col(ColumnDef::new(Certifications::ExpiresOn).date())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certifications_employee")
                            .from(Certifications::Table, Certifications::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    ),
                Certifications::CreatedAt,
                Certifications::UpdatedAt,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Certifications::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Violations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Audits::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Candidates::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobPostings::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
