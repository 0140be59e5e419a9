//! Migration: Create reports table
//!
//! Reports outlive their computer: deleting the computer nulls the link.

use sea_orm_migration::prelude::*;

use super::m20261001_000002_create_computers::Computers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reports::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reports::ComputerId).string_len(16).null())
                    .col(ColumnDef::new(Reports::PartName).string().not_null())
                    .col(
                        ColumnDef::new(Reports::IssueDescription)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reports::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Reports::SubmittedBy).string().not_null())
                    .col(
                        ColumnDef::new(Reports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Reports::Table, Reports::ComputerId)
                            .to(Computers::Table, Computers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reports_created_at")
                    .table(Reports::Table)
                    .col(Reports::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reports::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "reports"]
enum Reports {
    Table,
    Id,
    #[iden = "computer_id"]
    ComputerId,
    #[iden = "part_name"]
    PartName,
    #[iden = "issue_description"]
    IssueDescription,
    Status,
    #[iden = "submitted_by"]
    SubmittedBy,
    #[iden = "created_at"]
    CreatedAt,
}
