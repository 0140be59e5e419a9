//! Migration: Create technician_logs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TechnicianLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TechnicianLogs::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TechnicianLogs::ReportId).big_integer().null())
                    .col(
                        ColumnDef::new(TechnicianLogs::TechnicianName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TechnicianLogs::ActionTaken)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TechnicianLogs::StatusAfter)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TechnicianLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_technician_logs_report_id")
                    .table(TechnicianLogs::Table)
                    .col(TechnicianLogs::ReportId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(TechnicianLogs::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "technician_logs"]
enum TechnicianLogs {
    Table,
    Id,
    #[iden = "report_id"]
    ReportId,
    #[iden = "technician_name"]
    TechnicianName,
    #[iden = "action_taken"]
    ActionTaken,
    #[iden = "status_after"]
    StatusAfter,
    #[iden = "created_at"]
    CreatedAt,
}
