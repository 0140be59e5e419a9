//! Migration: Create computer_parts table
//!
//! Standard parts are unique per (computer, category) and custom parts per
//! (computer, name). Both constraints are partial indexes keyed on `kind`,
//! which the schema builder cannot express, so they are issued as raw SQL.

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
                    .table(ComputerParts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComputerParts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComputerParts::ComputerId)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComputerParts::Name).string().not_null())
                    .col(ColumnDef::new(ComputerParts::SerialNumber).string().null())
                    .col(ColumnDef::new(ComputerParts::Category).string().not_null())
                    .col(ColumnDef::new(ComputerParts::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(ComputerParts::Status)
                            .string_len(20)
                            .not_null()
                            .default("operational"),
                    )
                    .col(
                        ColumnDef::new(ComputerParts::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ComputerParts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ComputerParts::Table, ComputerParts::ComputerId)
                            .to(Computers::Table, Computers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_computer_parts_standard_slot \
             ON computer_parts (computer_id, category) WHERE kind = 'standard'",
        )
        .await?;
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_computer_parts_custom_name \
             ON computer_parts (computer_id, name) WHERE kind = 'custom'",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ComputerParts::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "computer_parts"]
enum ComputerParts {
    Table,
    Id,
    #[iden = "computer_id"]
    ComputerId,
    Name,
    #[iden = "serial_number"]
    SerialNumber,
    Category,
    Kind,
    Status,
    Notes,
    #[iden = "updated_at"]
    UpdatedAt,
}
