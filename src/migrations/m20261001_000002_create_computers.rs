//! Migration: Create computers table

use sea_orm_migration::prelude::*;

use super::m20261001_000001_create_laboratories::Laboratories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Computers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Computers::Id)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Computers::Name).string().not_null())
                    .col(ColumnDef::new(Computers::LabId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Computers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Computers::Table, Computers::LabId)
                            .to(Laboratories::Table, Laboratories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_computers_lab_name")
                    .table(Computers::Table)
                    .col(Computers::LabId)
                    .col(Computers::Name)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Computers::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "computers"]
pub enum Computers {
    Table,
    Id,
    Name,
    #[iden = "lab_id"]
    LabId,
    #[iden = "created_at"]
    CreatedAt,
}
