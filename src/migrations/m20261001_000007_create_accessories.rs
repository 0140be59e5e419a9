//! Migration: Create accessories table

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
                    .table(Accessories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accessories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accessories::Name).string().not_null())
                    .col(
                        ColumnDef::new(Accessories::Quantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accessories::LabId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Accessories::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Accessories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Accessories::Table, Accessories::LabId)
                            .to(Laboratories::Table, Laboratories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accessories::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "accessories"]
enum Accessories {
    Table,
    Id,
    Name,
    Quantity,
    #[iden = "lab_id"]
    LabId,
    Notes,
    #[iden = "updated_at"]
    UpdatedAt,
}
