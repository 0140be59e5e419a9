use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Loose lab equipment counted by quantity (cables, adapters, headsets).
/// Accessories have no status and never produce reports.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accessories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub quantity: i32,
    pub lab_id: i64,
    pub notes: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::laboratory::Entity",
        from = "Column::LabId",
        to = "super::laboratory::Column::Id",
        on_delete = "Cascade"
    )]
    Laboratory,
}

impl Related<super::laboratory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Laboratory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
