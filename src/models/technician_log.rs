use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::computer_part::PartStatus;

/// Immutable record of a remediation action. `report_id` is a soft
/// reference kept for traceability only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "technician_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub report_id: Option<i64>,
    pub technician_name: String,
    pub action_taken: String,
    pub status_after: PartStatus,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
