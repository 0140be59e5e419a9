use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category stored on every custom part
pub const CUSTOM_CATEGORY: &str = "other";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "computer_parts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub computer_id: String,
    pub name: String,
    pub serial_number: Option<String>,
    pub category: String,
    pub kind: PartKind,
    pub status: PartStatus,
    pub notes: String,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Human name used in change descriptions: "Monitor" for the standard
    /// `monitor` slot, the part's own name for custom parts.
    pub fn label(&self) -> String {
        match self.kind {
            PartKind::Standard => capitalize(&self.category),
            PartKind::Custom => self.name.clone(),
        }
    }

    /// Stable selector for this part: the slot category for standard parts,
    /// the name for custom ones. Reports store this as their `part_name`.
    pub fn key(&self) -> &str {
        match self.kind {
            PartKind::Standard => &self.category,
            PartKind::Custom => &self.name,
        }
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    #[sea_orm(string_value = "standard")]
    Standard,
    #[sea_orm(string_value = "custom")]
    Custom,
}

impl PartKind {
    /// Parse a kind coming from a request. The original frontend sends
    /// `"other"` for custom parts, so that is accepted as well.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Some(PartKind::Standard),
            "custom" | "other" => Some(PartKind::Custom),
            _ => None,
        }
    }
}

/// Operational condition of a part
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PartStatus {
    #[sea_orm(string_value = "operational")]
    Operational,
    #[sea_orm(string_value = "not_operational")]
    NotOperational,
    #[sea_orm(string_value = "damaged")]
    Damaged,
    #[sea_orm(string_value = "missing")]
    Missing,
}

impl PartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartStatus::Operational => "operational",
            PartStatus::NotOperational => "not_operational",
            PartStatus::Damaged => "damaged",
            PartStatus::Missing => "missing",
        }
    }

    /// Wording used inside report descriptions
    pub fn describe(&self) -> &'static str {
        match self {
            PartStatus::Operational => "operational",
            PartStatus::NotOperational => "not operational",
            PartStatus::Damaged => "damaged",
            PartStatus::Missing => "missing",
        }
    }

    /// Legacy integer code. Unmapped codes fall back to `Operational`.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => PartStatus::NotOperational,
            3 => PartStatus::Damaged,
            4 => PartStatus::Missing,
            _ => PartStatus::Operational,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            PartStatus::Operational => 1,
            PartStatus::NotOperational => 2,
            PartStatus::Damaged => 3,
            PartStatus::Missing => 4,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "operational" => Some(PartStatus::Operational),
            "not_operational" | "not operational" => Some(PartStatus::NotOperational),
            "damaged" => Some(PartStatus::Damaged),
            "missing" => Some(PartStatus::Missing),
            _ => None,
        }
    }

    /// Statuses that flag a part as needing attention
    pub fn needs_attention(&self) -> bool {
        !matches!(self, PartStatus::Operational)
    }
}

impl std::fmt::Display for PartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::computer::Entity",
        from = "Column::ComputerId",
        to = "super::computer::Column::Id",
        on_delete = "Cascade"
    )]
    Computer,
}

impl Related<super::computer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Computer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
