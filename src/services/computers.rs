//! Computer registration, listing, editing and removal

use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::PartKind;
use crate::services::parts::{self, Part, PartPatch};
use crate::services::specs::{CustomPartSpec, PartSpec};

const ID_ATTEMPTS: usize = 10;

/// A computer to register, with its specs already normalized
#[derive(Debug, Clone)]
pub struct NewComputer {
    pub name: String,
    pub lab_id: i64,
    pub specs: Vec<PartSpec>,
    pub other_parts: Vec<CustomPartSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredComputer {
    pub id: String,
    pub name: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertedComputer {
    pub pc_name: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkRegistration {
    pub inserted: Vec<InsertedComputer>,
    pub skipped_duplicates: Vec<String>,
}

/// Edit of an existing computer. `other_parts` of `None` leaves custom parts alone.
#[derive(Debug, Clone, Default)]
pub struct ComputerEdit {
    pub name: Option<String>,
    pub specs: Vec<PartSpec>,
    pub other_parts: Option<Vec<CustomPartSpec>>,
}

/// Listing shape: the computer with specs rebuilt from its parts
#[derive(Debug, Clone, Serialize)]
pub struct ComputerSummary {
    pub id: String,
    pub name: String,
    pub pc_name: String,
    pub lab_id: i64,
    pub lab_name: Option<String>,
    pub specs: Value,
    pub other_parts: Value,
}

pub(crate) async fn require_computer<C: ConnectionTrait>(
    db: &C,
    computer_id: &str,
) -> Result<computer::Model> {
    Computer::find_by_id(computer_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Computer {} not found", computer_id)))
}

/// Random 8-digit id, as the frontend expects
pub fn generate_computer_id() -> String {
    rand::rng().random_range(10_000_000..=99_999_999u32).to_string()
}

async fn unused_computer_id<C: ConnectionTrait>(db: &C) -> Result<String> {
    for _ in 0..ID_ATTEMPTS {
        let id = generate_computer_id();
        if Computer::find_by_id(id.as_str()).one(db).await?.is_none() {
            return Ok(id);
        }
    }
    Err(AppError::Internal(
        "Could not allocate a computer id".to_string(),
    ))
}

async fn require_lab<C: ConnectionTrait>(db: &C, lab_id: i64) -> Result<laboratory::Model> {
    Laboratory::find_by_id(lab_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Laboratory {} not found", lab_id)))
}

async fn name_taken<C: ConnectionTrait>(db: &C, lab_id: i64, name: &str) -> Result<bool> {
    Ok(Computer::find()
        .filter(computer::Column::LabId.eq(lab_id))
        .filter(computer::Column::Name.eq(name))
        .one(db)
        .await?
        .is_some())
}

async fn insert_computer<C>(db: &C, new: &NewComputer) -> Result<RegisteredComputer>
where
    C: ConnectionTrait + TransactionTrait,
{
    let id = unused_computer_id(db).await?;
    computer::ActiveModel {
        id: Set(id.clone()),
        name: Set(new.name.clone()),
        lab_id: Set(new.lab_id),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    let parts = parts::initialize_from_spec(db, &id, &new.specs, &new.other_parts).await?;

    tracing::info!(
        "Computer added: {} (ID: {}) in lab {}",
        new.name,
        id,
        new.lab_id
    );
    Ok(RegisteredComputer {
        id,
        name: new.name.clone(),
        parts,
    })
}

/// Register one computer and create its initial parts
pub async fn register_computer<C>(db: &C, new: NewComputer) -> Result<RegisteredComputer>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    require_lab(&txn, new.lab_id).await?;
    if name_taken(&txn, new.lab_id, &new.name).await? {
        return Err(AppError::Conflict(format!(
            "Computer '{}' already exists in this laboratory",
            new.name
        )));
    }

    let registered = insert_computer(&txn, &new).await?;
    txn.commit().await?;
    Ok(registered)
}

/// Register many computers, skipping names that already exist in their lab
pub async fn register_many<C>(db: &C, batch: Vec<NewComputer>) -> Result<BulkRegistration>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let mut result = BulkRegistration::default();

    for new in batch {
        require_lab(&txn, new.lab_id).await?;
        if name_taken(&txn, new.lab_id, &new.name).await? {
            result.skipped_duplicates.push(new.name);
            continue;
        }
        let registered = insert_computer(&txn, &new).await?;
        result.inserted.push(InsertedComputer {
            pc_name: registered.name,
            id: registered.id,
        });
    }

    txn.commit().await?;
    tracing::info!(
        "Bulk computers added: {} inserted, {} skipped",
        result.inserted.len(),
        result.skipped_duplicates.len()
    );
    Ok(result)
}

pub async fn list_computers<C: ConnectionTrait>(db: &C) -> Result<Vec<ComputerSummary>> {
    let computers = Computer::find()
        .find_also_related(Laboratory)
        .order_by_asc(computer::Column::LabId)
        .order_by_asc(computer::Column::Name)
        .all(db)
        .await?;

    let mut parts_by_computer: HashMap<String, Vec<Part>> = HashMap::new();
    for part in parts::list_parts(db, None, None).await? {
        parts_by_computer
            .entry(part.computer_id.clone())
            .or_default()
            .push(part);
    }

    Ok(computers
        .into_iter()
        .map(|(computer, lab)| {
            let parts = parts_by_computer.remove(&computer.id).unwrap_or_default();
            let (specs, other_parts) = specs_from_parts(&parts);
            ComputerSummary {
                pc_name: computer.name.clone(),
                id: computer.id,
                name: computer.name,
                lab_id: computer.lab_id,
                lab_name: lab.map(|l| l.name),
                specs,
                other_parts,
            }
        })
        .collect())
}

/// Rebuild the `specs` object and `other_parts` list from stored parts
fn specs_from_parts(parts: &[Part]) -> (Value, Value) {
    let mut specs = Map::new();
    let mut other = Vec::new();

    for part in parts {
        let entry = json!({ "name": part.name, "serial": part.serial_number });
        match part.kind {
            PartKind::Standard => {
                specs.insert(part.category.clone(), entry);
            }
            PartKind::Custom => other.push(entry),
        }
    }

    (Value::Object(specs), Value::Array(other))
}

/// Rename a computer, upsert its standard parts and replace its custom parts
pub async fn update_computer<C>(db: &C, computer_id: &str, edit: ComputerEdit) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let current = require_computer(&txn, computer_id).await?;

    if let Some(name) = parts::supplied(&edit.name) {
        if name != current.name {
            if name_taken(&txn, current.lab_id, name).await? {
                return Err(AppError::Conflict(format!(
                    "Computer '{}' already exists in this laboratory",
                    name
                )));
            }
            let mut active: computer::ActiveModel = current.into();
            active.name = Set(name.to_string());
            active.update(&txn).await?;
        }
    }

    for spec in &edit.specs {
        let patch = PartPatch {
            name: Some(spec.name.clone()),
            serial_number: spec.serial.clone(),
            ..Default::default()
        };
        parts::upsert_part(
            &txn,
            computer_id,
            &spec.category,
            Some(PartKind::Standard),
            patch,
        )
        .await?;
    }

    if let Some(other_parts) = &edit.other_parts {
        parts::replace_custom_parts(&txn, computer_id, other_parts).await?;
    }

    txn.commit().await?;
    tracing::info!("Computer data updated: {}", computer_id);
    Ok(())
}

/// Delete a computer inside an open transaction. Parts go with it; reports
/// stay and lose their computer link.
pub(crate) async fn delete_computer_in<C: ConnectionTrait>(db: &C, computer_id: &str) -> Result<()> {
    Report::update_many()
        .col_expr(report::Column::ComputerId, Expr::value(Option::<String>::None))
        .filter(report::Column::ComputerId.eq(computer_id))
        .exec(db)
        .await?;

    ComputerPart::delete_many()
        .filter(computer_part::Column::ComputerId.eq(computer_id))
        .exec(db)
        .await?;

    Computer::delete_by_id(computer_id).exec(db).await?;
    Ok(())
}

pub async fn delete_computer<C>(db: &C, computer_id: &str) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    require_computer(&txn, computer_id).await?;
    delete_computer_in(&txn, computer_id).await?;
    txn.commit().await?;

    tracing::info!("Computer deleted: {}", computer_id);
    Ok(())
}
