//! Laboratory accessories
//!
//! Counted stock kept per lab. Independent of the part registry.

use chrono::Utc;
use sea_orm::{
    sea_query::JoinType, ActiveModelTrait, ConnectionTrait, EntityTrait, FromQueryResult,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::prelude::*;

/// An accessory with the name of the lab that holds it
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct AccessoryWithLab {
    pub id: i64,
    pub name: String,
    pub quantity: i32,
    pub lab_id: i64,
    pub lab_name: String,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct NewAccessory {
    pub name: String,
    pub quantity: i32,
    pub lab_id: i64,
    pub notes: String,
}

/// Replacement values for an accessory. The lab cannot change.
#[derive(Debug, Clone)]
pub struct AccessoryEdit {
    pub name: String,
    pub quantity: i32,
    pub notes: Option<String>,
}

fn check_fields(name: &str, quantity: i32) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Accessory name is required".to_string()));
    }
    if quantity < 0 {
        return Err(AppError::Validation(
            "Quantity cannot be negative".to_string(),
        ));
    }
    Ok(name.to_string())
}

pub async fn list_accessories<C: ConnectionTrait>(db: &C) -> Result<Vec<AccessoryWithLab>> {
    Ok(Accessory::find()
        .select_only()
        .column(accessory::Column::Id)
        .column(accessory::Column::Name)
        .column(accessory::Column::Quantity)
        .column(accessory::Column::LabId)
        .column(accessory::Column::Notes)
        .column_as(laboratory::Column::Name, "lab_name")
        .join(JoinType::InnerJoin, accessory::Relation::Laboratory.def())
        .order_by_asc(laboratory::Column::Name)
        .order_by_asc(accessory::Column::Name)
        .into_model::<AccessoryWithLab>()
        .all(db)
        .await?)
}

pub async fn create_accessory<C: ConnectionTrait>(
    db: &C,
    new: NewAccessory,
) -> Result<accessory::Model> {
    let name = check_fields(&new.name, new.quantity)?;
    let lab = Laboratory::find_by_id(new.lab_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Laboratory {} not found", new.lab_id)))?;

    let accessory = accessory::ActiveModel {
        name: Set(name),
        quantity: Set(new.quantity),
        lab_id: Set(lab.id),
        notes: Set(new.notes.trim().to_string()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        "Accessory added: {} (Qty: {}) to lab {}",
        accessory.name,
        accessory.quantity,
        lab.name
    );
    Ok(accessory)
}

pub async fn update_accessory<C: ConnectionTrait>(
    db: &C,
    id: i64,
    edit: AccessoryEdit,
) -> Result<accessory::Model> {
    let name = check_fields(&edit.name, edit.quantity)?;
    let current = Accessory::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Accessory {} not found", id)))?;

    let mut active: accessory::ActiveModel = current.into();
    active.name = Set(name);
    active.quantity = Set(edit.quantity);
    if let Some(notes) = edit.notes {
        active.notes = Set(notes.trim().to_string());
    }
    active.updated_at = Set(Utc::now());

    let accessory = active.update(db).await?;
    tracing::info!("Accessory updated: {}", id);
    Ok(accessory)
}

pub async fn delete_accessory<C: ConnectionTrait>(db: &C, id: i64) -> Result<()> {
    let removed = Accessory::delete_by_id(id).exec(db).await?.rows_affected;
    if removed == 0 {
        return Err(AppError::NotFound(format!("Accessory {} not found", id)));
    }
    tracing::info!("Accessory deleted: {}", id);
    Ok(())
}
