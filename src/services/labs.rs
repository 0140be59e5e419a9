//! Laboratory management

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::services::computers::delete_computer_in;

/// A laboratory with the number of computers it holds
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct LabSummary {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub pc_count: i64,
}

fn clean_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(
            "Laboratory name is required".to_string(),
        ));
    }
    Ok(name)
}

async fn name_in_use<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except_id: Option<i64>,
) -> Result<bool> {
    let mut query = Laboratory::find().filter(laboratory::Column::Name.eq(name));
    if let Some(id) = except_id {
        query = query.filter(laboratory::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

pub async fn create_lab<C: ConnectionTrait>(
    db: &C,
    name: &str,
    location: Option<String>,
) -> Result<laboratory::Model> {
    let name = clean_name(name)?;
    if name_in_use(db, name, None).await? {
        return Err(AppError::Conflict(
            "Laboratory with this name already exists".to_string(),
        ));
    }

    let lab = laboratory::ActiveModel {
        name: Set(name.to_string()),
        location: Set(location),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Laboratory added: {} (ID: {})", lab.name, lab.id);
    Ok(lab)
}

pub async fn list_labs<C: ConnectionTrait>(db: &C) -> Result<Vec<LabSummary>> {
    Ok(Laboratory::find()
        .select_only()
        .column(laboratory::Column::Id)
        .column(laboratory::Column::Name)
        .column(laboratory::Column::Location)
        .column_as(
            Expr::col((Computer, computer::Column::Id)).count(),
            "pc_count",
        )
        .left_join(Computer)
        .group_by(laboratory::Column::Id)
        .group_by(laboratory::Column::Name)
        .group_by(laboratory::Column::Location)
        .order_by_asc(laboratory::Column::Name)
        .into_model::<LabSummary>()
        .all(db)
        .await?)
}

pub async fn update_lab<C: ConnectionTrait>(
    db: &C,
    id: i64,
    name: &str,
    location: Option<String>,
) -> Result<laboratory::Model> {
    let lab = Laboratory::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Laboratory {} not found", id)))?;

    let name = clean_name(name)?;
    if name_in_use(db, name, Some(id)).await? {
        return Err(AppError::Conflict(
            "Laboratory with this name already exists".to_string(),
        ));
    }

    let mut active: laboratory::ActiveModel = lab.into();
    active.name = Set(name.to_string());
    active.location = Set(location);
    let lab = active.update(db).await?;

    tracing::info!("Laboratory updated: {} -> {}", id, lab.name);
    Ok(lab)
}

/// Delete a lab together with its computers, their parts and the lab's
/// accessories. Reports of those computers are kept.
pub async fn delete_lab<C>(db: &C, id: i64) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let lab = Laboratory::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Laboratory not found".to_string()))?;

    let computers = Computer::find()
        .filter(computer::Column::LabId.eq(id))
        .all(&txn)
        .await?;
    for computer in &computers {
        delete_computer_in(&txn, &computer.id).await?;
    }
    Accessory::delete_many()
        .filter(accessory::Column::LabId.eq(id))
        .exec(&txn)
        .await?;

    Laboratory::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        "Laboratory deleted: {} ({} computers removed)",
        lab.name,
        computers.len()
    );
    Ok(())
}
