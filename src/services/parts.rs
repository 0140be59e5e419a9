//! Part Registry
//!
//! Owns the `computer_parts` table. A part is addressed by a *selector*
//! which is tried as an exact name first and then as the category of a
//! standard part, so one endpoint can reach both kinds. Nothing here creates
//! reports; that belongs to the transition engine.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::error::Result;
use crate::models::computer_part::{self, CUSTOM_CATEGORY};
use crate::models::prelude::*;
use crate::models::{PartKind, PartStatus};
use crate::services::computers::require_computer;
use crate::services::specs::{CustomPartSpec, PartSpec};

pub type Part = computer_part::Model;

/// Partial update of a part. Absent fields are left untouched, and blank
/// strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartPatch {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<PartStatus>,
    pub notes: Option<String>,
}

/// Fields a patch can observably change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchField {
    Name,
    SerialNumber,
    Status,
}

impl PatchField {
    /// Every tracked field, in the order changes are described
    pub const TRACKED: [PatchField; 3] = [
        PatchField::Name,
        PatchField::SerialNumber,
        PatchField::Status,
    ];
}

impl PartPatch {
    pub fn with_status(status: PartStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Tracked fields this patch would change on `part`
    pub fn changed_fields(&self, part: &Part) -> Vec<PatchField> {
        PatchField::TRACKED
            .into_iter()
            .filter(|field| self.changes(*field, part))
            .collect()
    }

    fn changes(&self, field: PatchField, part: &Part) -> bool {
        match field {
            PatchField::Name => supplied(&self.name).is_some_and(|name| name != part.name),
            PatchField::SerialNumber => supplied(&self.serial_number)
                .is_some_and(|serial| Some(serial) != part.serial_number.as_deref()),
            PatchField::Status => self.status.is_some_and(|status| status != part.status),
        }
    }

    fn apply(&self, active: &mut computer_part::ActiveModel) {
        for field in PatchField::TRACKED {
            match field {
                PatchField::Name => {
                    if let Some(name) = supplied(&self.name) {
                        active.name = Set(name.to_string());
                    }
                }
                PatchField::SerialNumber => {
                    if let Some(serial) = supplied(&self.serial_number) {
                        active.serial_number = Set(Some(serial.to_string()));
                    }
                }
                PatchField::Status => {
                    if let Some(status) = self.status {
                        active.status = Set(status);
                    }
                }
            }
        }
        if let Some(notes) = &self.notes {
            active.notes = Set(notes.clone());
        }
        active.updated_at = Set(Utc::now());
    }
}

pub(crate) fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Look a part up by selector.
///
/// With `kind` set, only that kind is considered: custom parts by name,
/// standard parts by category. `lock` takes a row lock for the rest of the
/// surrounding transaction (ignored by SQLite, which serializes writers).
pub(crate) async fn find_part<C: ConnectionTrait>(
    db: &C,
    computer_id: &str,
    selector: &str,
    kind: Option<PartKind>,
    lock: bool,
) -> Result<Option<Part>> {
    if kind != Some(PartKind::Standard) {
        let mut query = ComputerPart::find()
            .filter(computer_part::Column::ComputerId.eq(computer_id))
            .filter(computer_part::Column::Name.eq(selector))
            .order_by_asc(computer_part::Column::Id);
        if let Some(kind) = kind {
            query = query.filter(computer_part::Column::Kind.eq(kind));
        }
        if lock {
            query = query.lock_exclusive();
        }
        if let Some(part) = query.one(db).await? {
            return Ok(Some(part));
        }
    }

    if kind != Some(PartKind::Custom) {
        let mut query = ComputerPart::find()
            .filter(computer_part::Column::ComputerId.eq(computer_id))
            .filter(computer_part::Column::Kind.eq(PartKind::Standard))
            .filter(computer_part::Column::Category.eq(selector));
        if lock {
            query = query.lock_exclusive();
        }
        return Ok(query.one(db).await?);
    }

    Ok(None)
}

/// Build a fresh part for `selector`. The selector becomes the category of a
/// standard part and the fallback name of either kind.
pub(crate) fn new_part(
    computer_id: &str,
    selector: &str,
    kind: PartKind,
    patch: &PartPatch,
) -> computer_part::ActiveModel {
    let category = match kind {
        PartKind::Standard => selector.to_string(),
        PartKind::Custom => CUSTOM_CATEGORY.to_string(),
    };

    computer_part::ActiveModel {
        computer_id: Set(computer_id.to_string()),
        name: Set(supplied(&patch.name).unwrap_or(selector).to_string()),
        serial_number: Set(supplied(&patch.serial_number).map(str::to_string)),
        category: Set(category),
        kind: Set(kind),
        status: Set(patch.status.unwrap_or(PartStatus::Operational)),
        notes: Set(patch.notes.clone().unwrap_or_default()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
}

/// Apply `patch` to an already loaded part
pub(crate) async fn update_part<C: ConnectionTrait>(
    db: &C,
    part: Part,
    patch: &PartPatch,
) -> Result<Part> {
    let mut active: computer_part::ActiveModel = part.into();
    patch.apply(&mut active);
    Ok(active.update(db).await?)
}

pub async fn get_part<C: ConnectionTrait>(
    db: &C,
    computer_id: &str,
    selector: &str,
) -> Result<Option<Part>> {
    find_part(db, computer_id, selector, None, false).await
}

/// Create the part if it does not exist (operational unless the patch says
/// otherwise), else apply only the fields present in `patch`.
pub async fn upsert_part<C: ConnectionTrait>(
    db: &C,
    computer_id: &str,
    selector: &str,
    kind: Option<PartKind>,
    patch: PartPatch,
) -> Result<Part> {
    match find_part(db, computer_id, selector, kind, false).await? {
        Some(part) => update_part(db, part, &patch).await,
        None => {
            let kind = kind.unwrap_or(PartKind::Standard);
            let part = new_part(computer_id, selector, kind, &patch)
                .insert(db)
                .await?;
            tracing::debug!(
                computer_id = %computer_id,
                part = %part.name,
                kind = ?part.kind,
                "Created part"
            );
            Ok(part)
        }
    }
}

/// Overwrite a part's status without any diffing. Returns the number of
/// parts touched (0 when the selector matches nothing).
pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    computer_id: &str,
    selector: &str,
    status: PartStatus,
) -> Result<u64> {
    let Some(part) = find_part(db, computer_id, selector, None, false).await? else {
        return Ok(0);
    };

    update_part(db, part, &PartPatch::with_status(status)).await?;
    Ok(1)
}

/// Swap the full set of custom parts of a computer. Standard parts are not
/// touched.
pub async fn replace_custom_parts<C>(
    db: &C,
    computer_id: &str,
    parts: &[CustomPartSpec],
) -> Result<Vec<Part>>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let removed = ComputerPart::delete_many()
        .filter(computer_part::Column::ComputerId.eq(computer_id))
        .filter(computer_part::Column::Kind.eq(PartKind::Custom))
        .exec(&txn)
        .await?
        .rows_affected;

    let mut created = Vec::with_capacity(parts.len());
    for spec in parts {
        created.push(insert_custom(&txn, computer_id, spec).await?);
    }

    txn.commit().await?;

    tracing::info!(
        computer_id = %computer_id,
        removed,
        added = created.len(),
        "Replaced custom parts"
    );
    Ok(created)
}

/// Create the initial parts of a freshly registered computer
pub async fn initialize_from_spec<C>(
    db: &C,
    computer_id: &str,
    specs: &[PartSpec],
    other_parts: &[CustomPartSpec],
) -> Result<Vec<Part>>
where
    C: ConnectionTrait + TransactionTrait,
{
    require_computer(db, computer_id).await?;

    let txn = db.begin().await?;
    let mut created = Vec::with_capacity(specs.len() + other_parts.len());

    for spec in specs {
        let patch = PartPatch {
            name: Some(spec.name.clone()),
            serial_number: spec.serial.clone(),
            ..Default::default()
        };
        let part = new_part(computer_id, &spec.category, PartKind::Standard, &patch)
            .insert(&txn)
            .await?;
        created.push(part);
    }

    for spec in other_parts {
        created.push(insert_custom(&txn, computer_id, spec).await?);
    }

    txn.commit().await?;
    Ok(created)
}

async fn insert_custom<C: ConnectionTrait>(
    db: &C,
    computer_id: &str,
    spec: &CustomPartSpec,
) -> Result<Part> {
    let patch = PartPatch {
        name: Some(spec.name.clone()),
        serial_number: spec.serial.clone(),
        ..Default::default()
    };
    Ok(new_part(computer_id, &spec.name, PartKind::Custom, &patch)
        .insert(db)
        .await?)
}

pub async fn list_parts<C: ConnectionTrait>(
    db: &C,
    computer_id: Option<&str>,
    kind: Option<PartKind>,
) -> Result<Vec<Part>> {
    let mut query = ComputerPart::find();
    if let Some(computer_id) = computer_id {
        query = query.filter(computer_part::Column::ComputerId.eq(computer_id));
    }
    if let Some(kind) = kind {
        query = query.filter(computer_part::Column::Kind.eq(kind));
    }

    Ok(query
        .order_by_asc(computer_part::Column::ComputerId)
        .order_by_asc(computer_part::Column::Id)
        .all(db)
        .await?)
}
