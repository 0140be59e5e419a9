//! Status Transition Engine
//!
//! Applies a requested status (and optional rename / serial change) to a
//! part, diffs it against what is stored and files a report when the change
//! is observable. The read, diff and write happen in one transaction with the
//! part row locked, so two callers cannot both diff against the same stale
//! state and file duplicate reports.
//!
//! Report creation runs in a savepoint: if it fails the part update still
//! commits and the outcome says so.

use std::collections::BTreeMap;

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{PartKind, PartStatus};
use crate::services::parts::{self, Part, PartPatch, PatchField};
use crate::services::reports::{self, NewReport};

/// `submitted_by` for reports filed without an authenticated actor
pub const SYSTEM_ACTOR: &str = "System";

/// A status as it arrives over the wire: the enum label or a legacy
/// integer code. Integers outside `i64` land in `Number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestedStatus {
    Code(i64),
    Number(serde_json::Number),
    Label(String),
}

impl RequestedStatus {
    /// Codes 1-4 map to the four statuses and any other integer means
    /// operational. Numeric strings are read as codes.
    pub fn resolve(&self) -> Result<PartStatus> {
        match self {
            RequestedStatus::Code(code) => Ok(PartStatus::from_code(*code)),
            RequestedStatus::Number(number) if is_unmapped_integer(number) => {
                Ok(PartStatus::Operational)
            }
            RequestedStatus::Number(number) => Err(AppError::Validation(format!(
                "Unknown status '{}'",
                number
            ))),
            RequestedStatus::Label(label) => {
                let label = label.trim();
                if is_integer_literal(label) {
                    // Too large for i64 means an unmapped code
                    return Ok(label
                        .parse::<i64>()
                        .map(PartStatus::from_code)
                        .unwrap_or(PartStatus::Operational));
                }
                PartStatus::parse(label)
                    .ok_or_else(|| AppError::Validation(format!("Unknown status '{}'", label)))
            }
        }
    }
}

/// serde_json reads integers past the `i64` range as `u64` or, below it, as
/// an integral `f64`
fn is_unmapped_integer(number: &serde_json::Number) -> bool {
    number.is_u64()
        || number
            .as_f64()
            .is_some_and(|f| f.fract() == 0.0 && f < i64::MIN as f64)
}

fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl From<PartStatus> for RequestedStatus {
    fn from(status: PartStatus) -> Self {
        RequestedStatus::Label(status.as_str().to_string())
    }
}

/// One requested change to one part
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusChange {
    pub status: RequestedStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    /// Kind used only when the part has to be created
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl StatusChange {
    pub fn new(status: impl Into<RequestedStatus>) -> Self {
        Self {
            status: status.into(),
            notes: None,
            name: None,
            serial: None,
            kind: None,
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn kind(mut self, kind: PartKind) -> Self {
        self.kind = Some(
            match kind {
                PartKind::Standard => "standard",
                PartKind::Custom => "custom",
            }
            .to_string(),
        );
        self
    }

    fn resolved_kind(&self) -> Result<PartKind> {
        match self.kind.as_deref().map(str::trim) {
            None | Some("") => Ok(PartKind::Standard),
            Some(raw) => PartKind::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("Unknown part type '{}'", raw))),
        }
    }

    fn patch(&self, status: PartStatus) -> PartPatch {
        PartPatch {
            name: self.name.clone(),
            serial_number: self.serial.clone(),
            status: Some(status),
            notes: self.notes.clone(),
        }
    }
}

/// What happened to the report side of a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// Nothing observable changed
    NotRequired,
    Created(i64),
    /// The part was updated but filing the report failed
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusChangeOutcome {
    pub part: Part,
    pub created: bool,
    pub report: ReportOutcome,
}

/// Batch keyed by computer id, then selector
pub type StatusBatch = BTreeMap<String, BTreeMap<String, StatusChange>>;

#[derive(Debug, Clone, Serialize)]
pub struct BulkChangeOutcome {
    pub computer_id: String,
    pub selector: String,
    #[serde(flatten)]
    pub outcome: StatusChangeOutcome,
}

/// Apply a single status change
pub async fn apply_status_change<C>(
    db: &C,
    computer_id: &str,
    selector: &str,
    change: &StatusChange,
    actor: Option<&str>,
) -> Result<StatusChangeOutcome>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let outcome = apply_in(&txn, computer_id, selector, change, actor).await?;
    txn.commit().await?;
    Ok(outcome)
}

/// Apply every change of `batch` in one transaction. Any failing entry rolls
/// back the whole batch.
pub async fn apply_status_change_bulk<C>(
    db: &C,
    batch: &StatusBatch,
    actor: Option<&str>,
) -> Result<Vec<BulkChangeOutcome>>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let mut outcomes = Vec::new();

    for (computer_id, changes) in batch {
        for (selector, change) in changes {
            let outcome = apply_in(&txn, computer_id, selector, change, actor).await?;
            outcomes.push(BulkChangeOutcome {
                computer_id: computer_id.clone(),
                selector: selector.clone(),
                outcome,
            });
        }
    }

    txn.commit().await?;
    tracing::info!("Bulk status update applied {} changes", outcomes.len());
    Ok(outcomes)
}

async fn apply_in(
    txn: &DatabaseTransaction,
    computer_id: &str,
    selector: &str,
    change: &StatusChange,
    actor: Option<&str>,
) -> Result<StatusChangeOutcome> {
    let status = change.status.resolve()?;
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(AppError::Validation("Part selector is required".to_string()));
    }

    if Computer::find_by_id(computer_id).one(txn).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Computer {} not found",
            computer_id
        )));
    }

    let patch = change.patch(status);
    let existing = parts::find_part(txn, computer_id, selector, None, true).await?;

    let (part, created, description) = match existing {
        None => {
            let kind = change.resolved_kind()?;
            let part = parts::new_part(computer_id, selector, kind, &patch)
                .insert(txn)
                .await?;
            let description = status
                .needs_attention()
                .then(|| with_notes(new_part_description(&part), &change.notes));
            (part, true, description)
        }
        Some(current) => {
            let changed = patch.changed_fields(&current);
            let description = (!changed.is_empty())
                .then(|| with_notes(describe_changes(&current, &patch, &changed), &change.notes));
            let part = parts::update_part(txn, current, &patch).await?;
            (part, false, description)
        }
    };

    tracing::debug!(
        computer_id = %computer_id,
        part = %part.name,
        status = %part.status,
        created,
        "Applied status change"
    );

    let report = match description {
        None => ReportOutcome::NotRequired,
        Some(description) => {
            let new = NewReport::pending(
                computer_id,
                part.key(),
                description,
                actor.unwrap_or(SYSTEM_ACTOR),
            );
            file_report(txn, new).await
        }
    };

    Ok(StatusChangeOutcome {
        part,
        created,
        report,
    })
}

/// Insert the report inside a savepoint. A failure is logged and rolled back
/// to the savepoint; the surrounding part update is unaffected.
async fn file_report(txn: &DatabaseTransaction, new: NewReport) -> ReportOutcome {
    let computer_id = new.computer_id.clone();
    let result: Result<i64> = async {
        let savepoint = txn.begin().await?;
        match reports::create_report(&savepoint, new).await {
            Ok(id) => {
                savepoint.commit().await?;
                Ok(id)
            }
            Err(e) => {
                savepoint.rollback().await?;
                Err(e)
            }
        }
    }
    .await;

    match result {
        Ok(id) => ReportOutcome::Created(id),
        Err(e) => {
            tracing::error!(
                computer_id = ?computer_id,
                "Failed to auto-generate report: {}",
                e
            );
            ReportOutcome::Failed(e.to_string())
        }
    }
}

fn new_part_description(part: &Part) -> String {
    format!(
        "New part added. {} is {}",
        part.label(),
        part.status.describe()
    )
}

/// Human-readable description of `fields`, labelled with the part as it was
/// before the change.
fn describe_changes(current: &Part, patch: &PartPatch, fields: &[PatchField]) -> String {
    let label = current.label();
    fields
        .iter()
        .map(|field| match field {
            PatchField::Name => format!(
                "{} Name updated to {}",
                label,
                parts::supplied(&patch.name).unwrap_or_default()
            ),
            PatchField::SerialNumber => format!(
                "{} Serial updated to {}",
                label,
                parts::supplied(&patch.serial_number).unwrap_or_default()
            ),
            PatchField::Status => format!(
                "{} is {}",
                label,
                patch.status.unwrap_or(current.status).describe()
            ),
        })
        .collect::<Vec<_>>()
        .join(". ")
}

fn with_notes(description: String, notes: &Option<String>) -> String {
    match parts::supplied(notes) {
        Some(notes) => format!("{}. {}", description, notes),
        None => description,
    }
}
