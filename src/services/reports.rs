//! Report Ledger

use std::str::FromStr;

use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt, TryStreamExt};
use sea_orm::{
    sea_query::{Expr, JoinType},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, StreamTrait,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::ReportStatus;

/// Placeholder used when a report's computer or lab has been deleted
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct NewReport {
    pub computer_id: Option<String>,
    pub part_name: String,
    pub issue_description: String,
    pub status: ReportStatus,
    pub submitted_by: String,
}

impl NewReport {
    pub fn pending(
        computer_id: impl Into<String>,
        part_name: impl Into<String>,
        issue_description: impl Into<String>,
        submitted_by: impl Into<String>,
    ) -> Self {
        Self {
            computer_id: Some(computer_id.into()),
            part_name: part_name.into(),
            issue_description: issue_description.into(),
            status: ReportStatus::Pending,
            submitted_by: submitted_by.into(),
        }
    }
}

/// Which reports a delete applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTarget {
    All,
    Id(i64),
}

impl FromStr for ReportTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "ALL" {
            return Ok(ReportTarget::All);
        }
        s.parse::<i64>()
            .map(ReportTarget::Id)
            .map_err(|_| AppError::Validation(format!("Invalid report id '{}'", s)))
    }
}

/// A report joined with the display names of its computer and lab
#[derive(Debug, Clone, Serialize)]
pub struct ReportWithContext {
    pub id: i64,
    pub computer_id: Option<String>,
    pub part_name: String,
    pub issue_description: String,
    pub status: ReportStatus,
    pub submitted_by: String,
    pub created_at: DateTime<Utc>,
    pub pc_name: String,
    pub lab_name: String,
}

#[derive(Debug, FromQueryResult)]
struct ReportContextRow {
    id: i64,
    computer_id: Option<String>,
    part_name: String,
    issue_description: String,
    status: ReportStatus,
    submitted_by: String,
    created_at: DateTime<Utc>,
    pc_name: Option<String>,
    lab_name: Option<String>,
}

impl From<ReportContextRow> for ReportWithContext {
    fn from(row: ReportContextRow) -> Self {
        Self {
            id: row.id,
            computer_id: row.computer_id,
            part_name: row.part_name,
            issue_description: row.issue_description,
            status: row.status,
            submitted_by: row.submitted_by,
            created_at: row.created_at,
            pc_name: row.pc_name.unwrap_or_else(|| UNKNOWN.to_string()),
            lab_name: row.lab_name.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

pub async fn create_report<C: ConnectionTrait>(db: &C, new: NewReport) -> Result<i64> {
    let model = report::ActiveModel {
        computer_id: Set(new.computer_id),
        part_name: Set(new.part_name),
        issue_description: Set(new.issue_description),
        status: Set(new.status),
        submitted_by: Set(new.submitted_by),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        report_id = model.id,
        computer_id = ?model.computer_id,
        part = %model.part_name,
        "Report created by {}",
        model.submitted_by
    );
    Ok(model.id)
}

pub async fn get_report<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<report::Model>> {
    Ok(Report::find_by_id(id).one(db).await?)
}

/// Delete one report or, with [`ReportTarget::All`], every report
pub async fn delete_report<C: ConnectionTrait>(db: &C, target: ReportTarget) -> Result<u64> {
    match target {
        ReportTarget::All => {
            let removed = Report::delete_many().exec(db).await?.rows_affected;
            tracing::warn!("All reports deleted ({} rows)", removed);
            Ok(removed)
        }
        ReportTarget::Id(id) => {
            let removed = Report::delete_by_id(id).exec(db).await?.rows_affected;
            if removed == 0 {
                return Err(AppError::NotFound(format!("Report {} not found", id)));
            }
            tracing::info!("Report {} deleted", id);
            Ok(removed)
        }
    }
}

/// Overwrite a report's lifecycle status. No transition rules are enforced
/// here; the resolution log is the only caller.
pub async fn set_lifecycle_status<C: ConnectionTrait>(
    db: &C,
    report_id: i64,
    status: ReportStatus,
) -> Result<u64> {
    let result = Report::update_many()
        .col_expr(report::Column::Status, Expr::value(status))
        .filter(report::Column::Id.eq(report_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Reports with computer and lab names, newest first, streamed from the
/// database row by row.
pub async fn stream_reports_with_context<'a, C>(
    db: &'a C,
) -> Result<impl Stream<Item = Result<ReportWithContext>> + Send + 'a>
where
    C: ConnectionTrait + StreamTrait + Send,
{
    let rows = Report::find()
        .select_only()
        .column(report::Column::Id)
        .column(report::Column::ComputerId)
        .column(report::Column::PartName)
        .column(report::Column::IssueDescription)
        .column(report::Column::Status)
        .column(report::Column::SubmittedBy)
        .column(report::Column::CreatedAt)
        .column_as(computer::Column::Name, "pc_name")
        .column_as(laboratory::Column::Name, "lab_name")
        .join(JoinType::LeftJoin, report::Relation::Computer.def())
        .join(JoinType::LeftJoin, computer::Relation::Laboratory.def())
        .order_by_desc(report::Column::CreatedAt)
        .order_by_desc(report::Column::Id)
        .into_model::<ReportContextRow>()
        .stream(db)
        .await?;

    Ok(rows.map(|row| row.map(ReportWithContext::from).map_err(AppError::from)))
}

pub async fn list_reports_with_context<C>(db: &C) -> Result<Vec<ReportWithContext>>
where
    C: ConnectionTrait + StreamTrait + Send,
{
    stream_reports_with_context(db).await?.try_collect().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_target_parsing() {
        assert_eq!("ALL".parse::<ReportTarget>().unwrap(), ReportTarget::All);
        assert_eq!("42".parse::<ReportTarget>().unwrap(), ReportTarget::Id(42));
        assert!(matches!(
            "all".parse::<ReportTarget>(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            "abc".parse::<ReportTarget>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_names_become_unknown() {
        let row = ReportContextRow {
            id: 1,
            computer_id: None,
            part_name: "monitor".to_string(),
            issue_description: "Monitor is damaged".to_string(),
            status: ReportStatus::Pending,
            submitted_by: "System".to_string(),
            created_at: Utc::now(),
            pc_name: None,
            lab_name: None,
        };
        let report = ReportWithContext::from(row);
        assert_eq!(report.pc_name, UNKNOWN);
        assert_eq!(report.lab_name, UNKNOWN);
    }
}
