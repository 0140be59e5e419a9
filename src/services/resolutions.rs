//! Technician Resolution Log
//!
//! A resolution appends a log entry, moves its report to `resolved` or
//! `in_progress` and copies the resulting status onto the part. The three
//! writes are independent: the first two are primary and their errors reach
//! the caller, the part sync is best effort and never files a new report.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use serde::Serialize;

use crate::error::Result;
use crate::models::prelude::*;
use crate::models::{PartStatus, ReportStatus};
use crate::services::{parts, reports};

#[derive(Debug, Clone)]
pub struct Resolution {
    pub report_id: i64,
    pub technician_name: String,
    pub action_taken: String,
    pub status_after: PartStatus,
}

/// Result of copying the resolved status onto the part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum PartSync {
    Updated,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionOutcome {
    pub log_id: String,
    pub report_status: ReportStatus,
    pub part_sync: PartSync,
}

/// Report lifecycle implied by the part's status after remediation
pub fn report_status_after(status_after: PartStatus) -> ReportStatus {
    if status_after == PartStatus::Operational {
        ReportStatus::Resolved
    } else {
        ReportStatus::InProgress
    }
}

pub async fn submit_resolution<C: ConnectionTrait>(
    db: &C,
    resolution: Resolution,
) -> Result<ResolutionOutcome> {
    let log = technician_log::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        report_id: Set(Some(resolution.report_id)),
        technician_name: Set(resolution.technician_name.clone()),
        action_taken: Set(resolution.action_taken.clone()),
        status_after: Set(resolution.status_after),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    let report_status = report_status_after(resolution.status_after);
    let touched = reports::set_lifecycle_status(db, resolution.report_id, report_status).await?;
    if touched == 0 {
        tracing::warn!(
            report_id = resolution.report_id,
            "Resolution logged for a report that does not exist"
        );
    }

    let part_sync = sync_part(db, &resolution).await;

    tracing::info!(
        report_id = resolution.report_id,
        log_id = %log.id,
        "Technician report submitted by {}",
        resolution.technician_name
    );

    Ok(ResolutionOutcome {
        log_id: log.id,
        report_status,
        part_sync,
    })
}

async fn sync_part<C: ConnectionTrait>(db: &C, resolution: &Resolution) -> PartSync {
    let report = match reports::get_report(db, resolution.report_id).await {
        Ok(Some(report)) => report,
        Ok(None) => {
            tracing::warn!(
                report_id = resolution.report_id,
                "Report not found, skipping part status sync"
            );
            return PartSync::Skipped("report not found".to_string());
        }
        Err(e) => {
            tracing::error!(report_id = resolution.report_id, "Part status sync failed: {}", e);
            return PartSync::Failed(e.to_string());
        }
    };

    let Some(computer_id) = report.computer_id else {
        tracing::warn!(
            report_id = report.id,
            "Report has no computer, skipping part status sync"
        );
        return PartSync::Skipped("report has no computer".to_string());
    };

    match parts::set_status(db, &computer_id, &report.part_name, resolution.status_after).await {
        Ok(0) => {
            tracing::warn!(
                computer_id = %computer_id,
                part = %report.part_name,
                "Part not found, skipping part status sync"
            );
            PartSync::Skipped("part not found".to_string())
        }
        Ok(_) => PartSync::Updated,
        Err(e) => {
            tracing::error!(
                computer_id = %computer_id,
                part = %report.part_name,
                "Part status sync failed: {}",
                e
            );
            PartSync::Failed(e.to_string())
        }
    }
}

/// Every log entry, newest first
pub async fn list_logs<C: ConnectionTrait>(db: &C) -> Result<Vec<technician_log::Model>> {
    Ok(TechnicianLog::find()
        .order_by_desc(technician_log::Column::CreatedAt)
        .all(db)
        .await?)
}
