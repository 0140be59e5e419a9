use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::endpoints::{optional_string_or_int, Payload};
use crate::error::Result;
use crate::middleware::{Authenticated, Authorized, ReportManagers, ReportReaders};
use crate::models::ReportStatus;
use crate::services::computers::require_computer;
use crate::services::reports::{self, NewReport, ReportTarget, ReportWithContext};
use crate::services::transitions::SYSTEM_ACTOR;
use crate::state::AppState;

/// Create report ledger routes
pub fn reports_routes(state: AppState) -> Router {
    Router::new()
        .route("/add_report", post(add_report))
        .route("/delete_report/{target}", delete(delete_report))
        .route(
            "/get_admin_computer_reports",
            get(get_admin_computer_reports),
        )
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct AddReportRequest {
    #[serde(default, deserialize_with = "optional_string_or_int")]
    pub computer_id: Option<String>,
    #[serde(alias = "item")]
    #[validate(length(min = 1, message = "Part name is required"))]
    pub part_name: String,
    #[serde(alias = "notes")]
    #[validate(length(min = 1, message = "Issue description is required"))]
    pub issue_description: String,
    #[serde(default)]
    pub status: Option<ReportStatus>,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn add_report(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    payload: std::result::Result<Json<Payload<AddReportRequest>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();
    request.validate()?;

    if let Some(computer_id) = &request.computer_id {
        require_computer(&state.db, computer_id).await?;
    }

    let id = reports::create_report(
        &state.db,
        NewReport {
            computer_id: request.computer_id,
            part_name: request.part_name.trim().to_string(),
            issue_description: request.issue_description,
            status: request.status.unwrap_or(ReportStatus::Pending),
            submitted_by: user.email.unwrap_or_else(|| SYSTEM_ACTOR.to_string()),
        },
    )
    .await?;

    Ok(Json(json!({
        "message": "Report submitted successfully",
        "id": id,
    })))
}

async fn delete_report(
    State(state): State<AppState>,
    _auth: Authorized<ReportManagers>,
    Path(target): Path<String>,
) -> Result<Json<Value>> {
    let target: ReportTarget = target.parse()?;
    let deleted = reports::delete_report(&state.db, target).await?;

    let message = match target {
        ReportTarget::All => "All reports deleted successfully",
        ReportTarget::Id(_) => "Report deleted successfully",
    };
    Ok(Json(json!({ "message": message, "deleted": deleted })))
}

async fn get_admin_computer_reports(
    State(state): State<AppState>,
    _auth: Authorized<ReportReaders>,
) -> Result<Json<Vec<ReportWithContext>>> {
    Ok(Json(reports::list_reports_with_context(&state.db).await?))
}
