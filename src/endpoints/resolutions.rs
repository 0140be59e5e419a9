use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::endpoints::{int_or_string, Payload};
use crate::error::Result;
use crate::middleware::{Authenticated, Authorized, Technicians};
use crate::models::{technician_log, PartStatus};
use crate::services::resolutions::{self, Resolution};
use crate::services::transitions::RequestedStatus;
use crate::state::AppState;

/// Create technician resolution routes
pub fn resolutions_routes(state: AppState) -> Router {
    Router::new()
        .route("/submit_technician_report", post(submit_technician_report))
        .route("/get_technician_logs", get(get_technician_logs))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitResolutionRequest {
    #[serde(deserialize_with = "int_or_string")]
    pub report_id: i64,
    #[validate(length(min = 1, message = "Action taken is required"))]
    pub action_taken: String,
    pub status: RequestedStatus,
    #[serde(default)]
    pub technician_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TechnicianLogResponse {
    pub id: String,
    pub report_id: Option<i64>,
    pub technician_name: String,
    pub action_taken: String,
    pub status: PartStatus,
    pub timestamp: DateTime<Utc>,
}

impl From<technician_log::Model> for TechnicianLogResponse {
    fn from(log: technician_log::Model) -> Self {
        Self {
            id: log.id,
            report_id: log.report_id,
            technician_name: log.technician_name,
            action_taken: log.action_taken,
            status: log.status_after,
            timestamp: log.created_at,
        }
    }
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn submit_technician_report(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<Technicians>,
    payload: std::result::Result<Json<Payload<SubmitResolutionRequest>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();
    request.validate()?;

    let technician_name = request
        .technician_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| user.actor())
        .to_string();

    let outcome = resolutions::submit_resolution(
        &state.db,
        Resolution {
            report_id: request.report_id,
            technician_name,
            action_taken: request.action_taken,
            status_after: request.status.resolve()?,
        },
    )
    .await?;

    Ok(Json(json!({
        "message": "Technician report submitted successfully",
        "log_id": outcome.log_id,
        "report_status": outcome.report_status,
        "part_sync": outcome.part_sync,
    })))
}

async fn get_technician_logs(
    State(state): State<AppState>,
    _user: Authenticated,
) -> Result<Json<Vec<TechnicianLogResponse>>> {
    let logs = resolutions::list_logs(&state.db).await?;
    Ok(Json(logs.into_iter().map(TechnicianLogResponse::from).collect()))
}
