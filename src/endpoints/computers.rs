use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::endpoints::{int_or_string, string_or_int, Payload};
use crate::error::{AppError, Result};
use crate::middleware::{Authenticated, Authorized, Curators, Editors};
use crate::models::{PartKind, PartStatus};
use crate::services::computers::{self, ComputerEdit, ComputerSummary, NewComputer};
use crate::services::parts::{self, Part};
use crate::services::specs::{normalize_other_parts, normalize_specs};
use crate::services::transitions::{self, ReportOutcome, StatusBatch, StatusChange};
use crate::state::AppState;

/// Create computer and part status routes
pub fn computers_routes(state: AppState) -> Router {
    Router::new()
        .route("/computer", post(add_computer))
        .route("/computer/bulk", post(add_computers_bulk))
        .route("/get_computers", get(get_computers))
        .route("/update_edit_data/{id}", post(update_edit_data))
        .route("/delete_computer/{id}", delete(delete_computer))
        .route("/get_computer_statuses", get(get_computer_statuses))
        .route("/get_other_part_status", get(get_other_part_status))
        .route("/update_computer_status", post(update_computer_status))
        .route(
            "/update_computer_status_bulk",
            post(update_computer_status_bulk),
        )
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ComputerRequest {
    #[serde(alias = "name")]
    #[validate(length(min = 1, message = "Computer name is required"))]
    pub pc_name: String,
    #[serde(deserialize_with = "int_or_string")]
    pub lab_id: i64,
    #[serde(default)]
    pub specs: Value,
    #[serde(default)]
    pub other_parts: Value,
}

impl ComputerRequest {
    fn into_new_computer(self) -> Result<NewComputer> {
        self.validate()?;
        let name = self.pc_name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Computer name is required".to_string()));
        }

        Ok(NewComputer {
            name: name.to_string(),
            lab_id: self.lab_id,
            specs: normalize_specs(&self.specs)?,
            other_parts: normalize_other_parts(&self.other_parts),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EditComputerRequest {
    #[serde(default, alias = "name")]
    pub pc_name: Option<String>,
    #[serde(default)]
    pub specs: Value,
    /// Absent or null leaves custom parts untouched
    #[serde(default)]
    pub other_parts: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(deserialize_with = "string_or_int")]
    pub com_id: String,
    pub part: String,
    #[serde(flatten)]
    pub change: StatusChange,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest {
    pub statuses: StatusBatch,
}

/// One part as the status screens show it
#[derive(Debug, Serialize)]
pub struct PartStatusResponse {
    pub id: i64,
    pub com_id: String,
    pub computer_id: String,
    pub part: String,
    pub name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: PartKind,
    pub serial_number: Option<String>,
    /// Legacy integer code
    pub status: i64,
    pub status_label: PartStatus,
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

impl From<Part> for PartStatusResponse {
    fn from(part: Part) -> Self {
        Self {
            id: part.id,
            com_id: part.computer_id.clone(),
            part: part.key().to_string(),
            computer_id: part.computer_id,
            name: part.name,
            category: part.category,
            kind: part.kind,
            serial_number: part.serial_number,
            status: part.status.code(),
            status_label: part.status,
            notes: part.notes,
            updated_at: part.updated_at,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn status_message(report: &ReportOutcome) -> &'static str {
    match report {
        ReportOutcome::Failed(_) => "Status updated, but the report could not be filed",
        _ => "Status updated successfully",
    }
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn add_computer(
    State(state): State<AppState>,
    _auth: Authorized<Editors>,
    payload: std::result::Result<Json<Payload<ComputerRequest>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let new = payload.into_inner().into_new_computer()?;

    let registered = computers::register_computer(&state.db, new).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Computer added successfully",
        "computer_id": registered.id,
        "pc_name": registered.name,
        "parts": registered.parts.into_iter().map(PartStatusResponse::from).collect::<Vec<_>>(),
    })))
}

async fn add_computers_bulk(
    State(state): State<AppState>,
    _auth: Authorized<Editors>,
    payload: std::result::Result<Json<Payload<Vec<ComputerRequest>>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let requests = payload.into_inner();
    if requests.is_empty() {
        return Err(AppError::Validation("No computers supplied".to_string()));
    }

    let batch = requests
        .into_iter()
        .map(ComputerRequest::into_new_computer)
        .collect::<Result<Vec<_>>>()?;
    let result = computers::register_many(&state.db, batch).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} computers added", result.inserted.len()),
        "inserted": result.inserted,
        "skipped_duplicates": result.skipped_duplicates,
    })))
}

async fn get_computers(
    State(state): State<AppState>,
    _user: Authenticated,
) -> Result<Json<Vec<ComputerSummary>>> {
    Ok(Json(computers::list_computers(&state.db).await?))
}

async fn update_edit_data(
    State(state): State<AppState>,
    _auth: Authorized<Editors>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Payload<EditComputerRequest>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();

    let edit = ComputerEdit {
        name: request.pc_name,
        specs: normalize_specs(&request.specs)?,
        other_parts: request.other_parts.as_ref().map(normalize_other_parts),
    };
    computers::update_computer(&state.db, &id, edit).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Computer updated successfully",
    })))
}

async fn delete_computer(
    State(state): State<AppState>,
    _auth: Authorized<Curators>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    computers::delete_computer(&state.db, &id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Computer deleted successfully",
    })))
}

async fn get_computer_statuses(
    State(state): State<AppState>,
    _user: Authenticated,
) -> Result<Json<Vec<PartStatusResponse>>> {
    let parts = parts::list_parts(&state.db, None, None).await?;
    Ok(Json(parts.into_iter().map(PartStatusResponse::from).collect()))
}

async fn get_other_part_status(
    State(state): State<AppState>,
    _user: Authenticated,
) -> Result<Json<Vec<PartStatusResponse>>> {
    let parts = parts::list_parts(&state.db, None, Some(PartKind::Custom)).await?;
    Ok(Json(parts.into_iter().map(PartStatusResponse::from).collect()))
}

async fn update_computer_status(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<Editors>,
    payload: std::result::Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload?;

    let outcome = transitions::apply_status_change(
        &state.db,
        &request.com_id,
        &request.part,
        &request.change,
        user.email.as_deref(),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": status_message(&outcome.report),
        "created": outcome.created,
        "part": PartStatusResponse::from(outcome.part),
        "report": outcome.report,
    })))
}

async fn update_computer_status_bulk(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<Editors>,
    payload: std::result::Result<Json<BulkStatusRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload?;
    if request.statuses.values().all(|changes| changes.is_empty()) {
        return Err(AppError::Validation("No status changes supplied".to_string()));
    }

    let outcomes =
        transitions::apply_status_change_bulk(&state.db, &request.statuses, user.email.as_deref())
            .await?;
    let failed_reports = outcomes
        .iter()
        .filter(|o| matches!(o.outcome.report, ReportOutcome::Failed(_)))
        .count();

    Ok(Json(json!({
        "success": true,
        "message": format!("{} status changes applied", outcomes.len()),
        "failed_reports": failed_reports,
        "changes": outcomes,
    })))
}
