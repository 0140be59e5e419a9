use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::endpoints::Payload;
use crate::error::Result;
use crate::middleware::{Authenticated, Authorized, Curators, Editors};
use crate::services::labs::{self, LabSummary};
use crate::state::AppState;

/// Create laboratory routes
pub fn labs_routes(state: AppState) -> Router {
    Router::new()
        .route("/add_laboratory", post(add_laboratory))
        .route("/get_laboratory", get(get_laboratories))
        .route("/edit_lab/{id}", put(edit_lab))
        .route("/delete_lab/{id}", delete(delete_lab))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct LabRequest {
    #[serde(alias = "name")]
    #[validate(length(min = 1, max = 100, message = "Laboratory name must be 1-100 characters"))]
    pub lab_name: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl LabRequest {
    fn location(&self) -> Option<String> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
    }
}

#[derive(Debug, Serialize)]
pub struct LabResponse {
    pub id: i64,
    pub lab_id: i64,
    pub name: String,
    pub lab_name: String,
    pub location: Option<String>,
    pub pc_count: i64,
}

impl From<LabSummary> for LabResponse {
    fn from(lab: LabSummary) -> Self {
        Self {
            id: lab.id,
            lab_id: lab.id,
            lab_name: lab.name.clone(),
            name: lab.name,
            location: lab.location,
            pc_count: lab.pc_count,
        }
    }
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn add_laboratory(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<Editors>,
    payload: std::result::Result<Json<Payload<LabRequest>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();
    request.validate()?;

    let lab = labs::create_lab(&state.db, &request.lab_name, request.location()).await?;
    tracing::debug!(lab_id = lab.id, "Laboratory created by {}", user.actor());

    Ok(Json(json!({
        "message": "Laboratory added successfully",
        "id": lab.id,
        "name": lab.name,
        "location": lab.location,
    })))
}

async fn get_laboratories(
    State(state): State<AppState>,
    _user: Authenticated,
) -> Result<Json<Vec<LabResponse>>> {
    let labs = labs::list_labs(&state.db).await?;
    Ok(Json(labs.into_iter().map(LabResponse::from).collect()))
}

async fn edit_lab(
    State(state): State<AppState>,
    _auth: Authorized<Editors>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<Payload<LabRequest>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();
    request.validate()?;

    let lab = labs::update_lab(&state.db, id, &request.lab_name, request.location()).await?;

    Ok(Json(json!({
        "message": "Laboratory updated successfully",
        "id": lab.id,
        "name": lab.name,
        "location": lab.location,
    })))
}

async fn delete_lab(
    State(state): State<AppState>,
    _auth: Authorized<Curators>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    labs::delete_lab(&state.db, id).await?;
    Ok(Json(json!({ "message": "Laboratory deleted successfully" })))
}
