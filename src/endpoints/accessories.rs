use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::endpoints::{int_or_string, Payload};
use crate::error::{AppError, Result};
use crate::middleware::{Admins, Authenticated, Authorized, Stockkeepers};
use crate::services::accessories::{self, AccessoryEdit, AccessoryWithLab, NewAccessory};
use crate::state::AppState;

/// Create accessory routes
pub fn accessories_routes(state: AppState) -> Router {
    Router::new()
        .route("/get_accessories", get(get_accessories))
        .route("/add_accessories", post(add_accessories))
        .route("/update_accessory/{id}", put(update_accessory))
        .route("/delete_accessory/{id}", delete(delete_accessory))
        .with_state(state)
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddAccessoryRequest {
    pub name: String,
    #[serde(deserialize_with = "int_or_string")]
    pub quantity: i64,
    #[serde(deserialize_with = "int_or_string")]
    pub lab_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccessoryRequest {
    pub name: String,
    #[serde(deserialize_with = "int_or_string")]
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

fn quantity(value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| AppError::Validation("Quantity is out of range".to_string()))
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn get_accessories(
    State(state): State<AppState>,
    _user: Authenticated,
) -> Result<Json<Vec<AccessoryWithLab>>> {
    Ok(Json(accessories::list_accessories(&state.db).await?))
}

async fn add_accessories(
    State(state): State<AppState>,
    _auth: Authorized<Stockkeepers>,
    payload: std::result::Result<Json<Payload<AddAccessoryRequest>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();

    let accessory = accessories::create_accessory(
        &state.db,
        NewAccessory {
            name: request.name,
            quantity: quantity(request.quantity)?,
            lab_id: request.lab_id,
            notes: request.notes.unwrap_or_default(),
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Accessory added successfully",
        "id": accessory.id,
    })))
}

async fn update_accessory(
    State(state): State<AppState>,
    _auth: Authorized<Stockkeepers>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<Payload<UpdateAccessoryRequest>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();

    accessories::update_accessory(
        &state.db,
        id,
        AccessoryEdit {
            name: request.name,
            quantity: quantity(request.quantity)?,
            notes: request.notes,
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Accessory updated successfully",
    })))
}

async fn delete_accessory(
    State(state): State<AppState>,
    _auth: Authorized<Admins>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    accessories::delete_accessory(&state.db, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Accessory deleted successfully",
    })))
}
