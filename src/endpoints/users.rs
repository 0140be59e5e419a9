use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::endpoints::{optional_string_or_int, Payload};
use crate::error::{AppError, Result};
use crate::middleware::{AccountManagers, Authenticated, Authorized};
use crate::models::prelude::user;
use crate::services::security::Role;
use crate::services::users::{self, NewUser, UserEdit, UserLookup};
use crate::state::AppState;

/// Create user administration routes
pub fn users_routes(state: AppState) -> Router {
    Router::new()
        .route("/get_user", get(get_current_user))
        .route("/get_users", get(list_users))
        .route("/register_user", post(register_user))
        .route("/users/{id}", delete(delete_user).put(update_user))
        .route("/delete_user/{email}", delete(delete_user_by_email))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_int")]
    pub year: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_int")]
    pub year: Option<String>,
}

impl UpdateUserRequest {
    fn into_edit(self) -> Result<UserEdit> {
        Ok(UserEdit {
            name: non_blank(self.name),
            email: non_blank(self.email),
            role: non_blank(self.role).as_deref().map(parse_role).transpose()?,
            year: self.year,
        })
    }
}

/// Blank form fields mean "leave unchanged"
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_role(role: &str) -> Result<Role> {
    Role::parse(role).ok_or_else(|| {
        let valid: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
        AppError::Validation(format!("Invalid role. Must be one of: {}", valid.join(", ")))
    })
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub year: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            year: user.year,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn get_current_user(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Result<Json<UserResponse>> {
    let account = users::get_user(&state.db, &user.id).await?;
    Ok(Json(account.into()))
}

async fn list_users(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AccountManagers>,
) -> Result<Json<Vec<UserResponse>>> {
    let accounts = users::list_users(&state.db, user.role).await?;
    Ok(Json(accounts.into_iter().map(UserResponse::from).collect()))
}

async fn register_user(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AccountManagers>,
    payload: std::result::Result<Json<Payload<RegisterUserRequest>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();
    request.validate()?;

    let role = match non_blank(request.role) {
        Some(role) => parse_role(&role)?,
        None => Role::Technician,
    };

    let account = users::create_user(
        &state.db,
        user.role,
        NewUser {
            name: request.name,
            email: request.email,
            role,
            year: request.year,
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "id": account.id,
        "role": account.role,
    })))
}

async fn update_user(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AccountManagers>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Payload<UpdateUserRequest>>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();
    request.validate()?;

    let account = users::update_user(&state.db, user.role, &id, request.into_edit()?).await?;

    Ok(Json(json!({
        "message": "User updated successfully",
        "user": UserResponse::from(account),
    })))
}

async fn delete_user(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AccountManagers>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let account = users::delete_user(&state.db, user.role, UserLookup::Id(id)).await?;
    Ok(Json(json!({
        "message": format!("User {} deleted successfully", account.id)
    })))
}

async fn delete_user_by_email(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AccountManagers>,
    Path(email): Path<String>,
) -> Result<Json<Value>> {
    users::delete_user(&state.db, user.role, UserLookup::Email(email)).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}
