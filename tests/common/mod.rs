//! Test helpers shared by the integration suites.
//!
//! Every suite runs against its own in-memory SQLite database migrated with
//! the real `Migrator`.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use labtrack::endpoints::create_router;
use labtrack::migrations::Migrator;
use labtrack::services::computers::{self, NewComputer};
use labtrack::services::labs;
use labtrack::services::notification::{EmailMessage, NotificationService, Notifier, SendResult};
use labtrack::services::security::{issue_token, Role};
use labtrack::services::specs::{CustomPartSpec, PartSpec};
use labtrack::services::users::{self, NewUser};
use labtrack::state::AppState;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    // A single connection, so every query sees the same in-memory database
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

// ============================================================================
// Seed data
// ============================================================================

pub async fn seed_lab(db: &DatabaseConnection, name: &str) -> i64 {
    labs::create_lab(db, name, Some("Main building".to_string()))
        .await
        .expect("Failed to create lab")
        .id
}

pub fn spec(category: &str, name: &str, serial: &str) -> PartSpec {
    PartSpec {
        category: category.to_string(),
        name: name.to_string(),
        serial: Some(serial.to_string()),
    }
}

pub fn custom(name: &str, serial: Option<&str>) -> CustomPartSpec {
    CustomPartSpec {
        name: name.to_string(),
        serial: serial.map(String::from),
    }
}

/// Register a computer with a monitor, a mouse and a keyboard
pub async fn seed_computer(db: &DatabaseConnection, lab_id: i64, name: &str) -> String {
    seed_computer_with(
        db,
        lab_id,
        name,
        vec![
            spec("monitor", "Dell P2419H", "S1"),
            spec("mouse", "Logitech M90", "M1"),
            spec("keyboard", "Logitech K120", "K1"),
        ],
        vec![],
    )
    .await
}

pub async fn seed_computer_with(
    db: &DatabaseConnection,
    lab_id: i64,
    name: &str,
    specs: Vec<PartSpec>,
    other_parts: Vec<CustomPartSpec>,
) -> String {
    computers::register_computer(
        db,
        NewComputer {
            name: name.to_string(),
            lab_id,
            specs,
            other_parts,
        },
    )
    .await
    .expect("Failed to register computer")
    .id
}

/// Create an account directly, bypassing the ITSD restrictions
pub async fn seed_user(db: &DatabaseConnection, name: &str, email: &str, role: Role) -> String {
    users::create_user(
        db,
        Role::Admin,
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            role,
            year: None,
        },
    )
    .await
    .expect("Failed to create user")
    .id
}

// ============================================================================
// HTTP helpers
// ============================================================================

/// Notifier that records every message instead of sending it
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail_with: Option<String>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &EmailMessage) -> SendResult {
        self.sent.lock().unwrap().push(message.clone());
        match &self.fail_with {
            Some(e) => SendResult::failed(e.clone()),
            None => SendResult::ok(),
        }
    }
}

pub fn test_app(db: DatabaseConnection) -> Router {
    create_router(AppState::new(db, NotificationService::disabled()))
}

pub fn test_app_with_notifier(db: DatabaseConnection, notifier: Arc<RecordingNotifier>) -> Router {
    create_router(AppState::with_notifier(db, notifier))
}

pub fn token(role: Role) -> String {
    let email = format!("{}@lab.edu", role);
    issue_token("1", Some(&email), role).expect("Failed to issue token")
}

/// Send a request and return the status with the parsed JSON body
/// (`Value::Null` when the body is empty or not JSON).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub fn empty_body() -> Value {
    json!({})
}
