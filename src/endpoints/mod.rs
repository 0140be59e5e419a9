pub mod accessories;
pub mod computers;
pub mod emails;
pub mod labs;
pub mod reports;
pub mod resolutions;
pub mod users;

use axum::{middleware as axum_middleware, routing::get, Router};
use serde::{Deserialize, Deserializer};

use crate::config::CONFIG;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/version", get(get_version));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .merge(labs::labs_routes(state.clone()))
        .merge(computers::computers_routes(state.clone()))
        .merge(reports::reports_routes(state.clone()))
        .merge(resolutions::resolutions_routes(state.clone()))
        .merge(emails::email_routes(state.clone()))
        .merge(users::users_routes(state.clone()))
        .merge(accessories::accessories_routes(state))
        .layer(axum_middleware::from_fn(require_auth));

    // Merge public and protected routes
    public_routes.merge(protected_routes)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
        "build_time": CONFIG.build_time,
        "backend": "rust"
    }))
}

// ============================================================================
// Request helpers
// ============================================================================

/// Request body that may arrive wrapped as `{"data": ...}` (older frontend
/// screens) or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Payload::Wrapped { data } => data,
            Payload::Bare(inner) => inner,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrInt {
    Str(String),
    Int(i64),
}

/// Ids the frontend sends either as JSON numbers or strings
pub(crate) fn string_or_int<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrInt::deserialize(deserializer)? {
        StringOrInt::Str(s) => s.trim().to_string(),
        StringOrInt::Int(n) => n.to_string(),
    })
}

pub(crate) fn optional_string_or_int<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrInt>::deserialize(deserializer)? {
        Some(StringOrInt::Str(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(StringOrInt::Int(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn int_or_string<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::Int(n) => Ok(n),
        StringOrInt::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected an integer id, got '{}'", s))),
    }
}
