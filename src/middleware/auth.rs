//! Authentication middleware for API routes
//!
//! Requires a valid Bearer token on every route it wraps.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::services::security::{decode_token, Role};

/// Caller identity stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
}

impl CurrentUser {
    /// Identity recorded as the author of reports and resolutions
    pub fn actor(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// Auth middleware that validates Bearer tokens
///
/// Returns 401 Unauthorized if the token is missing or invalid.
pub async fn require_auth(mut req: Request, next: Next) -> Response {
    let Some(token) = extract_bearer_token(&req) else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    let claims = match decode_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Rejected token: {}", e);
            return unauthorized_response("Invalid or expired token");
        }
    };

    req.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        email: claims.email.filter(|e| !e.trim().is_empty()),
        role: claims.role,
    });

    next.run(req).await
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Option<String> {
    let auth_header = req.headers().get(AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    Some(token.trim().to_string())
}

/// Create a 401 Unauthorized JSON response
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "detail": message
        })),
    )
        .into_response()
}
