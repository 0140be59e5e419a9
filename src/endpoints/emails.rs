use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::endpoints::Payload;
use crate::error::{AppError, Result};
use crate::middleware::{Authorized, CurrentUser, Mailers};
use crate::services::notification::EmailMessage;
use crate::state::AppState;

/// Create summary email routes
pub fn email_routes(state: AppState) -> Router {
    Router::new()
        .route("/send_report_email", post(send_report_email))
        .route(
            "/technician_send_report_email",
            post(technician_send_report_email),
        )
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ReportEmailRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: Vec<Value>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, rename = "userEmail")]
    pub user_email: Option<String>,
    #[serde(default, rename = "userName")]
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TechnicianEmailRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issue_report: Vec<Value>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, rename = "userEmail")]
    pub user_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmailSentResponse {
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// The address named in the request, falling back to the caller's own
fn recipients(requested: Option<&str>, user: &CurrentUser) -> Vec<String> {
    requested
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .or(user.email.as_deref())
        .map(|email| vec![email.to_string()])
        .unwrap_or_default()
}

async fn deliver(state: &AppState, message: EmailMessage) -> Json<EmailSentResponse> {
    let result = state.notification.send(&message).await;
    Json(EmailSentResponse {
        sent: result.success,
        error: result.error,
    })
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn send_report_email(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<Mailers>,
    payload: std::result::Result<Json<Payload<ReportEmailRequest>>, JsonRejection>,
) -> Result<Json<EmailSentResponse>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();
    if request.summary.is_empty() {
        return Err(AppError::BadRequest("No reports selected".to_string()));
    }

    let message = EmailMessage {
        subject: format!("Lab Report Summary: {}", request.title),
        recipients: recipients(request.user_email.as_deref(), &user),
        template: "report.html".to_string(),
        context: json!({
            "title": request.title,
            "position": request.position,
            "sender": request.user_name.as_deref().unwrap_or(user.actor()),
            "summary": request.summary,
        }),
    };

    Ok(deliver(&state, message).await)
}

async fn technician_send_report_email(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<Mailers>,
    payload: std::result::Result<Json<Payload<TechnicianEmailRequest>>, JsonRejection>,
) -> Result<Json<EmailSentResponse>> {
    let Json(payload) = payload?;
    let request = payload.into_inner();
    if request.issue_report.is_empty() {
        return Err(AppError::BadRequest("No logs selected".to_string()));
    }

    let message = EmailMessage {
        subject: format!("Technician Report: {}", request.title),
        recipients: recipients(request.user_email.as_deref(), &user),
        template: "technician.html".to_string(),
        context: json!({
            "title": request.title,
            "position": request.position,
            "sender": user.actor(),
            "summary": request.issue_report,
        }),
    };

    Ok(deliver(&state, message).await)
}
