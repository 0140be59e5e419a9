//! Summary emails for reports and technician logs
//!
//! Sending is fire-and-observe: a failure comes back as a [`SendResult`] and
//! is logged, it never propagates as an error.

mod email;

pub use email::{render_body, EmailNotifier};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::mail::MailConfig;

/// Email to send. `template` names the layout the context was built for.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub subject: String,
    pub recipients: Vec<String>,
    pub template: String,
    pub context: serde_json::Value,
}

/// Result of sending a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendResult {
    pub success: bool,
    pub error: Option<String>,
}

impl SendResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Trait for notification providers
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> SendResult;
}

/// Holds the configured provider, if any
#[derive(Clone, Default)]
pub struct NotificationService {
    provider: Option<Arc<dyn Notifier>>,
}

impl NotificationService {
    pub fn disabled() -> Self {
        Self { provider: None }
    }

    pub fn with_provider(provider: Arc<dyn Notifier>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    pub fn from_config(config: &MailConfig) -> Self {
        if !config.is_configured() {
            tracing::info!("SMTP not configured, summary emails are disabled");
            return Self::disabled();
        }

        match EmailNotifier::from_config(config) {
            Ok(notifier) => {
                tracing::info!("Email notification provider initialized");
                Self::with_provider(Arc::new(notifier))
            }
            Err(e) => {
                tracing::warn!("Email notification provider unavailable: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn send(&self, message: &EmailMessage) -> SendResult {
        let Some(provider) = &self.provider else {
            tracing::warn!(subject = %message.subject, "Email not sent: not configured");
            return SendResult::failed("email not configured");
        };

        if message.recipients.is_empty() {
            return SendResult::failed("no recipients");
        }

        let result = provider.send(message).await;
        match &result.error {
            None => tracing::info!(
                subject = %message.subject,
                "Email sent to {}",
                message.recipients.join(", ")
            ),
            Some(e) => tracing::error!(subject = %message.subject, "Email send failed: {}", e),
        }
        result
    }
}
