use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::services::notification::{NotificationService, Notifier};

/// Database connection type alias
pub type DbConn = DatabaseConnection;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub notification: NotificationService,
}

impl AppState {
    pub fn new(db: DbConn, notification: NotificationService) -> Self {
        Self { db, notification }
    }

    /// State with a custom notifier, used when the SMTP transport is replaced
    pub fn with_notifier(db: DbConn, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            notification: NotificationService::with_provider(notifier),
        }
    }
}
