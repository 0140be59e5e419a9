use std::env;

/// SMTP settings for summary emails. Email is disabled when `smtp_host` is unset.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            smtp_host: env::var("LABTRACK_SMTP_HOST")
                .ok()
                .filter(|h| !h.trim().is_empty()),
            smtp_port: env::var("LABTRACK_SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            username: env::var("LABTRACK_SMTP_USERNAME").unwrap_or_default(),
            password: env::var("LABTRACK_SMTP_PASSWORD").unwrap_or_default(),
            from_address: env::var("LABTRACK_SMTP_FROM").unwrap_or_default(),
            from_name: env::var("LABTRACK_SMTP_FROM_NAME")
                .unwrap_or_else(|_| "Labtrack".to_string()),
            use_tls: env::var("LABTRACK_SMTP_TLS")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.smtp_host.is_some() && !self.from_address.is_empty()
    }
}
