use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde_json::Value;

use super::{EmailMessage, Notifier, SendResult};
use crate::config::mail::MailConfig;

pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    from_name: String,
}

impl EmailNotifier {
    pub fn from_config(config: &MailConfig) -> Result<Self, String> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| "SMTP host not set".to_string())?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };
        let mut builder = builder.port(config.smtp_port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        })
    }

    fn from_mailbox(&self) -> Result<Mailbox, String> {
        format!("{} <{}>", self.from_name, self.from_address)
            .parse::<Mailbox>()
            .or_else(|_| self.from_address.parse::<Mailbox>())
            .map_err(|_| "Invalid from email address".to_string())
    }

    fn build(&self, message: &EmailMessage) -> Result<Message, String> {
        let mut builder = Message::builder()
            .from(self.from_mailbox()?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN);

        for recipient in &message.recipients {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|_| format!("Invalid recipient email address '{}'", recipient))?;
            builder = builder.to(mailbox);
        }

        builder
            .body(render_body(&message.template, &message.context))
            .map_err(|e| format!("Failed to build email: {}", e))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, message: &EmailMessage) -> SendResult {
        let email = match self.build(message) {
            Ok(email) => email,
            Err(e) => return SendResult::failed(e),
        };

        match self.transport.send(email).await {
            Ok(_) => SendResult::ok(),
            Err(e) => SendResult::failed(format!("Failed to send email: {}", e)),
        }
    }
}

/// Plain-text body for a summary email. Scalar context fields become
/// `key: value` lines and the `summary` list is printed one entry per block.
pub fn render_body(template: &str, context: &Value) -> String {
    let mut lines = vec![format!("[{}]", template)];

    if let Value::Object(fields) = context {
        for (key, value) in fields {
            if key == "summary" {
                continue;
            }
            if let Some(text) = scalar(value) {
                lines.push(format!("{}: {}", key, text));
            }
        }

        if let Some(Value::Array(items)) = fields.get("summary") {
            lines.push(String::new());
            lines.push(format!("Entries ({}):", items.len()));
            for (index, item) in items.iter().enumerate() {
                lines.push(format!("{}.", index + 1));
                match item {
                    Value::Object(entry) => {
                        for (key, value) in entry {
                            if let Some(text) = scalar(value) {
                                lines.push(format!("   {}: {}", key, text));
                            }
                        }
                    }
                    other => {
                        if let Some(text) = scalar(other) {
                            lines.push(format!("   {}", text));
                        }
                    }
                }
            }
        }
    }

    lines.push(String::new());
    lines.push("---".to_string());
    lines.push("Sent by Labtrack".to_string());
    lines.join("\n")
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
