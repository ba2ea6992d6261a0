//! Email delivery capability.
//!
//! Every backend implements [`EmailSender`]:
//! - `console`: logs the message (delivery disabled)
//! - `smtp`: SMTP relay via lettre, see [`super::smtp`]
//! - `sendgrid`: SendGrid v3 HTTP API, see [`super::sendgrid`]

use async_trait::async_trait;
use domain::models::{EmailMessage, EmailProvider};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Template rendering error: {0}")]
    TemplateError(String),

    #[error("{provider} returned {status}: {body}")]
    ProviderError {
        provider: EmailProvider,
        status: u16,
        body: String,
    },

    #[error("Email settings unavailable: {0}")]
    SettingsUnavailable(String),
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub message_id: String,
}

/// Sender identity placed in the From header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub email: String,
    pub name: String,
}

/// A configured email backend.
#[async_trait]
pub trait EmailSender: Send + Sync {
    fn provider(&self) -> EmailProvider;

    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, EmailError>;

    /// Checks that the backend accepts our credentials without sending mail.
    async fn verify(&self) -> Result<(), EmailError>;
}

/// Logs messages instead of delivering them.
#[derive(Debug, Clone)]
pub struct ConsoleSender {
    sender: Sender,
}

impl ConsoleSender {
    pub fn new(sender: Sender) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl EmailSender for ConsoleSender {
    fn provider(&self) -> EmailProvider {
        EmailProvider::Console
    }

    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, EmailError> {
        let message_id = format!("console-{}", Uuid::new_v4());
        info!(
            provider = "console",
            message_id = %message_id,
            from = %self.sender.email,
            to = %message.to,
            subject = %message.subject,
            has_html = message.html.is_some(),
            "Email delivery disabled, message logged"
        );
        if let Some(text) = &message.text {
            info!(provider = "console", body = %text, "Email body");
        }
        Ok(SentEmail { message_id })
    }

    async fn verify(&self) -> Result<(), EmailError> {
        Ok(())
    }
}
