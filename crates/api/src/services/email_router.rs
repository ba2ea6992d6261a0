//! Per-request email provider routing.
//!
//! Every call reads the settings store once, picks a backend with
//! [`domain::services::select_provider`] and sends through it. Nothing is
//! cached between calls, so an admin switching providers takes effect on
//! the next send.

use std::sync::Arc;

use tracing::{info, warn};

use domain::models::{EmailMessage, EmailProvider, EmailSettingsSnapshot};
use domain::services::{
    force_sendgrid, select_provider, EmailSettingStore, ProviderChoice, ProviderEnvironment,
    SelectionError,
};

use super::email::{ConsoleSender, EmailError, EmailSender, Sender};
use super::sendgrid::SendGridSender;
use super::smtp::SmtpSender;
use crate::config::EmailConfig;
use crate::middleware::metrics::record_email_sent;

impl From<SelectionError> for EmailError {
    fn from(err: SelectionError) -> Self {
        EmailError::NotConfigured(err.to_string())
    }
}

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub message_id: String,
    pub provider: EmailProvider,
}

#[derive(Clone)]
pub struct EmailRouter {
    settings: Arc<dyn EmailSettingStore>,
    config: EmailConfig,
    client: reqwest::Client,
    smtp: Option<Arc<SmtpSender>>,
}

impl EmailRouter {
    /// The SMTP transport is built once here when a host is configured.
    pub fn new(
        settings: Arc<dyn EmailSettingStore>,
        config: EmailConfig,
        client: reqwest::Client,
    ) -> Self {
        let smtp = if config.smtp_configured() {
            match SmtpSender::from_config(&config) {
                Ok(sender) => Some(Arc::new(sender)),
                Err(e) => {
                    warn!(error = %e, "SMTP transport could not be built, SMTP disabled");
                    None
                }
            }
        } else {
            None
        };

        Self {
            settings,
            config,
            client,
            smtp,
        }
    }

    fn environment(&self) -> ProviderEnvironment {
        ProviderEnvironment {
            email_enabled: self.config.enabled,
            smtp_configured: self.smtp.is_some(),
            sendgrid_api_key: Some(self.config.sendgrid_api_key.clone())
                .filter(|k| !k.trim().is_empty()),
        }
    }

    async fn snapshot(&self) -> Result<EmailSettingsSnapshot, EmailError> {
        let settings = self
            .settings
            .list()
            .await
            .map_err(|e| EmailError::SettingsUnavailable(e.to_string()))?;
        Ok(EmailSettingsSnapshot::from_settings(&settings))
    }

    /// Resolves the backend for one send from a fresh settings snapshot.
    pub async fn dispatch(&self) -> Result<Dispatch, EmailError> {
        let snapshot = self.snapshot().await?;
        let choice = select_provider(&snapshot, &self.environment())?;
        self.build(snapshot, choice)
    }

    /// SendGrid regardless of the stored provider choice.
    pub async fn sendgrid_dispatch(&self) -> Result<Dispatch, EmailError> {
        let snapshot = self.snapshot().await?;
        let choice = force_sendgrid(&snapshot, &self.environment())?;
        self.build(snapshot, choice)
    }

    /// Provider the next send would use, without sending.
    pub fn resolve(&self, snapshot: &EmailSettingsSnapshot) -> Result<EmailProvider, EmailError> {
        Ok(select_provider(snapshot, &self.environment())?.provider())
    }

    fn build(
        &self,
        snapshot: EmailSettingsSnapshot,
        choice: ProviderChoice,
    ) -> Result<Dispatch, EmailError> {
        let default_sender = Sender {
            email: self.config.sender_email.clone(),
            name: self.config.sender_name.clone(),
        };

        let sender: Arc<dyn EmailSender> = match choice {
            ProviderChoice::Console => Arc::new(ConsoleSender::new(default_sender)),
            ProviderChoice::Smtp => match &self.smtp {
                Some(smtp) => smtp.clone(),
                None => return Err(SelectionError::SmtpNotConfigured.into()),
            },
            ProviderChoice::SendGrid { api_key } => {
                let sender = Sender {
                    email: snapshot
                        .sendgrid_from_email
                        .clone()
                        .unwrap_or(default_sender.email),
                    name: snapshot
                        .sendgrid_from_name
                        .clone()
                        .unwrap_or(default_sender.name),
                };
                Arc::new(SendGridSender::new(
                    self.client.clone(),
                    self.config.sendgrid_base_url.clone(),
                    api_key,
                    sender,
                ))
            }
        };

        Ok(Dispatch {
            snapshot,
            sender,
            admin_fallback: self.config.admin_email.clone(),
        })
    }
}

/// A backend resolved for one request, along with the snapshot it came from.
pub struct Dispatch {
    snapshot: EmailSettingsSnapshot,
    sender: Arc<dyn EmailSender>,
    admin_fallback: String,
}

impl Dispatch {
    pub fn provider(&self) -> EmailProvider {
        self.sender.provider()
    }

    /// Stored `admin_email`, else the configured one.
    pub fn admin_recipient(&self) -> &str {
        self.snapshot
            .admin_email
            .as_deref()
            .unwrap_or(&self.admin_fallback)
    }

    pub async fn send(&self, message: &EmailMessage) -> Result<SendOutcome, EmailError> {
        let provider = self.provider();
        let result = self.sender.send(message).await;
        record_email_sent(provider.as_str(), result.is_ok());

        let sent = result?;
        info!(
            provider = %provider,
            message_id = %sent.message_id,
            "Email dispatched"
        );
        Ok(SendOutcome {
            message_id: sent.message_id,
            provider,
        })
    }

    pub async fn verify(&self) -> Result<EmailProvider, EmailError> {
        self.sender.verify().await?;
        Ok(self.provider())
    }
}
