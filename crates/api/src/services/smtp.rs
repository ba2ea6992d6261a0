//! SMTP backend.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info, instrument};
use uuid::Uuid;

use domain::models::{EmailMessage, EmailProvider};

use super::email::{EmailError, EmailSender, Sender, SentEmail};
use crate::config::EmailConfig;

/// Sends through an SMTP relay. The transport keeps a connection pool, so
/// one instance is built at startup and shared.
#[derive(Clone)]
pub struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Sender,
    host: String,
}

impl SmtpSender {
    /// Builds the transport. Returns `NotConfigured` when no host is set.
    pub fn from_config(config: &EmailConfig) -> Result<Self, EmailError> {
        let host = config.smtp_host.trim();
        if host.is_empty() {
            return Err(EmailError::NotConfigured("SMTP host is not set".to_string()));
        }

        let builder = if config.smtp_use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| EmailError::NotConfigured(format!("Invalid SMTP relay: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };
        let mut builder = builder.port(config.smtp_port);

        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            sender: Sender {
                email: config.sender_email.clone(),
                name: config.sender_name.clone(),
            },
            host: host.to_string(),
        })
    }

    fn build_message(&self, message: &EmailMessage, message_id: &str) -> Result<Message, EmailError> {
        let from = mailbox(Some(&self.sender.name), &self.sender.email)?;
        let to = mailbox(message.to_name.as_deref(), &message.to)?;

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .message_id(Some(message_id.to_string()));

        if let Some(reply_to) = &message.reply_to {
            builder = builder.reply_to(mailbox(None, reply_to)?);
        }

        let built = match (&message.text, &message.html) {
            (Some(text), Some(html)) => builder
                .multipart(MultiPart::alternative_plain_html(text.clone(), html.clone())),
            (None, Some(html)) => builder.singlepart(SinglePart::html(html.clone())),
            (Some(text), None) => builder.singlepart(SinglePart::plain(text.clone())),
            (None, None) => builder.header(ContentType::TEXT_PLAIN).body(String::new()),
        };

        built.map_err(|e| EmailError::SendFailed(format!("Could not build message: {}", e)))
    }
}

fn mailbox(name: Option<&str>, email: &str) -> Result<Mailbox, EmailError> {
    let address = email
        .trim()
        .parse()
        .map_err(|_| EmailError::InvalidAddress(email.to_string()))?;
    Ok(Mailbox::new(name.map(str::to_string), address))
}

/// `<uuid@domain>` using the sender's domain.
fn local_message_id(sender_email: &str) -> String {
    let domain = sender_email
        .rsplit_once('@')
        .map(|(_, d)| d)
        .filter(|d| !d.is_empty())
        .unwrap_or("localhost");
    format!("<{}@{}>", Uuid::new_v4(), domain)
}

#[async_trait]
impl EmailSender for SmtpSender {
    fn provider(&self) -> EmailProvider {
        EmailProvider::Smtp
    }

    #[instrument(skip(self, message), fields(provider = "smtp", host = %self.host, to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, EmailError> {
        let message_id = local_message_id(&self.sender.email);
        let email = self.build_message(message, &message_id)?;

        match self.transport.send(email).await {
            Ok(response) => {
                info!(
                    message_id = %message_id,
                    code = %response.code(),
                    subject = %message.subject,
                    "Email sent via SMTP"
                );
                Ok(SentEmail { message_id })
            }
            Err(e) => {
                error!(error = %e, "SMTP send failed");
                Err(EmailError::SendFailed(format!("SMTP error: {}", e)))
            }
        }
    }

    async fn verify(&self) -> Result<(), EmailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(EmailError::SendFailed(format!(
                "SMTP server {} did not accept the connection",
                self.host
            ))),
            Err(e) => Err(EmailError::SendFailed(format!("SMTP error: {}", e))),
        }
    }
}
