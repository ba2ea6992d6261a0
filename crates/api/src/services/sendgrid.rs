//! SendGrid v3 HTTP API backend.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use domain::models::{EmailMessage, EmailProvider};

use super::email::{EmailError, EmailSender, Sender, SentEmail};

/// Header SendGrid uses to report the id of an accepted message.
const MESSAGE_ID_HEADER: &str = "x-message-id";

/// Sends through SendGrid. Cheap to build; one is created per send from the
/// settings snapshot and shares the application's HTTP client.
#[derive(Clone)]
pub struct SendGridSender {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    sender: Sender,
}

impl SendGridSender {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        sender: Sender,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            sender,
        }
    }

    fn request_body(&self, message: &EmailMessage) -> Value {
        let mut to = json!({ "email": message.to });
        if let Some(name) = &message.to_name {
            to["name"] = json!(name);
        }

        let mut content = Vec::new();
        if let Some(text) = &message.text {
            content.push(json!({ "type": "text/plain", "value": text }));
        }
        if let Some(html) = &message.html {
            content.push(json!({ "type": "text/html", "value": html }));
        }

        let mut body = json!({
            "personalizations": [{ "to": [to] }],
            "from": {
                "email": self.sender.email,
                "name": self.sender.name
            },
            "subject": message.subject,
            "content": content
        });

        if let Some(reply_to) = &message.reply_to {
            body["reply_to"] = json!({ "email": reply_to });
        }

        body
    }

    /// Id from the accepted response, or a locally generated one when
    /// SendGrid omits the header.
    fn message_id(headers: &reqwest::header::HeaderMap) -> String {
        match headers
            .get(MESSAGE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|id| !id.trim().is_empty())
        {
            Some(id) => id.to_string(),
            None => {
                let generated = format!("sendgrid-{}", Uuid::new_v4());
                warn!(message_id = %generated, "SendGrid response had no message id");
                generated
            }
        }
    }

    async fn provider_error(response: reqwest::Response) -> EmailError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        error!(status = status, error = %body, "SendGrid API error");
        EmailError::ProviderError {
            provider: EmailProvider::SendGrid,
            status,
            body,
        }
    }
}

#[async_trait]
impl EmailSender for SendGridSender {
    fn provider(&self) -> EmailProvider {
        EmailProvider::SendGrid
    }

    #[instrument(skip(self, message), fields(provider = "sendgrid", to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, EmailError> {
        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(message))
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let message_id = Self::message_id(response.headers());

        info!(
            message_id = %message_id,
            subject = %message.subject,
            "Email sent via SendGrid"
        );
        Ok(SentEmail { message_id })
    }

    /// Lists the key's scopes; a 2xx means the key is valid.
    async fn verify(&self) -> Result<(), EmailError> {
        let response = self
            .client
            .get(format!("{}/v3/scopes", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::provider_error(response).await)
        }
    }
}
