//! WebSocket relay notifier.
//!
//! The relay exposes one HTTP ingestion path per notification type and fans
//! each event out to connected kitchen and front-of-house screens.

use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use domain::models::NotificationEvent;

use crate::middleware::metrics::record_notification;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("WebSocket server unreachable: {0}")]
    Connection(String),

    #[error("WebSocket server returned {status}")]
    Rejected { status: u16, body: Value },
}

/// Successful relay response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
}

#[derive(Debug, Clone)]
pub struct WebSocketNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl WebSocketNotifier {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, event: &NotificationEvent) -> String {
        format!("{}{}", self.base_url, event.kind.relay_path())
    }

    #[instrument(skip(self, event), fields(kind = %event.kind))]
    pub async fn notify(&self, event: &NotificationEvent) -> Result<Delivery, NotifyError> {
        let url = self.endpoint(event);
        let response = match self.client.post(&url).json(&event.payload).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "WebSocket server unreachable");
                record_notification(event.kind.as_str(), false);
                return Err(NotifyError::Connection(e.to_string()));
            }
        };

        let status = response.status();
        record_notification(event.kind.as_str(), status.is_success());

        if status.is_success() {
            info!(url = %url, status = status.as_u16(), "Notification forwarded");
            return Ok(Delivery {
                status: status.as_u16(),
            });
        }

        let text = response.text().await.unwrap_or_default();
        // Keep JSON error bodies structured; anything else is passed as a string.
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        warn!(url = %url, status = status.as_u16(), "WebSocket server rejected notification");
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::NotificationType;
    use serde_json::Map;

    #[test]
    fn test_endpoint_per_type() {
        let notifier = WebSocketNotifier::new(reqwest::Client::new(), "http://relay.local:8081/");
        let event = NotificationEvent {
            kind: NotificationType::StatusUpdate,
            payload: Map::new(),
        };
        assert_eq!(
            notifier.endpoint(&event),
            "http://relay.local:8081/notify/status-update"
        );
    }

    #[tokio::test]
    async fn test_unreachable_relay() {
        let notifier = WebSocketNotifier::new(reqwest::Client::new(), "http://127.0.0.1:9");
        let event = NotificationEvent {
            kind: NotificationType::Order,
            payload: Map::new(),
        };
        assert!(matches!(
            notifier.notify(&event).await,
            Err(NotifyError::Connection(_))
        ));
    }
}
