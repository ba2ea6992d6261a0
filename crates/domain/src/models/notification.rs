//! Real-time notification events forwarded to the WebSocket relay.
//!
//! Events are never persisted: they are validated, routed to a fixed path on
//! the relay and discarded.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Event kinds the relay accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    Order,
    Booking,
    StatusUpdate,
    PrintEvent,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Order => "order",
            NotificationType::Booking => "booking",
            NotificationType::StatusUpdate => "status-update",
            NotificationType::PrintEvent => "print-event",
        }
    }

    /// Ingestion path on the relay server for this event kind.
    pub fn relay_path(&self) -> &'static str {
        match self {
            NotificationType::Order => "/notify/order",
            NotificationType::Booking => "/notify/booking",
            NotificationType::StatusUpdate => "/notify/status-update",
            NotificationType::PrintEvent => "/notify/print-event",
        }
    }

    /// Orders and bookings are scoped to a restaurant location.
    pub fn requires_location(&self) -> bool {
        matches!(self, NotificationType::Order | NotificationType::Booking)
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(NotificationType::Order),
            "booking" => Ok(NotificationType::Booking),
            "status-update" => Ok(NotificationType::StatusUpdate),
            "print-event" => Ok(NotificationType::PrintEvent),
            _ => Err(format!("Unknown notification type: {}", s)),
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw request body. `type` stays a string so unknown kinds can be reported
/// with a proper validation error instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyRequest {
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub data: Option<Value>,
}

/// Why a notify request was rejected before any downstream call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyRequestError {
    #[error("type is required")]
    MissingType,

    #[error("Invalid notification type: {0}. Expected one of order, booking, status-update, print-event")]
    UnknownType(String),

    #[error("data must be a JSON object")]
    InvalidData,
}

/// A validated event ready to be forwarded.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub kind: NotificationType,
    pub payload: Map<String, Value>,
}

impl NotifyRequest {
    /// Validates the request and applies the location default for orders and bookings.
    pub fn into_event(self, default_location: &str) -> Result<NotificationEvent, NotifyRequestError> {
        let raw_type = self
            .notification_type
            .filter(|t| !t.trim().is_empty())
            .ok_or(NotifyRequestError::MissingType)?;

        let kind = raw_type
            .parse::<NotificationType>()
            .map_err(|_| NotifyRequestError::UnknownType(raw_type.clone()))?;

        let mut payload = match self.data {
            Some(Value::Object(map)) => map,
            _ => return Err(NotifyRequestError::InvalidData),
        };

        if kind.requires_location() {
            let missing = payload.get("location").map_or(true, Value::is_null);
            if missing {
                payload.insert(
                    "location".to_string(),
                    Value::String(default_location.to_string()),
                );
            }
        }

        Ok(NotificationEvent { kind, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> NotifyRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_all_types() {
        for (raw, kind) in [
            ("order", NotificationType::Order),
            ("booking", NotificationType::Booking),
            ("status-update", NotificationType::StatusUpdate),
            ("print-event", NotificationType::PrintEvent),
        ] {
            assert_eq!(raw.parse::<NotificationType>(), Ok(kind));
            assert_eq!(kind.as_str(), raw);
        }
    }

    #[test]
    fn test_relay_paths_are_distinct() {
        let paths: std::collections::HashSet<_> = [
            NotificationType::Order,
            NotificationType::Booking,
            NotificationType::StatusUpdate,
            NotificationType::PrintEvent,
        ]
        .iter()
        .map(|t| t.relay_path())
        .collect();
        assert_eq!(paths.len(), 4);
    }

    #[test]
    fn test_order_without_location_gets_default() {
        let event = request(json!({ "type": "order", "data": { "orderId": 42 } }))
            .into_event("main")
            .unwrap();
        assert_eq!(event.kind, NotificationType::Order);
        assert_eq!(event.payload["location"], json!("main"));
        assert_eq!(event.payload["orderId"], json!(42));
    }

    #[test]
    fn test_null_location_gets_default() {
        let event = request(json!({ "type": "booking", "data": { "location": null } }))
            .into_event("main")
            .unwrap();
        assert_eq!(event.payload["location"], json!("main"));
    }

    #[test]
    fn test_existing_location_kept() {
        let event = request(json!({ "type": "order", "data": { "location": "kamppi" } }))
            .into_event("main")
            .unwrap();
        assert_eq!(event.payload["location"], json!("kamppi"));
    }

    #[test]
    fn test_status_update_not_given_location() {
        let event = request(json!({ "type": "status-update", "data": { "status": "ready" } }))
            .into_event("main")
            .unwrap();
        assert!(!event.payload.contains_key("location"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = request(json!({ "type": "bogus", "data": {} }))
            .into_event("main")
            .unwrap_err();
        assert_eq!(err, NotifyRequestError::UnknownType("bogus".to_string()));
    }

    #[test]
    fn test_missing_type_rejected() {
        let err = request(json!({ "data": {} })).into_event("main").unwrap_err();
        assert_eq!(err, NotifyRequestError::MissingType);
    }

    #[test]
    fn test_non_object_data_rejected() {
        let err = request(json!({ "type": "order", "data": [1, 2] }))
            .into_event("main")
            .unwrap_err();
        assert_eq!(err, NotifyRequestError::InvalidData);

        let err = request(json!({ "type": "order" })).into_event("main").unwrap_err();
        assert_eq!(err, NotifyRequestError::InvalidData);
    }
}
