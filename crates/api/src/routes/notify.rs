//! WebSocket relay notification route.

use axum::{extract::State, Json};
use serde::Serialize;

use domain::models::notification::NotifyRequest;
use domain::models::NotificationType;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::JsonBody;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub downstream_status: u16,
}

/// POST /api/websocket-notify
///
/// Validates the event type, fills in the default location for orders and
/// bookings, and forwards the payload to the relay.
pub async fn websocket_notify(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<NotifyRequest>,
) -> Result<Json<NotifyResponse>, ApiError> {
    let event = request.into_event(&state.config.notifications.default_location)?;
    let delivery = state.notifier.notify(&event).await?;

    Ok(Json(NotifyResponse {
        success: true,
        notification_type: event.kind,
        downstream_status: delivery.status,
    }))
}
