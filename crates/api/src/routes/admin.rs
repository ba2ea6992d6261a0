//! Admin operations API routes.
//!
//! Email settings management and the feedback inbox. These routes sit behind
//! the admin key middleware.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use domain::models::email_setting::{
    EmailSettingsView, SetSendGridKeyRequest, UpdateEmailSettingsRequest,
};
use domain::models::{EmailProvider, EmailSettingsSnapshot, FeedbackEntry};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, QueryParams};

const DEFAULT_FEEDBACK_LIMIT: i64 = 50;
const MAX_FEEDBACK_LIMIT: i64 = 200;

/// Settings as returned to the admin panel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSettingsResponse {
    pub success: bool,
    pub settings: EmailSettingsView,
    /// Provider the next send would use.
    pub active_provider: Option<EmailProvider>,
    /// Why no provider can be used, if that is the case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_error: Option<String>,
}

async fn settings_response(state: &AppState) -> Result<Json<EmailSettingsResponse>, ApiError> {
    let settings = state.settings.list().await?;
    let snapshot = EmailSettingsSnapshot::from_settings(&settings);

    let (active_provider, provider_error) = match state.email.resolve(&snapshot) {
        Ok(provider) => (Some(provider), None),
        Err(e) => (None, Some(e.to_string())),
    };

    Ok(Json(EmailSettingsResponse {
        success: true,
        settings: EmailSettingsView::from_settings(&settings),
        active_provider,
        provider_error,
    }))
}

/// POST /api/admin/set-sendgrid-key
///
/// Stores the SendGrid key (and sender override), activating SendGrid unless
/// `activate` is false. Repeating the same request leaves the same state.
pub async fn set_sendgrid_key(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SetSendGridKeyRequest>,
) -> Result<Json<EmailSettingsResponse>, ApiError> {
    request.validate()?;

    let pairs = request.to_settings();
    state.settings.upsert_many(&pairs).await?;

    info!(
        keys = pairs.len(),
        activated = request.activate,
        "SendGrid API key updated"
    );

    settings_response(&state).await
}

/// GET /api/admin/email-settings
pub async fn get_email_settings(
    State(state): State<AppState>,
) -> Result<Json<EmailSettingsResponse>, ApiError> {
    settings_response(&state).await
}

/// PUT /api/admin/email-settings
pub async fn update_email_settings(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateEmailSettingsRequest>,
) -> Result<Json<EmailSettingsResponse>, ApiError> {
    request.validate()?;

    let pairs = request.to_settings();
    if pairs.is_empty() {
        return Err(ApiError::Validation(
            "At least one of provider, adminEmail, fromEmail or fromName is required".to_string(),
        ));
    }

    state.settings.upsert_many(&pairs).await?;

    let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
    info!(keys = ?keys, "Email settings updated");

    settings_response(&state).await
}

#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    pub limit: Option<i64>,
}

impl FeedbackQuery {
    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_FEEDBACK_LIMIT)
            .clamp(1, MAX_FEEDBACK_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackListResponse {
    pub success: bool,
    pub count: usize,
    pub feedback: Vec<FeedbackEntry>,
}

/// GET /api/admin/feedback
///
/// Most recent submissions first.
pub async fn list_feedback(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<FeedbackQuery>,
) -> Result<Json<FeedbackListResponse>, ApiError> {
    let feedback = state.feedback.list_recent(query.limit()).await?;

    Ok(Json(FeedbackListResponse {
        success: true,
        count: feedback.len(),
        feedback,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_limit_clamped() {
        assert_eq!(FeedbackQuery { limit: None }.limit(), 50);
        assert_eq!(FeedbackQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(FeedbackQuery { limit: Some(-5) }.limit(), 1);
        assert_eq!(FeedbackQuery { limit: Some(75) }.limit(), 75);
        assert_eq!(FeedbackQuery { limit: Some(10_000) }.limit(), 200);
    }
}
