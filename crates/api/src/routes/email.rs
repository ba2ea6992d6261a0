//! Generic email endpoint for operators.
//!
//! `POST /api/email/send` takes an `action` and routes through whichever
//! provider is active for this request.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use domain::models::email::{EmailAction, SendEmailResponse};
use domain::models::{EmailProvider, EmailTemplate};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::JsonBody;
use crate::services::email_templates::render;
use crate::services::SendOutcome;

/// Result of a connection check.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub provider: EmailProvider,
    pub message: String,
}

pub(crate) fn sent(outcome: SendOutcome) -> Json<SendEmailResponse> {
    Json(SendEmailResponse {
        success: true,
        message_id: outcome.message_id,
        provider: outcome.provider.to_string(),
    })
}

pub(crate) fn verified(provider: EmailProvider) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        success: true,
        provider,
        message: format!("{} connection verified", provider),
    })
}

/// Either a send result or a verification result.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EmailActionResponse {
    Sent(SendEmailResponse),
    Verified(VerifyResponse),
}

impl From<Json<SendEmailResponse>> for EmailActionResponse {
    fn from(Json(response): Json<SendEmailResponse>) -> Self {
        EmailActionResponse::Sent(response)
    }
}

impl From<Json<VerifyResponse>> for EmailActionResponse {
    fn from(Json(response): Json<VerifyResponse>) -> Self {
        EmailActionResponse::Verified(response)
    }
}

/// POST /api/email/send
pub async fn send_email(
    State(state): State<AppState>,
    JsonBody(action): JsonBody<EmailAction>,
) -> Result<Json<EmailActionResponse>, ApiError> {
    let response: EmailActionResponse = match action {
        EmailAction::Test(request) => {
            request.validate()?;
            let dispatch = state.email.dispatch().await?;
            let message = render(&EmailTemplate::Test).into_message(request.to.trim());
            sent(dispatch.send(&message).await?).into()
        }
        EmailAction::Verify => {
            let dispatch = state.email.dispatch().await?;
            verified(dispatch.verify().await?).into()
        }
        EmailAction::Send(request) => {
            request.validate()?;
            let dispatch = state.email.dispatch().await?;
            sent(dispatch.send(&request.into_message()).await?).into()
        }
        EmailAction::SendTemplate(request) => {
            request.validate()?;
            let template = EmailTemplate::from_variables(&request.template, request.variables)?;
            let dispatch = state.email.dispatch().await?;
            let message = render(&template).into_message(request.to.trim());
            let outcome = dispatch.send(&message).await?;
            info!(template = template.name(), provider = %outcome.provider, "Template email sent");
            sent(outcome).into()
        }
    };

    Ok(Json(response))
}
