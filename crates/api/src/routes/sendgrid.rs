//! SendGrid endpoint.
//!
//! Same actions as the generic email endpoint, but always through SendGrid
//! no matter which provider is active.

use axum::{extract::State, Json};
use tracing::info;
use validator::Validate;

use domain::models::email::SendGridAction;
use domain::models::EmailTemplate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::JsonBody;
use crate::routes::email::{sent, verified, EmailActionResponse};
use crate::services::email_templates::render;

/// POST /api/sendgrid
pub async fn sendgrid_action(
    State(state): State<AppState>,
    JsonBody(action): JsonBody<SendGridAction>,
) -> Result<Json<EmailActionResponse>, ApiError> {
    let action_name = action.name();

    let response: EmailActionResponse = match action {
        SendGridAction::TestConnection => {
            let dispatch = state.email.sendgrid_dispatch().await?;
            verified(dispatch.verify().await?).into()
        }
        SendGridAction::SendTest(request) => {
            request.validate()?;
            let dispatch = state.email.sendgrid_dispatch().await?;
            let message = render(&EmailTemplate::Test).into_message(request.to.trim());
            sent(dispatch.send(&message).await?).into()
        }
        SendGridAction::SendOrderConfirmation(request) => {
            request.validate()?;
            let dispatch = state.email.sendgrid_dispatch().await?;
            let message = render(&EmailTemplate::OrderConfirmation(request.order))
                .into_message(request.to.trim());
            sent(dispatch.send(&message).await?).into()
        }
        SendGridAction::SendBookingConfirmation(request) => {
            request.validate()?;
            let booking = request.booking;
            let to = booking.customer_email.trim().to_string();
            let to_name = booking.customer_name.trim().to_string();
            let dispatch = state.email.sendgrid_dispatch().await?;
            let message = render(&EmailTemplate::BookingConfirmation(booking))
                .into_message(&to)
                .with_to_name(to_name);
            sent(dispatch.send(&message).await?).into()
        }
        SendGridAction::SendContactNotification(request) => {
            request.validate()?;
            let reply_to = request.contact.email.trim().to_string();
            let dispatch = state.email.sendgrid_dispatch().await?;
            let to = request
                .to
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| dispatch.admin_recipient())
                .to_string();
            let message = render(&EmailTemplate::ContactNotification(request.contact))
                .into_message(&to)
                .with_reply_to(reply_to);
            sent(dispatch.send(&message).await?).into()
        }
    };

    info!(action = action_name, "SendGrid action completed");
    Ok(Json(response))
}
