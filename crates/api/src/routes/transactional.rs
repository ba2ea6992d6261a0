//! Transactional emails triggered by the website's forms.
//!
//! Each request is validated before the settings store or any email
//! backend is touched.

use axum::{extract::State, Json};
use validator::Validate;

use domain::models::email::{
    BookingConfirmation, ContactNotification, SendEmailResponse, WelcomeEmail,
};
use domain::models::EmailTemplate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::JsonBody;
use crate::routes::email::sent;
use crate::services::email_templates::render;

/// POST /api/send-booking-confirmation
pub async fn send_booking_confirmation(
    State(state): State<AppState>,
    JsonBody(booking): JsonBody<BookingConfirmation>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    booking.validate()?;

    let to = booking.customer_email.trim().to_string();
    let to_name = booking.customer_name.trim().to_string();
    let message = render(&EmailTemplate::BookingConfirmation(booking))
        .into_message(&to)
        .with_to_name(to_name);

    let dispatch = state.email.dispatch().await?;
    Ok(sent(dispatch.send(&message).await?))
}

/// POST /api/send-contact-notification
///
/// Goes to the stored admin address, falling back to `email.admin_email`.
/// Replies reach the customer directly.
pub async fn send_contact_notification(
    State(state): State<AppState>,
    JsonBody(contact): JsonBody<ContactNotification>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    contact.validate()?;

    let reply_to = contact.email.trim().to_string();
    let rendered = render(&EmailTemplate::ContactNotification(contact));

    let dispatch = state.email.dispatch().await?;
    let message = rendered
        .into_message(dispatch.admin_recipient())
        .with_reply_to(reply_to);
    Ok(sent(dispatch.send(&message).await?))
}

/// POST /api/send-welcome-email
pub async fn send_welcome_email(
    State(state): State<AppState>,
    JsonBody(welcome): JsonBody<WelcomeEmail>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    welcome.validate()?;

    let to = welcome.customer_email.trim().to_string();
    let to_name = welcome.customer_name.trim().to_string();
    let message = render(&EmailTemplate::Welcome(welcome))
        .into_message(&to)
        .with_to_name(to_name);

    let dispatch = state.email.dispatch().await?;
    Ok(sent(dispatch.send(&message).await?))
}
