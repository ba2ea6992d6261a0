//! Transactional email models.
//!
//! Covers the outgoing message itself, the typed variables of every template
//! and the request bodies of the email endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::validation::{validate_email_format, validate_not_blank};

/// A fully rendered message handed to an email backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub reply_to: Option<String>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            to_name: None,
            subject: subject.into(),
            text: None,
            html: None,
            reply_to: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_to_name(mut self, name: impl Into<String>) -> Self {
        self.to_name = Some(name.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

/// Template names accepted by `send_template`.
pub mod templates {
    pub const WELCOME: &str = "welcome";
    pub const BOOKING_CONFIRMATION: &str = "booking_confirmation";
    pub const CONTACT_NOTIFICATION: &str = "contact_notification";
    pub const ORDER_CONFIRMATION: &str = "order_confirmation";
    pub const TEST: &str = "test";

    pub const ALL: [&str; 5] = [
        WELCOME,
        BOOKING_CONFIRMATION,
        CONTACT_NOTIFICATION,
        ORDER_CONFIRMATION,
        TEST,
    ];
}

/// Request body of `POST /api/send-welcome-email`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeEmail {
    #[serde(default)]
    #[validate(custom(function = "validate_email_format"))]
    pub customer_email: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"), length(max = 100, message = "customerName must be at most 100 characters"))]
    pub customer_name: String,
}

/// Request body of `POST /api/send-booking-confirmation`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"), length(max = 100, message = "customerName must be at most 100 characters"))]
    pub customer_name: String,

    #[serde(default)]
    #[validate(custom(function = "validate_email_format"))]
    pub customer_email: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub booking_date: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub booking_time: String,

    #[validate(range(min = 1, max = 100, message = "guests must be between 1 and 100"))]
    pub guests: u32,

    pub phone: Option<String>,

    #[validate(length(max = 2000, message = "specialRequests must be at most 2000 characters"))]
    pub special_requests: Option<String>,

    pub location: Option<String>,
}

/// Request body of `POST /api/send-contact-notification`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ContactNotification {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"), length(max = 100, message = "name must be at most 100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "validate_email_format"))]
    pub email: String,

    pub phone: Option<String>,

    #[validate(length(max = 200, message = "subject must be at most 200 characters"))]
    pub subject: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"), length(max = 5000, message = "message must be at most 5000 characters"))]
    pub message: String,
}

/// One line of an order.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct OrderItem {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,

    /// Unit price in euros.
    #[validate(range(min = 0.0, message = "price cannot be negative"))]
    pub price: f64,
}

/// Variables of the order confirmation template.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub order_number: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub customer_name: String,

    #[validate(length(min = 1, message = "Order must contain at least one item"), nested)]
    pub items: Vec<OrderItem>,

    #[validate(range(min = 0.0, message = "totalAmount cannot be negative"))]
    pub total_amount: f64,

    /// `delivery` or `pickup`.
    pub delivery_method: Option<String>,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
}

/// A template together with its typed variables.
#[derive(Debug, Clone)]
pub enum EmailTemplate {
    Welcome(WelcomeEmail),
    BookingConfirmation(BookingConfirmation),
    ContactNotification(ContactNotification),
    OrderConfirmation(OrderConfirmation),
    Test,
}

/// Why template variables could not be used.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Unknown template: {0}. Expected one of {}", templates::ALL.join(", "))]
    UnknownTemplate(String),

    #[error("Invalid variables for template {template}: {message}")]
    InvalidVariables { template: String, message: String },
}

impl EmailTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            EmailTemplate::Welcome(_) => templates::WELCOME,
            EmailTemplate::BookingConfirmation(_) => templates::BOOKING_CONFIRMATION,
            EmailTemplate::ContactNotification(_) => templates::CONTACT_NOTIFICATION,
            EmailTemplate::OrderConfirmation(_) => templates::ORDER_CONFIRMATION,
            EmailTemplate::Test => templates::TEST,
        }
    }

    /// Parses and validates the variables of the named template.
    pub fn from_variables(
        name: &str,
        variables: serde_json::Value,
    ) -> Result<Self, TemplateError> {
        fn parse<T>(name: &str, variables: serde_json::Value) -> Result<T, TemplateError>
        where
            T: serde::de::DeserializeOwned + Validate,
        {
            let invalid = |message: String| TemplateError::InvalidVariables {
                template: name.to_string(),
                message,
            };
            let value: T = serde_json::from_value(variables).map_err(|e| invalid(e.to_string()))?;
            value.validate().map_err(|e| invalid(e.to_string()))?;
            Ok(value)
        }

        match name {
            templates::WELCOME => Ok(EmailTemplate::Welcome(parse(name, variables)?)),
            templates::BOOKING_CONFIRMATION => {
                Ok(EmailTemplate::BookingConfirmation(parse(name, variables)?))
            }
            templates::CONTACT_NOTIFICATION => {
                Ok(EmailTemplate::ContactNotification(parse(name, variables)?))
            }
            templates::ORDER_CONFIRMATION => {
                Ok(EmailTemplate::OrderConfirmation(parse(name, variables)?))
            }
            templates::TEST => Ok(EmailTemplate::Test),
            other => Err(TemplateError::UnknownTemplate(other.to_string())),
        }
    }
}

/// `{ to }` payload shared by the test actions.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TestEmailRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_email_format"))]
    pub to: String,
}

/// `send` action: an ad-hoc message.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_has_body"))]
pub struct SendEmailRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_email_format"))]
    pub to: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"), length(max = 998, message = "subject must be at most 998 characters"))]
    pub subject: String,

    pub text: Option<String>,
    pub html: Option<String>,

    #[validate(custom(function = "validate_email_format"))]
    pub reply_to: Option<String>,
}

fn validate_has_body(request: &SendEmailRequest) -> Result<(), validator::ValidationError> {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    if present(&request.text) || present(&request.html) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("body_required");
        err.message = Some("Either text or html is required".into());
        Err(err)
    }
}

impl SendEmailRequest {
    pub fn into_message(self) -> EmailMessage {
        EmailMessage {
            to: self.to.trim().to_string(),
            to_name: None,
            subject: self.subject,
            text: self.text.filter(|s| !s.trim().is_empty()),
            html: self.html.filter(|s| !s.trim().is_empty()),
            reply_to: self.reply_to,
        }
    }
}

/// `send_template` action.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendTemplateRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_email_format"))]
    pub to: String,

    pub template: String,

    #[serde(default)]
    pub variables: serde_json::Value,
}

/// Body of `POST /api/email/send`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EmailAction {
    Test(TestEmailRequest),
    Verify,
    Send(SendEmailRequest),
    SendTemplate(SendTemplateRequest),
}

/// `send_order_confirmation` action of the SendGrid endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderConfirmationRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_email_format"))]
    pub to: String,

    #[validate(nested)]
    pub order: OrderConfirmation,
}

/// `send_booking_confirmation` action of the SendGrid endpoint.
/// The booking's own `customerEmail` is the recipient.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingConfirmationRequest {
    #[validate(nested)]
    pub booking: BookingConfirmation,
}

/// `send_contact_notification` action of the SendGrid endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactNotificationRequest {
    /// Overrides the stored admin address.
    #[validate(custom(function = "validate_email_format"))]
    pub to: Option<String>,

    #[validate(nested)]
    pub contact: ContactNotification,
}

/// Body of `POST /api/sendgrid`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SendGridAction {
    TestConnection,
    SendTest(TestEmailRequest),
    SendOrderConfirmation(OrderConfirmationRequest),
    SendBookingConfirmation(BookingConfirmationRequest),
    SendContactNotification(ContactNotificationRequest),
}

impl SendGridAction {
    pub fn name(&self) -> &'static str {
        match self {
            SendGridAction::TestConnection => "test_connection",
            SendGridAction::SendTest(_) => "send_test",
            SendGridAction::SendOrderConfirmation(_) => "send_order_confirmation",
            SendGridAction::SendBookingConfirmation(_) => "send_booking_confirmation",
            SendGridAction::SendContactNotification(_) => "send_contact_notification",
        }
    }
}

/// Successful send as reported to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub message_id: String,
    pub provider: String,
}
