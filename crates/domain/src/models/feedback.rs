//! Customer feedback domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::validation::{validate_email_format, validate_not_blank};

/// Status assigned to every new submission.
pub const STATUS_NEW: &str = "new";

/// Maximum accepted message length (mirrors the validation attribute).
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// Kind of feedback a visitor can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Feedback,
    Bug,
    Suggestion,
}

impl FeedbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Feedback => "feedback",
            FeedbackType::Bug => "bug",
            FeedbackType::Suggestion => "suggestion",
        }
    }
}

impl FromStr for FeedbackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feedback" => Ok(FeedbackType::Feedback),
            "bug" => Ok(FeedbackType::Bug),
            "suggestion" => Ok(FeedbackType::Suggestion),
            _ => Err(format!("Unknown feedback type: {}", s)),
        }
    }
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored feedback submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: String,
    pub status: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Feedback ready to be stored; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub feedback_type: FeedbackType,
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: String,
    pub status: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Request payload for submitting feedback.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"), length(max = 5000, message = "Message must be at most 5000 characters"))]
    pub message: String,
}

/// Empty strings are treated as "no email given".
fn validate_optional_email(email: &str) -> Result<(), validator::ValidationError> {
    if email.trim().is_empty() {
        Ok(())
    } else {
        validate_email_format(email.trim())
    }
}

impl CreateFeedbackRequest {
    /// Normalizes the request into a storable submission.
    pub fn into_new_feedback(
        self,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> NewFeedback {
        let trimmed = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        NewFeedback {
            feedback_type: self.feedback_type,
            name: trimmed(self.name),
            email: trimmed(self.email),
            message: self.message.trim().to_string(),
            status: STATUS_NEW.to_string(),
            user_agent,
            ip_address,
        }
    }
}

/// Response for a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFeedbackResponse {
    pub success: bool,
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> CreateFeedbackRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_feedback() {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();
        let request = parse(json!({
            "type": "feedback",
            "name": name,
            "email": email,
            "message": "ok message"
        }));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_whitespace_message_rejected() {
        let request = parse(json!({ "type": "feedback", "message": "   " }));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_missing_message_rejected() {
        let request = parse(json!({ "type": "bug" }));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_type_rejected_by_serde() {
        let result: Result<CreateFeedbackRequest, _> =
            serde_json::from_value(json!({ "type": "rant", "message": "hi" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let request = parse(json!({
            "type": "suggestion",
            "email": "not-an-email",
            "message": "More wasabi"
        }));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_email_allowed() {
        let request = parse(json!({
            "type": "suggestion",
            "email": "",
            "message": "More wasabi"
        }));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_too_long_message_rejected() {
        let request = parse(json!({
            "type": "feedback",
            "message": "a".repeat(MAX_MESSAGE_LENGTH + 1)
        }));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_into_new_feedback_trims() {
        let request = parse(json!({
            "type": "bug",
            "name": "  ",
            "email": " user@example.com ",
            "message": "  Menu page is blank  "
        }));
        let feedback =
            request.into_new_feedback(Some("Mozilla/5.0".to_string()), Some("10.0.0.1".to_string()));
        assert_eq!(feedback.feedback_type, FeedbackType::Bug);
        assert_eq!(feedback.name, None);
        assert_eq!(feedback.email.as_deref(), Some("user@example.com"));
        assert_eq!(feedback.message, "Menu page is blank");
        assert_eq!(feedback.status, STATUS_NEW);
        assert_eq!(feedback.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_feedback_type_round_trip() {
        for t in [FeedbackType::Feedback, FeedbackType::Bug, FeedbackType::Suggestion] {
            assert_eq!(t.as_str().parse::<FeedbackType>(), Ok(t));
        }
    }
}
