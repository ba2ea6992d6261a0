//! Feedback entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{FeedbackEntry, FeedbackType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the feedback table.
#[derive(Debug, Clone, FromRow)]
pub struct FeedbackEntity {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    pub feedback_type: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: String,
    pub status: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FeedbackEntity> for FeedbackEntry {
    fn from(entity: FeedbackEntity) -> Self {
        Self {
            id: entity.id,
            // The check constraint only admits known types.
            feedback_type: entity
                .feedback_type
                .parse()
                .unwrap_or(FeedbackType::Feedback),
            name: entity.name,
            email: entity.email,
            message: entity.message,
            status: entity.status,
            user_agent: entity.user_agent,
            ip_address: entity.ip_address,
            created_at: entity.created_at,
        }
    }
}
