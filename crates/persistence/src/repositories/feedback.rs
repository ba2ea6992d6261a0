//! Feedback repository.

use async_trait::async_trait;
use sqlx::PgPool;

use domain::models::{FeedbackEntry, NewFeedback};
use domain::services::{FeedbackStore, StoreError};

use crate::entities::FeedbackEntity;
use crate::metrics::QueryTimer;
use crate::repositories::store_error;

/// Repository for the feedback table.
#[derive(Clone)]
pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackStore for FeedbackRepository {
    async fn create(&self, feedback: NewFeedback) -> Result<FeedbackEntry, StoreError> {
        let timer = QueryTimer::new("create_feedback");
        let row = sqlx::query_as::<_, FeedbackEntity>(
            r#"
            INSERT INTO feedback (type, name, email, message, status, user_agent, ip_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, type, name, email, message, status, user_agent, ip_address, created_at
            "#,
        )
        .bind(feedback.feedback_type.as_str())
        .bind(&feedback.name)
        .bind(&feedback.email)
        .bind(&feedback.message)
        .bind(&feedback.status)
        .bind(&feedback.user_agent)
        .bind(&feedback.ip_address)
        .fetch_one(&self.pool)
        .await;

        timer.finish(row).map(Into::into).map_err(store_error)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<FeedbackEntry>, StoreError> {
        let timer = QueryTimer::new("list_recent_feedback");
        let rows = sqlx::query_as::<_, FeedbackEntity>(
            r#"
            SELECT id, type, name, email, message, status, user_agent, ip_address, created_at
            FROM feedback
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await;

        timer
            .finish(rows)
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(store_error)
    }
}
