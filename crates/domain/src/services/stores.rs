//! Storage ports.
//!
//! The API layer talks to storage only through these traits. The Postgres
//! repositories and the in-memory stores in `persistence` implement them.

use async_trait::async_trait;

use crate::models::{EmailSetting, FeedbackEntry, NewFeedback};

/// Errors surfaced by a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store of email settings.
#[async_trait]
pub trait EmailSettingStore: Send + Sync {
    /// All settings rows.
    async fn list(&self) -> Result<Vec<EmailSetting>, StoreError>;

    /// Inserts or replaces a single key.
    async fn upsert(&self, key: &str, value: &str) -> Result<EmailSetting, StoreError>;

    /// Inserts or replaces several keys at once. Either all pairs are
    /// written or none are.
    async fn upsert_many(&self, pairs: &[(String, String)])
        -> Result<Vec<EmailSetting>, StoreError>;

    /// Cheap connectivity check used by the readiness endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Append-only store of feedback submissions.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn create(&self, feedback: NewFeedback) -> Result<FeedbackEntry, StoreError>;

    /// Newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<FeedbackEntry>, StoreError>;
}
