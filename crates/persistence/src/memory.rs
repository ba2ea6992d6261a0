//! In-memory store implementations.
//!
//! Used by the test suite and for running the service without a database.
//! Semantics match the Postgres repositories: upserts are last-writer-wins
//! per key and feedback is returned newest first.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use domain::models::{EmailSetting, FeedbackEntry, NewFeedback};
use domain::services::{EmailSettingStore, FeedbackStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryEmailSettingStore {
    settings: RwLock<BTreeMap<String, EmailSetting>>,
}

impl InMemoryEmailSettingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given pairs.
    pub fn with_settings(pairs: &[(&str, &str)]) -> Self {
        let now = Utc::now();
        let settings = pairs
            .iter()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    EmailSetting {
                        setting_key: k.to_string(),
                        setting_value: v.to_string(),
                        updated_at: now,
                    },
                )
            })
            .collect();
        Self {
            settings: RwLock::new(settings),
        }
    }
}

fn put(map: &mut BTreeMap<String, EmailSetting>, key: &str, value: &str) -> EmailSetting {
    let setting = EmailSetting {
        setting_key: key.to_string(),
        setting_value: value.to_string(),
        updated_at: Utc::now(),
    };
    map.insert(key.to_string(), setting.clone());
    setting
}

#[async_trait]
impl EmailSettingStore for InMemoryEmailSettingStore {
    async fn list(&self) -> Result<Vec<EmailSetting>, StoreError> {
        Ok(self.settings.read().await.values().cloned().collect())
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<EmailSetting, StoreError> {
        Ok(put(&mut *self.settings.write().await, key, value))
    }

    async fn upsert_many(
        &self,
        pairs: &[(String, String)],
    ) -> Result<Vec<EmailSetting>, StoreError> {
        let mut map = self.settings.write().await;
        Ok(pairs.iter().map(|(k, v)| put(&mut map, k, v)).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFeedbackStore {
    entries: RwLock<Vec<FeedbackEntry>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn create(&self, feedback: NewFeedback) -> Result<FeedbackEntry, StoreError> {
        let entry = FeedbackEntry {
            id: Uuid::new_v4(),
            feedback_type: feedback.feedback_type,
            name: feedback.name,
            email: feedback.email,
            message: feedback.message,
            status: feedback.status,
            user_agent: feedback.user_agent,
            ip_address: feedback.ip_address,
            created_at: Utc::now(),
        };
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<FeedbackEntry>, StoreError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
