//! Email settings repository.

use async_trait::async_trait;
use sqlx::PgPool;

use domain::models::EmailSetting;
use domain::services::{EmailSettingStore, StoreError};

use crate::entities::EmailSettingEntity;
use crate::metrics::QueryTimer;
use crate::repositories::store_error;

/// Repository for the email_settings table.
#[derive(Clone)]
pub struct EmailSettingRepository {
    pool: PgPool,
}

impl EmailSettingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const UPSERT_SQL: &str = r#"
    INSERT INTO email_settings (setting_key, setting_value, updated_at)
    VALUES ($1, $2, NOW())
    ON CONFLICT (setting_key) DO UPDATE SET
        setting_value = EXCLUDED.setting_value,
        updated_at = NOW()
    RETURNING setting_key, setting_value, updated_at
"#;

#[async_trait]
impl EmailSettingStore for EmailSettingRepository {
    async fn list(&self) -> Result<Vec<EmailSetting>, StoreError> {
        let timer = QueryTimer::new("list_email_settings");
        let rows = sqlx::query_as::<_, EmailSettingEntity>(
            r#"
            SELECT setting_key, setting_value, updated_at
            FROM email_settings
            ORDER BY setting_key
            "#,
        )
        .fetch_all(&self.pool)
        .await;

        timer
            .finish(rows)
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(store_error)
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<EmailSetting, StoreError> {
        let timer = QueryTimer::new("upsert_email_setting");
        let row = sqlx::query_as::<_, EmailSettingEntity>(UPSERT_SQL)
            .bind(key)
            .bind(value)
            .fetch_one(&self.pool)
            .await;

        timer.finish(row).map(Into::into).map_err(store_error)
    }

    async fn upsert_many(
        &self,
        pairs: &[(String, String)],
    ) -> Result<Vec<EmailSetting>, StoreError> {
        let timer = QueryTimer::new("upsert_email_settings_batch");
        let result: Result<Vec<EmailSettingEntity>, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let mut rows = Vec::with_capacity(pairs.len());
            for (key, value) in pairs {
                let row = sqlx::query_as::<_, EmailSettingEntity>(UPSERT_SQL)
                    .bind(key)
                    .bind(value)
                    .fetch_one(&mut *tx)
                    .await?;
                rows.push(row);
            }
            tx.commit().await?;
            Ok(rows)
        }
        .await;

        timer
            .finish(result)
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(store_error)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::db::ping(&self.pool).await.map_err(store_error)
    }
}
