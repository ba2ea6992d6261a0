//! Email setting entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::EmailSetting;
use sqlx::FromRow;

/// Database row mapping for the email_settings table.
#[derive(Debug, Clone, FromRow)]
pub struct EmailSettingEntity {
    pub setting_key: String,
    pub setting_value: String,
    pub updated_at: DateTime<Utc>,
}

impl From<EmailSettingEntity> for EmailSetting {
    fn from(entity: EmailSettingEntity) -> Self {
        Self {
            setting_key: entity.setting_key,
            setting_value: entity.setting_value,
            updated_at: entity.updated_at,
        }
    }
}
