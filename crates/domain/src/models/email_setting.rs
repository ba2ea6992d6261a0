//! Email settings domain models.
//!
//! The `email_settings` table is a plain key/value store. It decides which
//! email provider is active and holds the SendGrid credentials entered from
//! the admin panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use validator::Validate;

use shared::masking::mask_secret;
use shared::validation::validate_email_format;

/// Known setting keys.
pub mod keys {
    /// Active provider: `smtp` or `sendgrid`. Absent means automatic selection.
    pub const EMAIL_PROVIDER: &str = "email_provider";
    pub const SENDGRID_API_KEY: &str = "sendgrid_api_key";
    pub const SENDGRID_FROM_EMAIL: &str = "sendgrid_from_email";
    pub const SENDGRID_FROM_NAME: &str = "sendgrid_from_name";
    /// Recipient of contact form notifications.
    pub const ADMIN_EMAIL: &str = "admin_email";
}

/// Prefix every SendGrid API key starts with.
pub const SENDGRID_KEY_PREFIX: &str = "SG.";

/// A single row of the settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSetting {
    pub setting_key: String,
    pub setting_value: String,
    pub updated_at: DateTime<Utc>,
}

/// Email delivery backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    Smtp,
    #[serde(rename = "sendgrid")]
    SendGrid,
    /// Logs instead of sending; used when email delivery is disabled.
    Console,
}

impl EmailProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailProvider::Smtp => "smtp",
            EmailProvider::SendGrid => "sendgrid",
            EmailProvider::Console => "console",
        }
    }
}

impl FromStr for EmailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smtp" => Ok(EmailProvider::Smtp),
            "sendgrid" => Ok(EmailProvider::SendGrid),
            "console" => Ok(EmailProvider::Console),
            _ => Err(format!("Unknown email provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of the settings store.
///
/// Taken once per request so that a single send never mixes values from two
/// different versions of the settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailSettingsSnapshot {
    /// Provider explicitly chosen by an admin. `None` if unset or unparseable.
    pub provider: Option<EmailProvider>,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_from_email: Option<String>,
    pub sendgrid_from_name: Option<String>,
    pub admin_email: Option<String>,
}

impl EmailSettingsSnapshot {
    /// Builds a snapshot from raw settings rows. Blank values count as unset.
    pub fn from_settings(settings: &[EmailSetting]) -> Self {
        let map: HashMap<&str, &str> = settings
            .iter()
            .map(|s| (s.setting_key.as_str(), s.setting_value.trim()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let owned = |key: &str| map.get(key).map(|v| v.to_string());

        Self {
            provider: map
                .get(keys::EMAIL_PROVIDER)
                .and_then(|v| v.parse::<EmailProvider>().ok())
                .filter(|p| *p != EmailProvider::Console),
            sendgrid_api_key: owned(keys::SENDGRID_API_KEY),
            sendgrid_from_email: owned(keys::SENDGRID_FROM_EMAIL),
            sendgrid_from_name: owned(keys::SENDGRID_FROM_NAME),
            admin_email: owned(keys::ADMIN_EMAIL),
        }
    }
}

/// Request payload for storing a SendGrid API key.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetSendGridKeyRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_sendgrid_key"))]
    pub api_key: String,

    #[validate(custom(function = "validate_email_format"))]
    pub from_email: Option<String>,

    #[validate(length(min = 1, max = 100, message = "fromName must be 1-100 characters"))]
    pub from_name: Option<String>,

    /// Also switch the active provider to SendGrid.
    #[serde(default = "default_activate")]
    pub activate: bool,
}

fn default_activate() -> bool {
    true
}

impl SetSendGridKeyRequest {
    /// Key/value pairs to upsert, in a stable order.
    pub fn to_settings(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            keys::SENDGRID_API_KEY.to_string(),
            self.api_key.trim().to_string(),
        )];
        if let Some(email) = &self.from_email {
            pairs.push((keys::SENDGRID_FROM_EMAIL.to_string(), email.trim().to_string()));
        }
        if let Some(name) = &self.from_name {
            pairs.push((keys::SENDGRID_FROM_NAME.to_string(), name.trim().to_string()));
        }
        if self.activate {
            pairs.push((
                keys::EMAIL_PROVIDER.to_string(),
                EmailProvider::SendGrid.as_str().to_string(),
            ));
        }
        pairs
    }
}

fn validate_sendgrid_key(key: &str) -> Result<(), validator::ValidationError> {
    let key = key.trim();
    if key.is_empty() {
        let mut err = validator::ValidationError::new("required");
        err.message = Some("apiKey is required".into());
        return Err(err);
    }
    if !key.starts_with(SENDGRID_KEY_PREFIX) {
        let mut err = validator::ValidationError::new("sendgrid_key_format");
        err.message = Some("SendGrid API keys start with \"SG.\"".into());
        return Err(err);
    }
    Ok(())
}

/// Request payload for updating general email settings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmailSettingsRequest {
    #[validate(custom(function = "validate_provider_name"))]
    pub provider: Option<String>,

    #[validate(custom(function = "validate_email_format"))]
    pub admin_email: Option<String>,

    #[validate(custom(function = "validate_email_format"))]
    pub from_email: Option<String>,

    #[validate(length(min = 1, max = 100, message = "fromName must be 1-100 characters"))]
    pub from_name: Option<String>,
}

fn validate_provider_name(provider: &str) -> Result<(), validator::ValidationError> {
    match provider.parse::<EmailProvider>() {
        Ok(EmailProvider::Smtp) | Ok(EmailProvider::SendGrid) => Ok(()),
        _ => {
            let mut err = validator::ValidationError::new("provider");
            err.message = Some("provider must be \"smtp\" or \"sendgrid\"".into());
            Err(err)
        }
    }
}

impl UpdateEmailSettingsRequest {
    /// Key/value pairs for the fields present in the request.
    pub fn to_settings(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(provider) = &self.provider {
            pairs.push((
                keys::EMAIL_PROVIDER.to_string(),
                provider.trim().to_lowercase(),
            ));
        }
        if let Some(email) = &self.admin_email {
            pairs.push((keys::ADMIN_EMAIL.to_string(), email.trim().to_string()));
        }
        if let Some(email) = &self.from_email {
            pairs.push((keys::SENDGRID_FROM_EMAIL.to_string(), email.trim().to_string()));
        }
        if let Some(name) = &self.from_name {
            pairs.push((keys::SENDGRID_FROM_NAME.to_string(), name.trim().to_string()));
        }
        pairs
    }
}

/// Settings as shown to admins. Secrets are masked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSettingsView {
    pub provider: Option<EmailProvider>,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_from_email: Option<String>,
    pub sendgrid_from_name: Option<String>,
    pub admin_email: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EmailSettingsView {
    pub fn from_settings(settings: &[EmailSetting]) -> Self {
        let snapshot = EmailSettingsSnapshot::from_settings(settings);
        Self {
            provider: snapshot.provider,
            sendgrid_api_key: snapshot.sendgrid_api_key.as_deref().map(mask_secret),
            sendgrid_from_email: snapshot.sendgrid_from_email,
            sendgrid_from_name: snapshot.sendgrid_from_name,
            admin_email: snapshot.admin_email,
            updated_at: settings.iter().map(|s| s.updated_at).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(key: &str, value: &str) -> EmailSetting {
        EmailSetting {
            setting_key: key.to_string(),
            setting_value: value.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("smtp".parse::<EmailProvider>(), Ok(EmailProvider::Smtp));
        assert_eq!("SendGrid".parse::<EmailProvider>(), Ok(EmailProvider::SendGrid));
        assert!("mailgun".parse::<EmailProvider>().is_err());
    }

    #[test]
    fn test_provider_serialization() {
        assert_eq!(
            serde_json::to_string(&EmailProvider::SendGrid).unwrap(),
            "\"sendgrid\""
        );
        assert_eq!(serde_json::to_string(&EmailProvider::Smtp).unwrap(), "\"smtp\"");
    }

    #[test]
    fn test_snapshot_from_settings() {
        let settings = vec![
            setting(keys::EMAIL_PROVIDER, "sendgrid"),
            setting(keys::SENDGRID_API_KEY, "SG.key"),
            setting(keys::ADMIN_EMAIL, "  "),
            setting("unrelated", "value"),
        ];
        let snapshot = EmailSettingsSnapshot::from_settings(&settings);
        assert_eq!(snapshot.provider, Some(EmailProvider::SendGrid));
        assert_eq!(snapshot.sendgrid_api_key.as_deref(), Some("SG.key"));
        assert_eq!(snapshot.admin_email, None);
    }

    #[test]
    fn test_snapshot_ignores_unknown_provider() {
        let settings = vec![setting(keys::EMAIL_PROVIDER, "carrier-pigeon")];
        assert_eq!(EmailSettingsSnapshot::from_settings(&settings).provider, None);

        let settings = vec![setting(keys::EMAIL_PROVIDER, "console")];
        assert_eq!(EmailSettingsSnapshot::from_settings(&settings).provider, None);
    }

    #[test]
    fn test_set_sendgrid_key_validation() {
        let request: SetSendGridKeyRequest =
            serde_json::from_value(serde_json::json!({ "apiKey": "SG.valid" })).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.activate);

        let request: SetSendGridKeyRequest =
            serde_json::from_value(serde_json::json!({ "apiKey": "invalid" })).unwrap();
        assert!(request.validate().is_err());

        let request: SetSendGridKeyRequest =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(request.validate().is_err());

        let request: SetSendGridKeyRequest = serde_json::from_value(serde_json::json!({
            "apiKey": "SG.valid",
            "fromEmail": "not-an-email"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_set_sendgrid_key_to_settings() {
        let request: SetSendGridKeyRequest = serde_json::from_value(serde_json::json!({
            "apiKey": " SG.valid ",
            "fromEmail": "tilaukset@moisushi.fi",
            "activate": false
        }))
        .unwrap();
        assert_eq!(
            request.to_settings(),
            vec![
                (keys::SENDGRID_API_KEY.to_string(), "SG.valid".to_string()),
                (
                    keys::SENDGRID_FROM_EMAIL.to_string(),
                    "tilaukset@moisushi.fi".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_update_settings_rejects_unknown_provider() {
        let request = UpdateEmailSettingsRequest {
            provider: Some("console".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());

        let request = UpdateEmailSettingsRequest {
            provider: Some("SMTP".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
        assert_eq!(
            request.to_settings(),
            vec![(keys::EMAIL_PROVIDER.to_string(), "smtp".to_string())]
        );
    }

    #[test]
    fn test_view_masks_api_key() {
        let settings = vec![setting(keys::SENDGRID_API_KEY, "SG.abcdefghijklmnop")];
        let view = EmailSettingsView::from_settings(&settings);
        assert_eq!(view.sendgrid_api_key.as_deref(), Some("SG.abc...mnop"));
        assert!(view.updated_at.is_some());
    }
}
