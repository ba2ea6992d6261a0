//! Email provider selection.
//!
//! Decides which backend handles a send, given one snapshot of the settings
//! store and what the deployment has configured. Order of precedence:
//! 1. Delivery disabled: console
//! 2. Provider explicitly set to `smtp`: SMTP, if a relay is configured
//! 3. Provider explicitly set to `sendgrid`: SendGrid with the stored key,
//!    falling back to the configured key
//! 4. Nothing set: SendGrid if any key exists, otherwise SMTP

use crate::models::{EmailProvider, EmailSettingsSnapshot};

/// What the running deployment offers, independent of stored settings.
#[derive(Debug, Clone, Default)]
pub struct ProviderEnvironment {
    pub email_enabled: bool,
    pub smtp_configured: bool,
    /// SendGrid key from configuration or the environment.
    pub sendgrid_api_key: Option<String>,
}

/// The resolved backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderChoice {
    Console,
    Smtp,
    SendGrid { api_key: String },
}

impl ProviderChoice {
    pub fn provider(&self) -> EmailProvider {
        match self {
            ProviderChoice::Console => EmailProvider::Console,
            ProviderChoice::Smtp => EmailProvider::Smtp,
            ProviderChoice::SendGrid { .. } => EmailProvider::SendGrid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("SMTP is selected but no SMTP host is configured")]
    SmtpNotConfigured,

    #[error("SendGrid is selected but no API key is stored or configured")]
    SendGridKeyMissing,

    #[error("No email provider is configured")]
    NoProviderConfigured,
}

/// Stored key first, then the configured one. Blank keys count as absent.
pub fn resolve_sendgrid_key(
    snapshot: &EmailSettingsSnapshot,
    env: &ProviderEnvironment,
) -> Option<String> {
    snapshot
        .sendgrid_api_key
        .iter()
        .chain(env.sendgrid_api_key.iter())
        .map(|k| k.trim())
        .find(|k| !k.is_empty())
        .map(str::to_string)
}

/// Picks the backend for one send.
pub fn select_provider(
    snapshot: &EmailSettingsSnapshot,
    env: &ProviderEnvironment,
) -> Result<ProviderChoice, SelectionError> {
    if !env.email_enabled {
        return Ok(ProviderChoice::Console);
    }

    let sendgrid = || {
        resolve_sendgrid_key(snapshot, env).map(|api_key| ProviderChoice::SendGrid { api_key })
    };

    match snapshot.provider {
        Some(EmailProvider::Smtp) if env.smtp_configured => Ok(ProviderChoice::Smtp),
        Some(EmailProvider::Smtp) => Err(SelectionError::SmtpNotConfigured),
        Some(EmailProvider::SendGrid) => sendgrid().ok_or(SelectionError::SendGridKeyMissing),
        Some(EmailProvider::Console) | None => sendgrid()
            .or_else(|| env.smtp_configured.then_some(ProviderChoice::Smtp))
            .ok_or(SelectionError::NoProviderConfigured),
    }
}

/// SendGrid regardless of the stored provider choice.
pub fn force_sendgrid(
    snapshot: &EmailSettingsSnapshot,
    env: &ProviderEnvironment,
) -> Result<ProviderChoice, SelectionError> {
    resolve_sendgrid_key(snapshot, env)
        .map(|api_key| ProviderChoice::SendGrid { api_key })
        .ok_or(SelectionError::SendGridKeyMissing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(smtp: bool, key: Option<&str>) -> ProviderEnvironment {
        ProviderEnvironment {
            email_enabled: true,
            smtp_configured: smtp,
            sendgrid_api_key: key.map(str::to_string),
        }
    }

    fn snapshot(provider: Option<EmailProvider>, key: Option<&str>) -> EmailSettingsSnapshot {
        EmailSettingsSnapshot {
            provider,
            sendgrid_api_key: key.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_disabled_delivery_uses_console() {
        let mut e = env(true, Some("SG.env"));
        e.email_enabled = false;
        let choice = select_provider(&snapshot(Some(EmailProvider::SendGrid), None), &e).unwrap();
        assert_eq!(choice, ProviderChoice::Console);
    }

    #[test]
    fn test_explicit_smtp() {
        let s = snapshot(Some(EmailProvider::Smtp), Some("SG.stored"));
        assert_eq!(select_provider(&s, &env(true, None)), Ok(ProviderChoice::Smtp));
        assert_eq!(
            select_provider(&s, &env(false, None)),
            Err(SelectionError::SmtpNotConfigured)
        );
    }

    #[test]
    fn test_explicit_sendgrid_prefers_stored_key() {
        let s = snapshot(Some(EmailProvider::SendGrid), Some("SG.stored"));
        assert_eq!(
            select_provider(&s, &env(true, Some("SG.env"))),
            Ok(ProviderChoice::SendGrid { api_key: "SG.stored".to_string() })
        );
    }

    #[test]
    fn test_explicit_sendgrid_falls_back_to_env_key() {
        let s = snapshot(Some(EmailProvider::SendGrid), None);
        assert_eq!(
            select_provider(&s, &env(true, Some("SG.env"))),
            Ok(ProviderChoice::SendGrid { api_key: "SG.env".to_string() })
        );
        assert_eq!(
            select_provider(&s, &env(true, None)),
            Err(SelectionError::SendGridKeyMissing)
        );
    }

    #[test]
    fn test_auto_selection() {
        let unset = snapshot(None, None);
        assert_eq!(
            select_provider(&unset, &env(true, Some("SG.env"))),
            Ok(ProviderChoice::SendGrid { api_key: "SG.env".to_string() })
        );
        assert_eq!(select_provider(&unset, &env(true, None)), Ok(ProviderChoice::Smtp));
        assert_eq!(
            select_provider(&unset, &env(false, None)),
            Err(SelectionError::NoProviderConfigured)
        );
    }

    #[test]
    fn test_blank_env_key_ignored() {
        let unset = snapshot(None, None);
        assert_eq!(select_provider(&unset, &env(true, Some("  "))), Ok(ProviderChoice::Smtp));
    }

    #[test]
    fn test_force_sendgrid_ignores_provider() {
        let s = snapshot(Some(EmailProvider::Smtp), Some("SG.stored"));
        assert_eq!(
            force_sendgrid(&s, &env(true, None)),
            Ok(ProviderChoice::SendGrid { api_key: "SG.stored".to_string() })
        );
        assert_eq!(
            force_sendgrid(&snapshot(None, None), &env(true, None)),
            Err(SelectionError::SendGridKeyMissing)
        );
    }
}
