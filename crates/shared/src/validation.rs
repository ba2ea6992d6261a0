//! Common validation utilities.

use regex::Regex;
use validator::ValidationError;

lazy_static::lazy_static! {
    /// Deliberately loose: something@something.tld with no whitespace.
    pub static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Returns true if the value looks like an email address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Validates that an email address matches the simple email pattern.
pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Invalid email format".into());
        Err(err)
    }
}

/// Validates that a string contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be empty".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Returns `None` for missing or whitespace-only values, otherwise the trimmed value.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
