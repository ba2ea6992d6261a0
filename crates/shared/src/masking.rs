//! Masking of secrets for display and logs.

/// Number of leading characters kept visible.
const VISIBLE_PREFIX: usize = 6;

/// Number of trailing characters kept visible.
const VISIBLE_SUFFIX: usize = 4;

/// Masks a secret, keeping a short prefix and suffix.
///
/// Short secrets are fully masked so that nothing meaningful leaks.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= VISIBLE_PREFIX + VISIBLE_SUFFIX {
        return "*".repeat(chars.len());
    }

    let prefix: String = chars[..VISIBLE_PREFIX].iter().collect();
    let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    format!("{prefix}...{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_long_secret() {
        assert_eq!(mask_secret("SG.abcdefghijklmnop"), "SG.abc...mnop");
    }

    #[test]
    fn test_mask_short_secret() {
        assert_eq!(mask_secret("short"), "*****");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_mask_boundary() {
        assert_eq!(mask_secret("0123456789"), "**********");
        assert_eq!(mask_secret("0123456789a"), "012345...789a");
    }
}
