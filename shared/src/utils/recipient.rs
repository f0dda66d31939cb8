//! Recipient identifier utilities
//!
//! A recipient is the identifier a verification code is issued for,
//! typically an email address or an E.164 phone number.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest identifier accepted (RFC 5321 path limit)
pub const MAX_RECIPIENT_LENGTH: usize = 254;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").unwrap()
});

// International phone number regex (E.164 format)
static E164_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap());

/// Normalize a recipient: trim surrounding whitespace and lowercase emails
pub fn normalize_recipient(recipient: &str) -> String {
    let trimmed = recipient.trim();
    if trimmed.contains('@') {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    }
}

/// Check that an already-normalized recipient is usable as a key
///
/// Non-empty, bounded, and free of whitespace or control characters.
pub fn is_well_formed_recipient(recipient: &str) -> bool {
    !recipient.is_empty()
        && recipient.chars().count() <= MAX_RECIPIENT_LENGTH
        && !recipient
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
}

/// Check if a recipient looks like an email address
pub fn is_valid_email(recipient: &str) -> bool {
    EMAIL_REGEX.is_match(recipient)
}

/// Check if a recipient is an E.164 phone number
pub fn is_valid_phone(recipient: &str) -> bool {
    E164_REGEX.is_match(recipient)
}

/// Mask a recipient for logs (e.g. `a***e@example.com`, `+61****5678`)
pub fn mask_recipient(recipient: &str) -> String {
    if let Some((local, domain)) = recipient.split_once('@') {
        let chars: Vec<char> = local.chars().collect();
        let masked_local = match chars.len() {
            0 => String::from("***"),
            1 | 2 => format!("{}***", chars[0]),
            n => format!("{}***{}", chars[0], chars[n - 1]),
        };
        return format!("{}@{}", masked_local, domain);
    }

    let chars: Vec<char> = recipient.chars().collect();
    if chars.len() >= 7 {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_recipient() {
        assert_eq!(normalize_recipient("  A@X.com "), "a@x.com");
        assert_eq!(normalize_recipient(" +61412345678"), "+61412345678");
    }

    #[test]
    fn test_is_well_formed_recipient() {
        assert!(is_well_formed_recipient("a@x.com"));
        assert!(is_well_formed_recipient("+61412345678"));
        assert!(!is_well_formed_recipient(""));
        assert!(!is_well_formed_recipient("a b@x.com"));
        assert!(!is_well_formed_recipient("a@x.com\n"));
        assert!(!is_well_formed_recipient(&"a".repeat(MAX_RECIPIENT_LENGTH + 1)));
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@nodot"));
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("+14155552671"));
        assert!(!is_valid_phone("14155552671"));
        assert!(!is_valid_phone("+0123456789"));
    }

    #[test]
    fn test_mask_recipient() {
        assert_eq!(mask_recipient("alice@example.com"), "a***e@example.com");
        assert_eq!(mask_recipient("al@example.com"), "a***@example.com");
        assert_eq!(mask_recipient("+61412345678"), "+61****5678");
        assert_eq!(mask_recipient("12345"), "****");
    }
}
