use url::Url;
use validator::ValidateEmail;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_CREDIT_CODE_LEN: usize = 64;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.len() <= MAX_EMAIL_LEN && email.validate_email()
}

/// Emails are stored and looked up trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name.chars().count() <= MAX_NAME_LEN
}

/// Validates a credit code.
/// Rules:
/// - 1-64 characters
/// - ASCII letters, digits, hyphens, underscores
pub fn is_valid_credit_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CREDIT_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Credit links must be absolute http(s) URLs.
pub fn is_valid_credit_link(link: &str) -> bool {
    Url::parse(link.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}
