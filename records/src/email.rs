//! Email shape validation and display-name derivation.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern must compile")
});

/// Returns true iff `email` has the shape `local@domain.tld` with a tld of at
/// least two letters. No trimming is applied; callers decide on that.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Display name derived from the local part of an email address.
#[must_use]
pub fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_owned()
}

#[cfg(test)]
#[path = "email_test.rs"]
mod tests;
