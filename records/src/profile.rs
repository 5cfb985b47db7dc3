//! Per-account profile document keyed by email.

use serde::{Deserialize, Serialize};

use crate::email::username_from_email;

/// Profile stored under the account email.
///
/// Older documents may lack any field but `email`; absent fields fall back to
/// an empty username, an empty timestamp and no pools.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    #[serde(default)]
    pub username: String,
    /// RFC 3339 timestamp of profile creation.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub pools: Vec<String>,
}

impl UserProfile {
    /// Default profile seeded on first sign-in.
    #[must_use]
    pub fn seed(email: &str, created_at: impl Into<String>) -> Self {
        Self {
            email: email.to_owned(),
            username: username_from_email(email),
            created_at: created_at.into(),
            pools: Vec::new(),
        }
    }

    /// Display name, falling back to the email local part when unset.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.username.is_empty() { username_from_email(&self.email) } else { self.username.clone() }
    }
}
