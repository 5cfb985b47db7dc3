//! Pool records, list filtering/sorting, and membership pre-checks.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::email::validate_email;
use crate::messages;

/// A named group with one owner and a set of member emails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub name: String,
    pub owner: String,
    /// Member emails in insertion order. The owner is always present.
    #[serde(default)]
    pub members: Vec<String>,
}

impl Pool {
    #[must_use]
    pub fn has_member(&self, email: &str) -> bool {
        self.owner == email || self.members.iter().any(|m| m == email)
    }

    #[must_use]
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.owner == email
    }
}

/// Row shown in the pool list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolItem {
    pub id: String,
    /// Pool name.
    pub pool: String,
    pub owner: String,
}

impl PoolItem {
    /// Delete is only offered to the owner.
    #[must_use]
    pub fn can_delete(&self, current_user_email: &str) -> bool {
        self.owner == current_user_email
    }
}

impl From<&Pool> for PoolItem {
    fn from(pool: &Pool) -> Self {
        Self { id: pool.id.clone(), pool: pool.name.clone(), owner: pool.owner.clone() }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Pool,
    Owner,
}

impl SortField {
    fn key(self, item: &PoolItem) -> &str {
        match self {
            Self::Pool => &item.pool,
            Self::Owner => &item.owner,
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pool" | "name" => Ok(Self::Pool),
            "owner" => Ok(Self::Owner),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Case-folded comparison with a raw tiebreak, so two distinct keys never
/// compare equal.
fn compare_keys(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Filter pool rows by a case-insensitive substring of name or owner, then
/// sort by `field` in `direction`. Equal keys keep their input order.
#[must_use]
pub fn filter_and_sort(items: &[PoolItem], term: &str, field: SortField, direction: SortDirection) -> Vec<PoolItem> {
    let needle = term.to_lowercase();
    let mut out = items
        .iter()
        .filter(|item| {
            needle.is_empty()
                || item.pool.to_lowercase().contains(&needle)
                || item.owner.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect::<Vec<_>>();

    out.sort_by(|a, b| {
        let ord = compare_keys(field.key(a), field.key(b));
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    out
}

/// Why a membership change was refused before touching the store.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MemberError {
    #[error("{}", messages::EMPTY_EMAIL)]
    Empty,
    #[error("{}", messages::INVALID_EMAIL)]
    InvalidEmail,
    #[error("{}", messages::ALREADY_MEMBER)]
    AlreadyMember,
    #[error("{}", messages::CANNOT_REMOVE_OWNER)]
    IsOwner,
    #[error("{}", messages::NOT_A_MEMBER)]
    NotMember,
}

impl MemberError {
    /// Stable machine code used on the wire.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "member/empty",
            Self::InvalidEmail => "member/invalid-email",
            Self::AlreadyMember => "member/duplicate",
            Self::IsOwner => "member/owner",
            Self::NotMember => "member/not-found",
        }
    }
}

/// Validate a member email for addition. Returns the trimmed email.
///
/// # Errors
///
/// Empty input, a malformed address, or an address already in the pool.
pub fn check_new_member(pool: &Pool, email: &str) -> Result<String, MemberError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(MemberError::Empty);
    }
    if !validate_email(email) {
        return Err(MemberError::InvalidEmail);
    }
    if pool.has_member(email) {
        return Err(MemberError::AlreadyMember);
    }
    Ok(email.to_owned())
}

/// Validate a member removal.
///
/// # Errors
///
/// The owner can never be removed; removing a non-member is refused.
pub fn check_member_removal(pool: &Pool, email: &str) -> Result<(), MemberError> {
    if pool.owner == email {
        return Err(MemberError::IsOwner);
    }
    if !pool.members.iter().any(|m| m == email) {
        return Err(MemberError::NotMember);
    }
    Ok(())
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;
