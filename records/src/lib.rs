//! Shared record model and client-side rules for Workshop Pool.
//!
//! This crate owns the shapes exchanged between the `workshop-pool` service and
//! the `pool` client, plus the small pieces of logic both sides must agree on:
//! email shape validation, display-name derivation, list filtering/sorting and
//! the membership pre-checks applied before any store mutation.

pub mod component;
pub mod email;
pub mod messages;
pub mod pool;
pub mod profile;

pub use component::{Component, ComponentInputError, filter_components, normalize_component_input};
pub use email::{username_from_email, validate_email};
pub use pool::{
    MemberError, Pool, PoolItem, SortDirection, SortField, check_member_removal, check_new_member,
    filter_and_sort,
};
pub use profile::UserProfile;

/// Session fields the client persists after a successful sign-in.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionInfo {
    pub email: String,
    pub username: String,
}

impl SessionInfo {
    /// Build session fields for an account email, deriving the display name.
    #[must_use]
    pub fn for_email(email: &str) -> Self {
        Self { email: email.to_owned(), username: username_from_email(email) }
    }
}

/// Error body returned by every failing service endpoint.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable code, e.g. `auth/invalid-credential`.
    pub code: String,
    /// Human-readable message safe to show to the user.
    pub message: String,
}

/// Successful sign-in payload: session token plus the derived session fields.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub email: String,
    pub username: String,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
