//! Contracts the client managers are written against.
//!
//! [`AuthProvider`] covers credential and federated sign-in, reset-email
//! dispatch, session observation and sign-out. [`DocumentStore`] covers the
//! profile, pool and component collections. The HTTP implementation lives in
//! `http.rs`; tests use an in-memory fake.

use async_trait::async_trait;
use records::{Component, Pool, SessionInfo, SignInResponse, UserProfile};

/// Failure reported by a backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({code})")]
pub struct BackendError {
    /// HTTP status when the request reached the service.
    pub status: Option<u16>,
    pub code: String,
    pub message: String,
}

impl BackendError {
    pub const TRANSPORT: &'static str = "network/unavailable";

    #[must_use]
    pub fn new(status: Option<u16>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { status, code: code.into(), message: message.into() }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, Self::TRANSPORT, message)
    }

    #[must_use]
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn register(&self, email: &str, password: &str) -> Result<SignInResponse, BackendError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, BackendError>;

    /// Sign in with a GitHub access token.
    async fn sign_in_federated(&self, access_token: &str) -> Result<SignInResponse, BackendError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError>;

    async fn confirm_password_reset(&self, token: &str, password: &str) -> Result<(), BackendError>;

    /// Observe the current session once. `None` means signed out.
    async fn current_session(&self) -> Result<Option<SessionInfo>, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// Collections are scoped to the signed-in caller where the service does so
/// (profile, owned pools).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_profile(&self) -> Result<Option<UserProfile>, BackendError>;

    /// Seed the default profile if absent and return the stored one.
    async fn seed_profile(&self) -> Result<UserProfile, BackendError>;

    async fn list_owned_pools(&self) -> Result<Vec<Pool>, BackendError>;

    async fn create_pool(&self, name: &str) -> Result<Pool, BackendError>;

    async fn get_pool(&self, id: &str) -> Result<Option<Pool>, BackendError>;

    async fn delete_pool(&self, id: &str) -> Result<(), BackendError>;

    /// Atomic set-add on the member list.
    async fn add_member(&self, pool_id: &str, email: &str) -> Result<Pool, BackendError>;

    /// Atomic set-remove on the member list.
    async fn remove_member(&self, pool_id: &str, email: &str) -> Result<Pool, BackendError>;

    async fn list_components(&self) -> Result<Vec<Component>, BackendError>;

    async fn create_component(&self, name: &str, description: &str) -> Result<Component, BackendError>;

    async fn delete_component(&self, id: &str) -> Result<(), BackendError>;
}
