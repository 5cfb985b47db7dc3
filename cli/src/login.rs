//! Login flow: credential and GitHub sign-in, followed by profile fetch-or-seed
//! and persistence of the session fields.

use std::sync::atomic::AtomicBool;

use records::{SignInResponse, UserProfile, messages, username_from_email, validate_email};

use crate::backend::{AuthProvider, DocumentStore};
use crate::flow::{ErrorSlot, FlowError, SubmitGuard};
use crate::session::Session;
use crate::store::LocalStore;

const INVALID_CREDENTIAL_CODE: &str = "auth/invalid-credential";

#[derive(Default)]
pub struct LoginFlow {
    submitting: AtomicBool,
    error: ErrorSlot,
}

impl LoginFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last error shown to the user, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    /// Email + password sign-in. A malformed email fails before any request.
    ///
    /// # Errors
    ///
    /// [`FlowError::Invalid`] for a malformed email, [`FlowError::Failed`] with
    /// the mapped user message otherwise.
    pub async fn login(
        &self,
        auth: &dyn AuthProvider,
        store: &dyn DocumentStore,
        local: &mut LocalStore,
        email: &str,
        password: &str,
    ) -> Result<Session, FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let result = async {
            let email = email.trim();
            if !validate_email(email) {
                return Err(FlowError::invalid(messages::INVALID_EMAIL));
            }
            let signed_in = auth.sign_in(email, password).await.map_err(|e| {
                if e.is(INVALID_CREDENTIAL_CODE) {
                    FlowError::failed(messages::INVALID_CREDENTIAL)
                } else {
                    tracing::error!(error = %e, "sign-in failed");
                    FlowError::failed(messages::LOGIN_FAILED)
                }
            })?;
            complete_sign_in(store, local, signed_in, messages::LOGIN_FAILED).await
        }
        .await;
        self.error.record(result)
    }

    /// Create a password account, then continue exactly like [`Self::login`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::login`]; the backend's message is shown for rejected
    /// registrations (taken email, short password).
    pub async fn register(
        &self,
        auth: &dyn AuthProvider,
        store: &dyn DocumentStore,
        local: &mut LocalStore,
        email: &str,
        password: &str,
    ) -> Result<Session, FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let result = async {
            let email = email.trim();
            if !validate_email(email) {
                return Err(FlowError::invalid(messages::INVALID_EMAIL));
            }
            let signed_in = auth.register(email, password).await.map_err(|e| {
                tracing::error!(error = %e, "registration failed");
                match e.status {
                    Some(status) if status < 500 => FlowError::failed(e.message),
                    _ => FlowError::failed(messages::LOGIN_FAILED),
                }
            })?;
            complete_sign_in(store, local, signed_in, messages::LOGIN_FAILED).await
        }
        .await;
        self.error.record(result)
    }

    /// Federated sign-in with a GitHub access token.
    ///
    /// # Errors
    ///
    /// [`FlowError::Failed`] with the federated failure message.
    pub async fn login_with_github(
        &self,
        auth: &dyn AuthProvider,
        store: &dyn DocumentStore,
        local: &mut LocalStore,
        access_token: &str,
    ) -> Result<Session, FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let result = async {
            let signed_in = auth.sign_in_federated(access_token.trim()).await.map_err(|e| {
                tracing::error!(error = %e, "github sign-in failed");
                FlowError::failed(messages::FEDERATED_LOGIN_FAILED)
            })?;
            complete_sign_in(store, local, signed_in, messages::FEDERATED_LOGIN_FAILED).await
        }
        .await;
        self.error.record(result)
    }
}

/// Shared tail of every sign-in: derive the display name, fetch or seed the
/// profile, persist the session fields.
async fn complete_sign_in(
    store: &dyn DocumentStore,
    local: &mut LocalStore,
    signed_in: SignInResponse,
    failure_message: &str,
) -> Result<Session, FlowError> {
    let username = username_from_email(&signed_in.email);
    let profile = fetch_or_seed_profile(store).await;
    let session = Session { email: signed_in.email, username, profile, token: signed_in.token };
    session.save(local).map_err(|e| {
        tracing::error!(error = %e, "could not persist session");
        FlowError::failed(failure_message)
    })?;
    tracing::info!(email = %session.email, "signed in");
    Ok(session)
}

/// A failed fetch or seed is logged and skipped; sign-in still succeeds.
async fn fetch_or_seed_profile(store: &dyn DocumentStore) -> Option<UserProfile> {
    let fetched = match store.get_profile().await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "profile fetch failed");
            return None;
        }
    };
    if fetched.is_some() {
        return fetched;
    }
    match store.seed_profile().await {
        Ok(seeded) => Some(seeded),
        Err(e) => {
            tracing::warn!(error = %e, "profile seed failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
