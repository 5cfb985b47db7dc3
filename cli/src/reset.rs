//! Password reset: request the email, then confirm with the emailed token.

use std::sync::atomic::AtomicBool;

use records::{messages, validate_email};

use crate::backend::AuthProvider;
use crate::flow::{FlowError, SubmitGuard};

#[derive(Default)]
pub struct ResetFlow {
    submitting: AtomicBool,
}

impl ResetFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the provider to email a reset link. Returns the confirmation
    /// message to show.
    ///
    /// # Errors
    ///
    /// [`FlowError::Invalid`] for a malformed email (nothing is sent),
    /// [`FlowError::Failed`] when the provider rejects the request.
    pub async fn request_reset(&self, auth: &dyn AuthProvider, email: &str) -> Result<&'static str, FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let email = email.trim();
        if !validate_email(email) {
            return Err(FlowError::invalid(messages::INVALID_EMAIL));
        }
        auth.send_password_reset(email).await.map_err(|e| {
            tracing::error!(error = %e, "password reset request failed");
            FlowError::failed(messages::RESET_FAILED)
        })?;
        Ok(messages::RESET_SENT)
    }

    /// Set a new password with the emailed token.
    ///
    /// # Errors
    ///
    /// [`FlowError::Invalid`] for an empty token; otherwise the service's
    /// message (expired token, weak password) as [`FlowError::Failed`].
    pub async fn confirm_reset(
        &self,
        auth: &dyn AuthProvider,
        token: &str,
        new_password: &str,
    ) -> Result<&'static str, FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(FlowError::invalid("Reset token is required"));
        }
        auth.confirm_password_reset(token, new_password).await.map_err(|e| {
            tracing::error!(error = %e, "password reset confirmation failed");
            match e.status {
                Some(status) if status < 500 => FlowError::failed(e.message),
                _ => FlowError::failed(messages::RESET_FAILED),
            }
        })?;
        Ok(messages::PASSWORD_UPDATED)
    }
}

#[cfg(test)]
#[path = "reset_test.rs"]
mod tests;
