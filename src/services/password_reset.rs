//! Password-reset service.
//!
//! Creates single-use reset tokens (stored only as SHA-256 hashes), dispatches
//! them by email, and consumes them to set a new password.
//!
//! ERROR HANDLING
//! ==============
//! Requests for unknown emails succeed silently so the endpoint cannot be
//! used to enumerate accounts. Delivery failures do surface, since the user
//! would otherwise wait for a message that never arrives.

use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::account::{self, AccountError};
use super::mailer::{DeliveryError, ResetMailer, ResetMessage};
use super::session;

#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {} characters", account::MIN_PASSWORD_LEN)]
    WeakPassword,
    #[error("reset token is invalid or expired")]
    InvalidToken,
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for ResetError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "auth/invalid-email",
            Self::WeakPassword => "auth/weak-password",
            Self::InvalidToken => "auth/invalid-reset-token",
            Self::Delivery(_) => "auth/delivery-failed",
            Self::Hash(_) => "auth/internal",
            Self::Database(_) => "store/unavailable",
        }
    }
}

impl From<AccountError> for ResetError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidEmail => Self::InvalidEmail,
            AccountError::WeakPassword => Self::WeakPassword,
            AccountError::Database(e) => Self::Database(e),
            AccountError::Hash(e) => Self::Hash(e),
            AccountError::EmailTaken | AccountError::InvalidCredential => Self::InvalidToken,
        }
    }
}

#[must_use]
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.trim().as_bytes());
    session::bytes_to_hex(&hasher.finalize())
}

#[must_use]
pub fn reset_link(public_base_url: &str, token: &str) -> String {
    format!("{}/forgot-password?token={token}", public_base_url.trim_end_matches('/'))
}

/// Issue a reset token for `email` and hand it to the mailer.
///
/// # Errors
///
/// [`ResetError::InvalidEmail`] for a malformed address, delivery or database
/// failures otherwise. Unknown accounts are not an error.
pub async fn request_reset(
    pool: &PgPool,
    mailer: &dyn ResetMailer,
    public_base_url: &str,
    email: &str,
) -> Result<(), ResetError> {
    let email = account::normalize_email(email)?;
    let Some(user) = account::find_by_email(pool, &email).await? else {
        tracing::debug!("password reset requested for unknown email");
        return Ok(());
    };

    sqlx::query("DELETE FROM password_resets WHERE user_id = $1 AND consumed_at IS NULL")
        .bind(user.id)
        .execute(pool)
        .await?;

    let token = session::generate_token();
    sqlx::query("INSERT INTO password_resets (user_id, token_hash) VALUES ($1, $2)")
        .bind(user.id)
        .bind(hash_reset_token(&token))
        .execute(pool)
        .await?;

    let message = ResetMessage { to: user.email, link: reset_link(public_base_url, &token), token };
    mailer.send_reset(&message).await?;
    tracing::info!(user_id = %user.id, "password reset dispatched");
    Ok(())
}

/// Consume a reset token and set a new password. All sessions of the account
/// are revoked. Returns the account id.
///
/// # Errors
///
/// [`ResetError::WeakPassword`] before the token is touched, then
/// [`ResetError::InvalidToken`] for unknown, used, or expired tokens.
pub async fn confirm_reset(pool: &PgPool, token: &str, new_password: &str) -> Result<Uuid, ResetError> {
    account::check_password_strength(new_password)?;

    let row = sqlx::query(
        r"UPDATE password_resets
          SET consumed_at = now()
          WHERE token_hash = $1
            AND consumed_at IS NULL
            AND expires_at > now()
          RETURNING user_id",
    )
    .bind(hash_reset_token(token))
    .fetch_optional(pool)
    .await?
    .ok_or(ResetError::InvalidToken)?;
    let user_id: Uuid = row.get("user_id");

    account::set_password(pool, user_id, new_password).await?;
    let revoked = session::delete_user_sessions(pool, user_id).await?;
    tracing::info!(%user_id, revoked, "password reset completed");
    Ok(user_id)
}

#[cfg(test)]
#[path = "password_reset_test.rs"]
mod tests;
