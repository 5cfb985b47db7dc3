//! Account service: password sign-up/sign-in and federated account upsert.
//!
//! DESIGN
//! ======
//! Accounts are keyed by email. Password accounts store an Argon2id PHC
//! string; GitHub accounts store the numeric GitHub id and may later gain a
//! password through the reset flow. Every credential failure after shape
//! validation collapses into `InvalidCredential` so callers cannot probe which
//! emails exist.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use records::{username_from_email, validate_email};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("an account already exists for this email")]
    EmailTaken,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for AccountError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "auth/invalid-email",
            Self::WeakPassword => "auth/weak-password",
            Self::EmailTaken => "auth/email-taken",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::Hash(_) => "auth/internal",
            Self::Database(_) => "store/unavailable",
        }
    }
}

/// Minimal account row used by the auth routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

/// Hash a password using Argon2id. Returns a PHC-format string.
///
/// # Errors
///
/// Returns [`AccountError::Hash`] if the hasher rejects its input.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hash(e.to_string()))
}

/// Verify a password against a PHC-format hash string.
///
/// # Errors
///
/// Returns [`AccountError::Hash`] if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AccountError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AccountError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Trim and shape-check an email.
///
/// # Errors
///
/// Returns [`AccountError::InvalidEmail`] if the trimmed value is malformed.
pub fn normalize_email(email: &str) -> Result<String, AccountError> {
    let email = email.trim();
    if !validate_email(email) {
        return Err(AccountError::InvalidEmail);
    }
    Ok(email.to_owned())
}

/// # Errors
///
/// Returns [`AccountError::WeakPassword`] below the minimum length.
pub fn check_password_strength(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::WeakPassword);
    }
    Ok(())
}

/// Create a password account.
///
/// # Errors
///
/// Validation errors, [`AccountError::EmailTaken`], or a database error.
pub async fn register(pool: &PgPool, email: &str, password: &str) -> Result<AccountRow, AccountError> {
    let email = normalize_email(email)?;
    check_password_strength(password)?;
    let password_hash = hash_password(password)?;
    let username = username_from_email(&email);

    let row = sqlx::query(
        r"INSERT INTO users (email, username, password_hash)
          VALUES ($1, $2, $3)
          ON CONFLICT (email) DO NOTHING
          RETURNING id",
    )
    .bind(&email)
    .bind(&username)
    .bind(&password_hash)
    .fetch_optional(pool)
    .await?
    .ok_or(AccountError::EmailTaken)?;

    Ok(AccountRow { id: row.get("id"), email, username })
}

/// Verify email + password credentials.
///
/// # Errors
///
/// [`AccountError::InvalidEmail`] for a malformed address, otherwise
/// [`AccountError::InvalidCredential`] for any unknown account or mismatch.
pub async fn sign_in(pool: &PgPool, email: &str, password: &str) -> Result<AccountRow, AccountError> {
    let email = normalize_email(email)?;
    let row = sqlx::query("SELECT id, email, username, password_hash FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(AccountError::InvalidCredential)?;

    let stored: Option<String> = row.get("password_hash");
    let Some(stored) = stored else {
        return Err(AccountError::InvalidCredential);
    };
    if !verify_password(password, &stored)? {
        return Err(AccountError::InvalidCredential);
    }

    Ok(AccountRow { id: row.get("id"), email: row.get("email"), username: row.get("username") })
}

/// Look up an account by email.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<AccountRow>, AccountError> {
    let row = sqlx::query("SELECT id, email, username FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| AccountRow { id: r.get("id"), email: r.get("email"), username: r.get("username") }))
}

/// Upsert an account from a federated identity, matching on email.
///
/// # Errors
///
/// Returns a database error if the upsert fails.
pub async fn upsert_federated(pool: &PgPool, email: &str, github_id: i64) -> Result<AccountRow, AccountError> {
    let username = username_from_email(email);
    let row = sqlx::query(
        r"INSERT INTO users (email, username, github_id)
          VALUES ($1, $2, $3)
          ON CONFLICT (email) DO UPDATE SET github_id = COALESCE(users.github_id, EXCLUDED.github_id)
          RETURNING id, email, username",
    )
    .bind(email)
    .bind(&username)
    .bind(github_id)
    .fetch_one(pool)
    .await?;
    Ok(AccountRow { id: row.get("id"), email: row.get("email"), username: row.get("username") })
}

/// Replace an account's password.
///
/// # Errors
///
/// Validation, hashing, or database errors.
pub async fn set_password(pool: &PgPool, user_id: Uuid, password: &str) -> Result<(), AccountError> {
    check_password_strength(password)?;
    let password_hash = hash_password(password)?;
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
