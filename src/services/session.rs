//! Sign-in sessions.
//!
//! Password and GitHub sign-ins both end by minting an opaque token into
//! `sessions`. The browser holds it in an HttpOnly cookie and the CLI replays
//! the same cookie header. Lookups join `users` so a request always sees the
//! account's current email and display name.
//!
//! Tokens are kept as-is and looked up by primary key; revoking one is a row
//! delete. Expired rows for a user are pruned whenever that user signs in.

use rand::RngCore;
use sqlx::PgPool;
use uuid::Uuid;

const TOKEN_BYTES: usize = 32;

/// Lowercase hex rendering, two characters per byte.
pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    bytes
        .iter()
        .flat_map(|b| [DIGITS[usize::from(b >> 4)], DIGITS[usize::from(b & 0x0f)]])
        .map(char::from)
        .collect()
}

/// Fresh random token, hex encoded.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes_to_hex(&bytes)
}

/// Account behind a live session.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionUser {
    #[serde(skip)]
    pub id: Uuid,
    pub email: String,
    /// Display name derived from the email local part at sign-up.
    pub username: String,
    /// How the account signs in (`"password"`, `"github"`).
    pub auth_method: String,
}

type SessionUserTuple = (Uuid, String, String, String);

impl From<SessionUserTuple> for SessionUser {
    fn from((id, email, username, auth_method): SessionUserTuple) -> Self {
        Self { id, email, username, auth_method }
    }
}

/// Open a session for `user_id` lasting `ttl_days`, returning its token.
pub async fn create_session(pool: &PgPool, user_id: Uuid, ttl_days: i64) -> Result<String, sqlx::Error> {
    let pruned = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND expires_at <= now()")
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();
    if pruned > 0 {
        tracing::debug!(%user_id, pruned, "dropped expired sessions");
    }

    let token = generate_token();
    let days = i32::try_from(ttl_days).unwrap_or(i32::MAX);
    sqlx::query(
        "INSERT INTO sessions (token, user_id, expires_at) \
         VALUES ($1, $2, now() + make_interval(days => $3))",
    )
    .bind(&token)
    .bind(user_id)
    .bind(days)
    .execute(pool)
    .await?;
    Ok(token)
}

/// Resolve a token to its account. Unknown and expired tokens yield `None`.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionUserTuple>(
        "SELECT u.id, u.email, u.username, \
                CASE WHEN u.password_hash IS NOT NULL THEN 'password' \
                     WHEN u.github_id IS NOT NULL THEN 'github' \
                     ELSE 'session' END \
         FROM sessions s JOIN users u ON u.id = s.user_id \
         WHERE s.token = $1 AND s.expires_at > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(SessionUser::from))
}

/// Sign out one session.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await
        .map(drop)
}

/// Revoke every session of a user. Returns how many were removed.
pub async fn delete_user_sessions(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
