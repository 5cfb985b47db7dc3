//! Profile documents keyed by account email.
//!
//! A profile is seeded once on first sign-in and never overwritten by later
//! seeds, so a concurrent double sign-in cannot clobber stored data.

use records::UserProfile;
use sqlx::PgPool;

const PROFILE_COLUMNS: &str = r#"email, username, pools,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at"#;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for ProfileError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "profile/not-found",
            Self::Database(_) => "store/unavailable",
        }
    }
}

type ProfileTuple = (String, String, Vec<String>, String);

fn to_profile((email, username, pools, created_at): ProfileTuple) -> UserProfile {
    UserProfile { email, username, created_at, pools }
}

/// Fetch the profile stored under `email`.
///
/// # Errors
///
/// [`ProfileError::NotFound`] when no profile exists, or a database error.
pub async fn get_profile(pool: &PgPool, email: &str) -> Result<UserProfile, ProfileError> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = $1");
    sqlx::query_as::<_, ProfileTuple>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?
        .map(to_profile)
        .ok_or(ProfileError::NotFound)
}

/// Seed the default profile for `email` if none exists, then return the
/// stored profile (seeded or pre-existing).
///
/// # Errors
///
/// Returns a database error if the insert or read fails.
pub async fn ensure_profile(pool: &PgPool, email: &str) -> Result<UserProfile, ProfileError> {
    let seed = UserProfile::seed(email, String::new());
    sqlx::query(
        r"INSERT INTO profiles (email, username, pools)
          VALUES ($1, $2, $3)
          ON CONFLICT (email) DO NOTHING",
    )
    .bind(&seed.email)
    .bind(&seed.username)
    .bind(&seed.pools)
    .execute(pool)
    .await?;

    get_profile(pool, email).await
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
