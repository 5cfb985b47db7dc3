//! Service configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads `.env` (if present) and builds one `ServerConfig` before any
//! I/O. Optional integrations (GitHub sign-in, reset-email delivery) are
//! `None` when their variables are missing; the service runs without them.

use crate::services::github::GitHubConfig;
use crate::services::mailer::ResendConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub session_ttl_days: i64,
    /// Base URL used in links sent by email.
    pub public_base_url: String,
    pub cookie_secure: bool,
    pub github: Option<GitHubConfig>,
    pub resend: Option<ResendConfig>,
}

impl ServerConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `SESSION_TTL_DAYS`: default 30, at most 3650
    /// - `PUBLIC_BASE_URL`: default `http://localhost:3000`
    /// - `COOKIE_SECURE`: inferred from `PUBLIC_BASE_URL` scheme when unset
    /// - `GITHUB_CLIENT_ID`, `GITHUB_CLIENT_SECRET`, `GITHUB_REDIRECT_URI`
    /// - `RESEND_API_KEY`, `RESEND_FROM`
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a numeric value does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let port = env_parse("PORT", DEFAULT_PORT)?;
        let db_max_connections = env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let session_ttl_days = check_session_ttl(env_parse("SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS)?)?;
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or_else(|| public_base_url.starts_with("https://"));

        Ok(Self {
            database_url,
            port,
            db_max_connections,
            session_ttl_days,
            public_base_url,
            cookie_secure,
            github: GitHubConfig::from_env(),
            resend: ResendConfig::from_env(),
        })
    }
}

/// Session lifetime must be positive and small enough for both the cookie
/// `Max-Age` and a Postgres `timestamptz`.
fn check_session_ttl(days: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_SESSION_TTL_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::Invalid { key: "SESSION_TTL_DAYS", value: days.to_string() })
    }
}

fn env_parse<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
