//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool, the optional GitHub OAuth settings, and the mailer
//! used for password-reset delivery. Everything is cheap to clone.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::github::GitHubConfig;
use crate::services::mailer::{LogMailer, ResendMailer, ResetMailer};

/// Session and link settings the auth routes need on every request.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub session_ttl_days: i64,
    pub cookie_secure: bool,
    pub public_base_url: String,
}

impl AuthSettings {
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            session_ttl_days: config.session_ttl_days,
            cookie_secure: config.cookie_secure,
            public_base_url: config.public_base_url.clone(),
        }
    }
}

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// GitHub OAuth config. `None` disables federated sign-in.
    pub github: Option<GitHubConfig>,
    pub mailer: Arc<dyn ResetMailer>,
    pub auth: AuthSettings,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, github: Option<GitHubConfig>, mailer: Arc<dyn ResetMailer>, auth: AuthSettings) -> Self {
        Self { pool, github, mailer, auth }
    }

    /// Build state from loaded configuration, choosing Resend delivery when
    /// configured and log-only delivery otherwise.
    #[must_use]
    pub fn from_config(pool: PgPool, config: &ServerConfig) -> Self {
        let mailer: Arc<dyn ResetMailer> = match &config.resend {
            Some(resend) => Arc::new(ResendMailer::new(resend)),
            None => {
                tracing::warn!("RESEND_API_KEY/RESEND_FROM not set; reset links will only be logged");
                Arc::new(LogMailer)
            }
        };
        Self::new(pool, config.github.clone(), mailer, AuthSettings::from_config(config))
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;
