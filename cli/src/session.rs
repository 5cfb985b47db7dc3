//! Client session, the session gate, and logout.
//!
//! DESIGN
//! ======
//! The gate is a two-step decision: a [`GateState`] is either still loading or
//! resolved (with or without a session), and [`GateState::decide`] turns it
//! into [`GateDecision`]. Loading never redirects. Resolution trusts a single
//! observation from the auth provider; there is no retry.

use records::UserProfile;

use crate::backend::{AuthProvider, BackendError};
use crate::error::CliError;
use crate::store::{KEY_SESSION_TOKEN, KEY_USER_DATA, KEY_USER_EMAIL, KEY_USERNAME, LocalStore};

/// The signed-in account as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub username: String,
    /// Cached profile; absent when the profile fetch/seed failed at sign-in.
    pub profile: Option<UserProfile>,
    pub token: String,
}

impl Session {
    /// Read the persisted session fields. Requires both an email and a token.
    #[must_use]
    pub fn load(local: &LocalStore) -> Option<Self> {
        let email = local.get(KEY_USER_EMAIL)?.to_owned();
        let token = local.get(KEY_SESSION_TOKEN)?.to_owned();
        let username = local
            .get(KEY_USERNAME)
            .map_or_else(|| records::username_from_email(&email), str::to_owned);
        let profile = local
            .get(KEY_USER_DATA)
            .and_then(|raw| serde_json::from_str::<UserProfile>(raw).ok());
        Some(Self { email, username, profile, token })
    }

    /// Persist this session in place of whatever was stored. `userData` is
    /// written only when a profile is present, so a stale profile from an
    /// earlier sign-in never survives.
    ///
    /// # Errors
    ///
    /// Fails when the state file cannot be written.
    pub fn save(&self, local: &mut LocalStore) -> Result<(), CliError> {
        let mut pairs = vec![
            (KEY_USERNAME, self.username.clone()),
            (KEY_USER_EMAIL, self.email.clone()),
            (KEY_SESSION_TOKEN, self.token.clone()),
        ];
        if let Some(profile) = &self.profile {
            pairs.push((KEY_USER_DATA, serde_json::to_string(profile)?));
        }
        local.replace_session(pairs)
    }
}

// =============================================================================
// GATE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Resolved(Option<Session>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Show a placeholder; do not redirect yet.
    Pending,
    Authorized(Session),
    RedirectToLogin,
}

impl GateState {
    #[must_use]
    pub fn decide(self) -> GateDecision {
        match self {
            Self::Loading => GateDecision::Pending,
            Self::Resolved(Some(session)) => GateDecision::Authorized(session),
            Self::Resolved(None) => GateDecision::RedirectToLogin,
        }
    }
}

/// Resolve the gate: local session fields plus one observation of the
/// provider's session state. A provider that reports a different account than
/// the one stored locally counts as signed out.
///
/// # Errors
///
/// Propagates a failed observation (for example an unreachable service).
pub async fn resolve_gate(auth: &dyn AuthProvider, local: &LocalStore) -> Result<GateState, BackendError> {
    let Some(session) = Session::load(local) else {
        return Ok(GateState::Resolved(None));
    };
    let observed = auth.current_session().await?;
    match observed {
        Some(info) if info.email == session.email => Ok(GateState::Resolved(Some(session))),
        Some(info) => {
            tracing::warn!(stored = %session.email, observed = %info.email, "stored session does not match provider");
            Ok(GateState::Resolved(None))
        }
        None => Ok(GateState::Resolved(None)),
    }
}

/// Sign out with the provider and clear every local session key.
///
/// The local clear always happens; a provider failure is only logged.
///
/// # Errors
///
/// Fails when the state file cannot be written.
pub async fn logout(auth: &dyn AuthProvider, local: &mut LocalStore) -> Result<(), CliError> {
    if let Err(e) = auth.sign_out().await {
        tracing::warn!(error = %e, "provider sign-out failed; clearing local session anyway");
    }
    local.clear()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
