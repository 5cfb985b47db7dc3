//! Auth routes: password and GitHub sign-in, password reset, session
//! observation, and logout.

use axum::extract::{FromRef, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use records::SignInResponse;
use serde::Deserialize;
use time::Duration;

use crate::error::ApiError;
use crate::routes::profile::seed_profile_best_effort;
use crate::services::account::{self, AccountError, AccountRow};
use crate::services::github::{self, GitHubError};
use crate::services::password_reset::{self, ResetError};
use crate::services::session;
use crate::state::{AppState, AuthSettings};

pub const COOKIE_NAME: &str = "session_token";
const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl AuthUser {
    /// Resolve the session cookie in `jar`, if any.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the session lookup itself fails.
    pub async fn from_jar(state: &AppState, jar: &CookieJar) -> Result<Option<Self>, ApiError> {
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Ok(None);
        }
        let user = session::validate_session(&state.pool, token)
            .await
            .map_err(|e| ApiError::internal("session lookup failed", &e))?;
        Ok(user.map(|user| Self { user, token: token.to_owned() }))
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let app_state = AppState::from_ref(state);
        Self::from_jar(&app_state, &jar).await?.ok_or_else(ApiError::unauthorized)
    }
}

// =============================================================================
// COOKIES
// =============================================================================

fn session_cookie(token: String, settings: &AuthSettings) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.cookie_secure)
        .max_age(Duration::days(settings.session_ttl_days))
        .build()
}

fn expired_cookie(name: &'static str, settings: &AuthSettings) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.cookie_secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Mint a session for `account` and attach its cookie to `jar`.
pub(crate) async fn start_session(
    state: &AppState,
    jar: CookieJar,
    account: AccountRow,
) -> Result<(CookieJar, SignInResponse), ApiError> {
    let token = session::create_session(&state.pool, account.id, state.auth.session_ttl_days)
        .await
        .map_err(|e| ApiError::internal("session creation failed", &e))?;
    tracing::info!(user_id = %account.id, "session started");
    let jar = jar.add(session_cookie(token.clone(), &state.auth));
    Ok((jar, SignInResponse { token, email: account.email, username: account.username }))
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn account_error(err: &AccountError) -> ApiError {
    let status = match err {
        AccountError::InvalidEmail | AccountError::WeakPassword => StatusCode::BAD_REQUEST,
        AccountError::EmailTaken => StatusCode::CONFLICT,
        AccountError::InvalidCredential => StatusCode::UNAUTHORIZED,
        AccountError::Hash(_) | AccountError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::from_coded(status, err)
}

pub(crate) fn reset_error(err: &ResetError) -> ApiError {
    let status = match err {
        ResetError::InvalidEmail | ResetError::WeakPassword | ResetError::InvalidToken => StatusCode::BAD_REQUEST,
        ResetError::Delivery(_) => StatusCode::BAD_GATEWAY,
        ResetError::Hash(_) | ResetError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::from_coded(status, err)
}

fn github_error(err: &GitHubError) -> ApiError {
    let status = match err {
        GitHubError::TokenExchange(_) | GitHubError::Api(_) => StatusCode::BAD_GATEWAY,
        GitHubError::NoVerifiedEmail => StatusCode::FORBIDDEN,
    };
    ApiError::from_coded(status, err)
}

fn github_not_configured() -> ApiError {
    ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "auth/federated-disabled", "GitHub sign-in is not configured")
}

// =============================================================================
// PASSWORD SIGN-IN
// =============================================================================

#[derive(Deserialize)]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/register`: create a password account and sign in.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CredentialsBody>,
) -> Result<Response, ApiError> {
    let account = account::register(&state.pool, &body.email, &body.password)
        .await
        .map_err(|e| account_error(&e))?;
    let (jar, signed_in) = start_session(&state, jar, account).await?;
    Ok((StatusCode::CREATED, jar, Json(signed_in)).into_response())
}

/// `POST /api/auth/login`: verify email + password and sign in.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CredentialsBody>,
) -> Result<Response, ApiError> {
    let account = account::sign_in(&state.pool, &body.email, &body.password)
        .await
        .map_err(|e| account_error(&e))?;
    let (jar, signed_in) = start_session(&state, jar, account).await?;
    Ok((jar, Json(signed_in)).into_response())
}

// =============================================================================
// GITHUB SIGN-IN
// =============================================================================

/// `GET /auth/github`: redirect to GitHub authorization page.
pub async fn github_redirect(State(state): State<AppState>) -> Response {
    let Some(config) = &state.github else {
        return github_not_configured().into_response();
    };

    let oauth_state = session::generate_token();
    let cookie = Cookie::build((OAUTH_STATE_COOKIE_NAME, oauth_state.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.auth.cookie_secure)
        .max_age(Duration::minutes(10));

    let jar = CookieJar::new().add(cookie);
    (jar, Redirect::temporary(&config.authorize_url(&oauth_state))).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: Option<String>,
}

/// `GET /auth/github/callback`: exchange code, upsert account, set cookie,
/// redirect to `/dashboard`.
pub async fn github_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let Some(config) = &state.github else {
        return Err(github_not_configured());
    };

    // Verify OAuth CSRF state from cookie.
    let Some(callback_state) = params.state.as_deref() else {
        return Err(ApiError::bad_request("auth/oauth-state", "missing oauth state"));
    };
    let expected_state = jar.get(OAUTH_STATE_COOKIE_NAME).map(Cookie::value).unwrap_or_default();
    if expected_state.is_empty() || expected_state != callback_state {
        return Err(ApiError::new(StatusCode::UNAUTHORIZED, "auth/oauth-state", "invalid oauth state"));
    }

    let access_token = github::exchange_code(config, &params.code)
        .await
        .map_err(|e| github_error(&e))?;
    let account = federated_account(&state, &access_token).await?;
    let email = account.email.clone();

    let (jar, _) = start_session(&state, jar, account).await?;
    seed_profile_best_effort(&state, &email).await;
    let jar = jar.add(expired_cookie(OAUTH_STATE_COOKIE_NAME, &state.auth));
    Ok((jar, Redirect::temporary("/dashboard")).into_response())
}

#[derive(Deserialize)]
pub struct GitHubTokenBody {
    pub access_token: String,
}

/// `POST /api/auth/github/token`: sign in with a GitHub access token obtained
/// by a non-browser client.
pub async fn github_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<GitHubTokenBody>,
) -> Result<Response, ApiError> {
    if state.github.is_none() {
        return Err(github_not_configured());
    }
    let account = federated_account(&state, body.access_token.trim()).await?;
    let (jar, signed_in) = start_session(&state, jar, account).await?;
    Ok((jar, Json(signed_in)).into_response())
}

async fn federated_account(state: &AppState, access_token: &str) -> Result<AccountRow, ApiError> {
    let identity = github::fetch_identity(access_token).await.map_err(|e| github_error(&e))?;
    account::upsert_federated(&state.pool, &identity.email, identity.github_id)
        .await
        .map_err(|e| account_error(&e))
}

// =============================================================================
// PASSWORD RESET
// =============================================================================

#[derive(Deserialize)]
pub struct ResetRequestBody {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetConfirmBody {
    pub token: String,
    pub password: String,
}

/// `POST /api/auth/password-reset`: dispatch a reset email.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<ResetRequestBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    password_reset::request_reset(&state.pool, state.mailer.as_ref(), &state.auth.public_base_url, &body.email)
        .await
        .map_err(|e| reset_error(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/auth/password-reset/confirm`: consume a token, set a password.
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(body): Json<ResetConfirmBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    password_reset::confirm_reset(&state.pool, &body.token, &body.password)
        .await
        .map_err(|e| reset_error(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// SESSION
// =============================================================================

/// `GET /api/auth/me`: return current user.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout`: delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, "session delete failed during logout");
    }

    let jar = CookieJar::new().add(expired_cookie(COOKIE_NAME, &state.auth));
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
