//! Navigable routes: the sign-in and reset forms, the session gate, and the
//! protected dashboard views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected views sit behind [`require_session`]. A request without a valid
//! session cookie is redirected to `/login`; otherwise the resolved
//! [`SessionUser`] is placed in request extensions for the handler. The
//! protected views answer with JSON view models so any front end (or the
//! `pool` client) can render them.

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::{Extension, Form};
use axum_extra::extract::cookie::CookieJar;
use records::{Component, Pool, PoolItem, SessionInfo, messages, validate_email};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::auth::{self, AuthUser};
use crate::routes::components::component_error;
use crate::routes::pools::{parse_pool_id, pool_error};
use crate::routes::profile::seed_profile_best_effort;
use crate::services::account::{self, AccountError};
use crate::services::session::SessionUser;
use crate::services::{component, password_reset, pool};
use crate::state::AppState;

const LOGIN_TEMPLATE: &str = include_str!("../../templates/login.html");
const FORGOT_PASSWORD_TEMPLATE: &str = include_str!("../../templates/forgot_password.html");

// =============================================================================
// SESSION GATE
// =============================================================================

/// Middleware guarding protected views.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match AuthUser::from_jar(&state, &jar).await {
        Ok(Some(auth)) => {
            request.extensions_mut().insert(auth.user);
            next.run(request).await
        }
        Ok(None) => Redirect::temporary("/login").into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn root_redirect() -> Redirect {
    Redirect::temporary("/dashboard")
}

// =============================================================================
// HTML FORMS
// =============================================================================

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

enum Notice<'a> {
    None,
    Info(&'a str),
    Error(&'a str),
}

impl Notice<'_> {
    fn render(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Info(msg) => format!(r#"<p class="notice" style="color: #32a852;">{}</p>"#, escape_html(msg)),
            Self::Error(msg) => format!(r#"<p class="error" style="color: #c0392b;">{}</p>"#, escape_html(msg)),
        }
    }
}

fn render_login(state: &AppState, notice: &Notice<'_>, email: &str) -> Html<String> {
    let github = if state.github.is_some() {
        r#"<p><a href="/auth/github">Sign in with GitHub</a></p>"#
    } else {
        ""
    };
    Html(
        LOGIN_TEMPLATE
            .replace("{{NOTICE}}", &notice.render())
            .replace("{{EMAIL}}", &escape_html(email))
            .replace("{{GITHUB}}", github),
    )
}

fn render_forgot_password(notice: &Notice<'_>, email: &str, token: Option<&str>) -> Html<String> {
    let form = match token {
        Some(token) => format!(
            r#"<form method="post" action="/forgot-password/confirm">
      <input type="hidden" name="token" value="{}">
      <label>New password <input type="password" name="password" required></label><br>
      <button type="submit">Set password</button>
    </form>"#,
            escape_html(token)
        ),
        None => format!(
            r#"<form method="post" action="/forgot-password">
      <label>Email <input type="email" name="email" value="{}" required></label><br>
      <button type="submit">Send reset email</button>
    </form>"#,
            escape_html(email)
        ),
    };
    Html(FORGOT_PASSWORD_TEMPLATE.replace("{{NOTICE}}", &notice.render()).replace("{{FORM}}", &form))
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// `GET /login`
pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    render_login(&state, &Notice::None, "")
}

/// `POST /login`: validate, sign in, seed the profile, go to the dashboard.
pub async fn login_submit(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let email = form.email.trim();
    if !validate_email(email) {
        let page = render_login(&state, &Notice::Error(messages::INVALID_EMAIL), email);
        return (StatusCode::BAD_REQUEST, page).into_response();
    }

    let signed_in = match account::sign_in(&state.pool, email, &form.password).await {
        Ok(account) => account,
        Err(AccountError::InvalidCredential) => {
            let page = render_login(&state, &Notice::Error(messages::INVALID_CREDENTIAL), email);
            return (StatusCode::UNAUTHORIZED, page).into_response();
        }
        Err(err) => {
            let status = auth::account_error(&err).status;
            let page = render_login(&state, &Notice::Error(messages::LOGIN_FAILED), email);
            return (status, page).into_response();
        }
    };

    let account_email = signed_in.email.clone();
    let jar = match auth::start_session(&state, jar, signed_in).await {
        Ok((jar, _)) => jar,
        Err(err) => {
            let page = render_login(&state, &Notice::Error(messages::LOGIN_FAILED), email);
            return (err.status, page).into_response();
        }
    };
    seed_profile_best_effort(&state, &account_email).await;
    (jar, Redirect::to("/dashboard")).into_response()
}

#[derive(Deserialize)]
pub struct ForgotPasswordQuery {
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetConfirmForm {
    pub token: String,
    pub password: String,
}

/// `GET /forgot-password[?token=..]`
pub async fn forgot_password_page(Query(query): Query<ForgotPasswordQuery>) -> Html<String> {
    let token = query.token.as_deref().filter(|t| !t.trim().is_empty());
    render_forgot_password(&Notice::None, "", token)
}

/// `POST /forgot-password`: request a reset email and re-render.
pub async fn forgot_password_submit(State(state): State<AppState>, Form(form): Form<ForgotPasswordForm>) -> Response {
    let email = form.email.trim();
    if !validate_email(email) {
        let page = render_forgot_password(&Notice::Error(messages::INVALID_EMAIL), email, None);
        return (StatusCode::BAD_REQUEST, page).into_response();
    }

    match password_reset::request_reset(&state.pool, state.mailer.as_ref(), &state.auth.public_base_url, email).await {
        Ok(()) => render_forgot_password(&Notice::Info(messages::RESET_SENT), "", None).into_response(),
        Err(err) => {
            let status = auth::reset_error(&err).status;
            let page = render_forgot_password(&Notice::Error(messages::RESET_FAILED), email, None);
            (status, page).into_response()
        }
    }
}

/// `POST /forgot-password/confirm`: set the new password.
pub async fn reset_confirm_submit(State(state): State<AppState>, Form(form): Form<ResetConfirmForm>) -> Response {
    match password_reset::confirm_reset(&state.pool, &form.token, &form.password).await {
        Ok(_) => render_forgot_password(&Notice::Info(messages::PASSWORD_UPDATED), "", None).into_response(),
        Err(err) => {
            let api = auth::reset_error(&err);
            let page = render_forgot_password(&Notice::Error(&api.message), "", Some(&form.token));
            (api.status, page).into_response()
        }
    }
}

// =============================================================================
// PROTECTED VIEWS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user: SessionInfo,
    pub pools: Vec<PoolItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolView {
    pub pool: Pool,
    /// Owner-only controls (add/remove member, delete) are shown when set.
    pub can_manage: bool,
}

#[derive(Debug, Serialize)]
pub struct ComponentsView {
    pub components: Vec<Component>,
}

fn session_info(user: &SessionUser) -> SessionInfo {
    SessionInfo { email: user.email.clone(), username: user.username.clone() }
}

/// `GET /dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<DashboardView>, ApiError> {
    let pools = pool::list_owned_pools(&state.pool, &user.email)
        .await
        .map_err(|e| pool_error(&e))?;
    Ok(Json(DashboardView { user: session_info(&user), pools: pools.iter().map(PoolItem::from).collect() }))
}

/// `GET /dashboard/pool/{id}`
pub async fn pool_detail(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
) -> Result<Json<PoolView>, ApiError> {
    let pool_id = parse_pool_id(&id)?;
    let found = pool::get_pool(&state.pool, pool_id).await.map_err(|e| pool_error(&e))?;
    let can_manage = found.is_owned_by(&user.email);
    Ok(Json(PoolView { pool: found, can_manage }))
}

/// `GET /components`
pub async fn components(
    State(state): State<AppState>,
    Extension(_user): Extension<SessionUser>,
) -> Result<Json<ComponentsView>, ApiError> {
    let components = component::list_components(&state.pool)
        .await
        .map_err(|e| component_error(&e))?;
    Ok(Json(ComponentsView { components }))
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
