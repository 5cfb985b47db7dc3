//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the JSON API used by the `pool` client, the GitHub
//! OAuth endpoints, the HTML sign-in/reset forms, and the gated dashboard
//! views. CORS admits any origin but never credentials, so a foreign page
//! cannot ride a browser session.

pub mod auth;
pub mod components;
pub mod pages;
pub mod pools;
pub mod profile;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// JSON API routes.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/github/token", post(auth::github_token))
        .route("/api/auth/password-reset", post(auth::request_password_reset))
        .route("/api/auth/password-reset/confirm", post(auth::confirm_password_reset))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/profile", get(profile::get_profile).put(profile::seed_profile))
        .route("/api/pools", get(pools::list_pools).post(pools::create_pool))
        .route("/api/pools/{id}", get(pools::get_pool).delete(pools::delete_pool))
        .route("/api/pools/{id}/members", post(pools::add_member))
        .route("/api/pools/{id}/members/{email}", delete(pools::remove_member))
        .route("/api/components", get(components::list_components).post(components::create_component))
        .route("/api/components/{id}", delete(components::delete_component))
}

/// Navigable routes. Everything in `protected` sits behind the session gate.
fn page_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/pool/{id}", get(pages::pool_detail))
        .route("/components", get(pages::components))
        .route_layer(middleware::from_fn_with_state(state.clone(), pages::require_session));

    Router::new()
        .route("/", get(pages::root_redirect))
        .route("/login", get(pages::login_page).post(pages::login_submit))
        .route("/forgot-password", get(pages::forgot_password_page).post(pages::forgot_password_submit))
        .route("/forgot-password/confirm", post(pages::reset_confirm_submit))
        .route("/auth/github", get(auth::github_redirect))
        .route("/auth/github/callback", get(auth::github_callback))
        .merge(protected)
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes())
        .merge(page_routes(&state))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
