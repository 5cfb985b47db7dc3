//! Profile routes. A caller can only see and seed their own profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use records::UserProfile;

use crate::error::ApiError;
use crate::routes::auth::AuthUser;
use crate::services::profile::{self, ProfileError};
use crate::state::AppState;

fn profile_error(err: &ProfileError) -> ApiError {
    let status = match err {
        ProfileError::NotFound => StatusCode::NOT_FOUND,
        ProfileError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::from_coded(status, err)
}

/// `GET /api/profile`: 404 until seeded.
pub async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserProfile>, ApiError> {
    let found = profile::get_profile(&state.pool, &auth.user.email)
        .await
        .map_err(|e| profile_error(&e))?;
    Ok(Json(found))
}

/// `PUT /api/profile`: seed the default profile if absent, return what is stored.
pub async fn seed_profile(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserProfile>, ApiError> {
    let stored = profile::ensure_profile(&state.pool, &auth.user.email)
        .await
        .map_err(|e| profile_error(&e))?;
    Ok(Json(stored))
}

/// Seed the caller's profile after a browser sign-in. A failure is logged and
/// the sign-in still goes through.
pub(crate) async fn seed_profile_best_effort(state: &AppState, email: &str) {
    if let Err(e) = profile::ensure_profile(&state.pool, email).await {
        tracing::warn!(error = %e, "profile seed failed; continuing sign-in");
    }
}
