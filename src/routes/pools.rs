//! Pool routes: owned-pool listing, create/delete, and membership edits.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use records::Pool;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::auth::AuthUser;
use crate::services::pool::{self, PoolError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreatePoolBody {
    pub name: String,
}

#[derive(Deserialize)]
pub struct AddMemberBody {
    pub email: String,
}

pub(crate) fn pool_error(err: &PoolError) -> ApiError {
    let status = match err {
        PoolError::NotFound(_) => StatusCode::NOT_FOUND,
        PoolError::Forbidden => StatusCode::FORBIDDEN,
        PoolError::EmptyName => StatusCode::BAD_REQUEST,
        PoolError::Member(member) => match member {
            records::MemberError::Empty | records::MemberError::InvalidEmail => StatusCode::BAD_REQUEST,
            records::MemberError::AlreadyMember | records::MemberError::IsOwner => StatusCode::CONFLICT,
            records::MemberError::NotMember => StatusCode::NOT_FOUND,
        },
        PoolError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::from_coded(status, err)
}

/// Ids arrive as path text; anything that is not a UUID cannot exist.
pub(crate) fn parse_pool_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::new(StatusCode::NOT_FOUND, "pool/not-found", records::messages::POOL_NOT_FOUND)
    })
}

/// `GET /api/pools`: pools owned by the caller.
pub async fn list_pools(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<Pool>>, ApiError> {
    let pools = pool::list_owned_pools(&state.pool, &auth.user.email)
        .await
        .map_err(|e| pool_error(&e))?;
    Ok(Json(pools))
}

/// `POST /api/pools`: create a pool owned by the caller.
pub async fn create_pool(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreatePoolBody>,
) -> Result<(StatusCode, Json<Pool>), ApiError> {
    let created = pool::create_pool(&state.pool, &body.name, &auth.user.email)
        .await
        .map_err(|e| pool_error(&e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/pools/{id}`: fetch one pool.
pub async fn get_pool(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Pool>, ApiError> {
    let pool_id = parse_pool_id(&id)?;
    let found = pool::get_pool(&state.pool, pool_id).await.map_err(|e| pool_error(&e))?;
    Ok(Json(found))
}

/// `DELETE /api/pools/{id}`: owner-only delete.
pub async fn delete_pool(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let pool_id = parse_pool_id(&id)?;
    pool::delete_pool(&state.pool, pool_id, &auth.user.email)
        .await
        .map_err(|e| pool_error(&e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/pools/{id}/members`: add a member email.
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<AddMemberBody>,
) -> Result<Json<Pool>, ApiError> {
    let pool_id = parse_pool_id(&id)?;
    let updated = pool::add_member(&state.pool, pool_id, &auth.user.email, &body.email)
        .await
        .map_err(|e| pool_error(&e))?;
    Ok(Json(updated))
}

/// `DELETE /api/pools/{id}/members/{email}`: remove a member email.
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, email)): Path<(String, String)>,
) -> Result<Json<Pool>, ApiError> {
    let pool_id = parse_pool_id(&id)?;
    let updated = pool::remove_member(&state.pool, pool_id, &auth.user.email, &email)
        .await
        .map_err(|e| pool_error(&e))?;
    Ok(Json(updated))
}

#[cfg(test)]
#[path = "pools_test.rs"]
mod tests;
