//! Component routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use records::Component;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::auth::AuthUser;
use crate::services::component::{self, ComponentError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateComponentBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub(crate) fn component_error(err: &ComponentError) -> ApiError {
    let status = match err {
        ComponentError::NotFound(_) => StatusCode::NOT_FOUND,
        ComponentError::Input(_) => StatusCode::BAD_REQUEST,
        ComponentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::from_coded(status, err)
}

/// `GET /api/components`: every component.
pub async fn list_components(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Component>>, ApiError> {
    let items = component::list_components(&state.pool)
        .await
        .map_err(|e| component_error(&e))?;
    Ok(Json(items))
}

/// `POST /api/components`: create a component owned by the caller.
pub async fn create_component(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateComponentBody>,
) -> Result<(StatusCode, Json<Component>), ApiError> {
    let created = component::create_component(&state.pool, &body.name, body.description.as_deref(), &auth.user.email)
        .await
        .map_err(|e| component_error(&e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `DELETE /api/components/{id}`.
pub async fn delete_component(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let component_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::new(StatusCode::NOT_FOUND, "component/not-found", "component not found"))?;
    component::delete_component(&state.pool, component_id)
        .await
        .map_err(|e| component_error(&e))?;
    Ok(StatusCode::NO_CONTENT)
}
