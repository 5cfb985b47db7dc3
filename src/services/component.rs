//! Component catalogue. Components are shared by every signed-in account and
//! carry no ownership gate beyond recording who created them.

use records::{Component, ComponentInputError, normalize_component_input};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("component not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Input(#[from] ComponentInputError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for ComponentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "component/not-found",
            Self::Input(_) => "component/empty-name",
            Self::Database(_) => "store/unavailable",
        }
    }
}

type ComponentTuple = (Uuid, String, String, String, String);

fn to_component((id, name, description, owner, created_at): ComponentTuple) -> Component {
    Component { id: id.to_string(), name, description, owner, created_at }
}

/// List every component, oldest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_components(pool: &PgPool) -> Result<Vec<Component>, ComponentError> {
    let rows = sqlx::query_as::<_, ComponentTuple>(
        r#"SELECT id, name, description, owner_email,
                  to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"')
           FROM components
           ORDER BY created_at ASC, id ASC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(to_component).collect())
}

/// Create a component owned by `owner`, stamped with the current time.
///
/// # Errors
///
/// [`ComponentError::Input`] for a blank name, or a database error.
pub async fn create_component(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    owner: &str,
) -> Result<Component, ComponentError> {
    let (name, description) = normalize_component_input(name, description)?;
    let id = Uuid::new_v4();

    let row = sqlx::query_as::<_, ComponentTuple>(
        r#"INSERT INTO components (id, name, description, owner_email)
           VALUES ($1, $2, $3, $4)
           RETURNING id, name, description, owner_email,
                     to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"')"#,
    )
    .bind(id)
    .bind(&name)
    .bind(&description)
    .bind(owner)
    .fetch_one(pool)
    .await?;

    tracing::info!(component_id = %id, %owner, "component created");
    Ok(to_component(row))
}

/// Delete a component by id.
///
/// # Errors
///
/// [`ComponentError::NotFound`] when nothing was deleted, or a database error.
pub async fn delete_component(pool: &PgPool, component_id: Uuid) -> Result<(), ComponentError> {
    let result = sqlx::query("DELETE FROM components WHERE id = $1")
        .bind(component_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ComponentError::NotFound(component_id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "component_test.rs"]
mod tests;
