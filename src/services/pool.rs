//! Pool service: owned-pool listing, create/delete, and membership edits.
//!
//! DESIGN
//! ======
//! Members are a Postgres `text[]` column. Additions and removals are single
//! `UPDATE` statements (`array_append` guarded by `ANY`, `array_remove`) so
//! two concurrent edits cannot lose each other's writes. The row CHECK keeps
//! the owner inside `members` no matter what reaches the database.
//!
//! AUTHORIZATION
//! =============
//! Any signed-in account may read a pool by id. Deleting a pool and editing
//! its members is reserved to the owner; the client hides those controls too.

use records::{MemberError, Pool, check_member_removal, check_new_member};
use sqlx::PgPool;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("pool not found: {0}")]
    NotFound(Uuid),
    #[error("only the pool owner can do that")]
    Forbidden,
    #[error("pool name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Member(#[from] MemberError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for PoolError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "pool/not-found",
            Self::Forbidden => "pool/forbidden",
            Self::EmptyName => "pool/empty-name",
            Self::Member(err) => err.code(),
            Self::Database(_) => "store/unavailable",
        }
    }
}

type PoolTuple = (Uuid, String, String, Vec<String>);

fn to_pool((id, name, owner, members): PoolTuple) -> Pool {
    Pool { id: id.to_string(), name, owner, members }
}

// =============================================================================
// CRUD
// =============================================================================

/// List pools owned by `owner`, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_owned_pools(pool: &PgPool, owner: &str) -> Result<Vec<Pool>, PoolError> {
    let rows = sqlx::query_as::<_, PoolTuple>(
        "SELECT id, name, owner_email, members
         FROM pools
         WHERE owner_email = $1
         ORDER BY created_at DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(to_pool).collect())
}

/// Create a pool owned by `owner` with the owner as its only member.
///
/// # Errors
///
/// [`PoolError::EmptyName`] for a blank name, or a database error.
pub async fn create_pool(pool: &PgPool, name: &str, owner: &str) -> Result<Pool, PoolError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PoolError::EmptyName);
    }

    let id = Uuid::new_v4();
    let members = vec![owner.to_owned()];
    sqlx::query("INSERT INTO pools (id, name, owner_email, members) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(name)
        .bind(owner)
        .bind(&members)
        .execute(pool)
        .await?;

    tracing::info!(pool_id = %id, %owner, "pool created");
    Ok(Pool { id: id.to_string(), name: name.to_owned(), owner: owner.to_owned(), members })
}

/// Fetch a single pool.
///
/// # Errors
///
/// [`PoolError::NotFound`] when the id is unknown, or a database error.
pub async fn get_pool(pool: &PgPool, pool_id: Uuid) -> Result<Pool, PoolError> {
    sqlx::query_as::<_, PoolTuple>("SELECT id, name, owner_email, members FROM pools WHERE id = $1")
        .bind(pool_id)
        .fetch_optional(pool)
        .await?
        .map(to_pool)
        .ok_or(PoolError::NotFound(pool_id))
}

/// Delete a pool. Only its owner may do this.
///
/// # Errors
///
/// [`PoolError::NotFound`], [`PoolError::Forbidden`], or a database error.
pub async fn delete_pool(pool: &PgPool, pool_id: Uuid, caller: &str) -> Result<(), PoolError> {
    let result = sqlx::query("DELETE FROM pools WHERE id = $1 AND owner_email = $2")
        .bind(pool_id)
        .bind(caller)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        // Distinguish a missing pool from someone else's.
        get_pool(pool, pool_id).await?;
        return Err(PoolError::Forbidden);
    }
    tracing::info!(%pool_id, "pool deleted");
    Ok(())
}

// =============================================================================
// MEMBERSHIP
// =============================================================================

/// Add `email` to the pool's members and return the updated pool.
///
/// # Errors
///
/// Membership validation errors, [`PoolError::Forbidden`] for non-owners,
/// [`PoolError::NotFound`], or a database error.
pub async fn add_member(pool: &PgPool, pool_id: Uuid, caller: &str, email: &str) -> Result<Pool, PoolError> {
    let current = get_pool(pool, pool_id).await?;
    if !current.is_owned_by(caller) {
        return Err(PoolError::Forbidden);
    }
    let email = check_new_member(&current, email)?;

    let updated = sqlx::query_as::<_, PoolTuple>(
        r"UPDATE pools
          SET members = array_append(members, $2)
          WHERE id = $1 AND NOT ($2 = ANY (members))
          RETURNING id, name, owner_email, members",
    )
    .bind(pool_id)
    .bind(&email)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(row) => Ok(to_pool(row)),
        // Lost a race with another add of the same email, or the pool vanished.
        None => {
            get_pool(pool, pool_id).await?;
            Err(MemberError::AlreadyMember.into())
        }
    }
}

/// Remove `email` from the pool's members and return the updated pool.
///
/// # Errors
///
/// [`MemberError::IsOwner`] / [`MemberError::NotMember`] via
/// [`PoolError::Member`], [`PoolError::Forbidden`] for non-owners,
/// [`PoolError::NotFound`], or a database error.
pub async fn remove_member(pool: &PgPool, pool_id: Uuid, caller: &str, email: &str) -> Result<Pool, PoolError> {
    let current = get_pool(pool, pool_id).await?;
    if !current.is_owned_by(caller) {
        return Err(PoolError::Forbidden);
    }
    check_member_removal(&current, email)?;

    sqlx::query_as::<_, PoolTuple>(
        r"UPDATE pools
          SET members = array_remove(members, $2)
          WHERE id = $1 AND owner_email <> $2
          RETURNING id, name, owner_email, members",
    )
    .bind(pool_id)
    .bind(email)
    .fetch_optional(pool)
    .await?
    .map(to_pool)
    .ok_or(PoolError::NotFound(pool_id))
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;
