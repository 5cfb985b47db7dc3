//! Pool list and pool detail managers.
//!
//! Both keep their view state behind a mutex that is never held across an
//! await; remote results are merged back in after the call completes. A
//! failed call leaves the previous view state untouched.

use std::sync::atomic::AtomicBool;
use std::sync::{Mutex, MutexGuard, PoisonError};

use records::{
    MemberError, Pool, PoolItem, SortDirection, SortField, check_member_removal, check_new_member,
    filter_and_sort, messages,
};

use crate::backend::DocumentStore;
use crate::flow::{ErrorSlot, FlowError, SubmitGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// LIST
// =============================================================================

#[derive(Default)]
struct ListState {
    items: Vec<PoolItem>,
    search: String,
    field: SortField,
    direction: SortDirection,
}

/// The dashboard's list of pools owned by the signed-in user.
pub struct PoolListManager {
    current_user: String,
    submitting: AtomicBool,
    error: ErrorSlot,
    state: Mutex<ListState>,
}

impl PoolListManager {
    #[must_use]
    pub fn new(current_user: impl Into<String>) -> Self {
        Self {
            current_user: current_user.into(),
            submitting: AtomicBool::new(false),
            error: ErrorSlot::default(),
            state: Mutex::new(ListState::default()),
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    /// Replace the list with the caller's owned pools.
    ///
    /// # Errors
    ///
    /// [`FlowError::Failed`] when the fetch fails; the previous list is kept.
    pub async fn load(&self, store: &dyn DocumentStore) -> Result<(), FlowError> {
        let result = match store.list_owned_pools().await {
            Ok(pools) => {
                lock(&self.state).items = pools.iter().map(PoolItem::from).collect();
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "loading pools failed");
                Err(FlowError::failed(messages::POOLS_LOAD_FAILED))
            }
        };
        self.error.record(result)
    }

    /// Rows after applying the current search term and sort.
    #[must_use]
    pub fn visible(&self) -> Vec<PoolItem> {
        let state = lock(&self.state);
        filter_and_sort(&state.items, &state.search, state.field, state.direction)
    }

    pub fn set_search(&self, term: impl Into<String>) {
        lock(&self.state).search = term.into();
    }

    /// Sort by `field`. Selecting the active field again flips the direction;
    /// a new field starts ascending.
    pub fn sort_by(&self, field: SortField) {
        let mut state = lock(&self.state);
        if state.field == field {
            state.direction = state.direction.toggle();
        } else {
            state.field = field;
            state.direction = SortDirection::Asc;
        }
    }

    pub fn set_sort(&self, field: SortField, direction: SortDirection) {
        let mut state = lock(&self.state);
        state.field = field;
        state.direction = direction;
    }

    #[must_use]
    pub fn sort(&self) -> (SortField, SortDirection) {
        let state = lock(&self.state);
        (state.field, state.direction)
    }

    #[must_use]
    pub fn can_delete(&self, item: &PoolItem) -> bool {
        item.can_delete(&self.current_user)
    }

    /// Persist a new pool and append the stored record to the list.
    ///
    /// # Errors
    ///
    /// [`FlowError::Invalid`] for a blank name, [`FlowError::Failed`] when the
    /// store rejects the create.
    pub async fn add_pool(&self, store: &dyn DocumentStore, name: &str) -> Result<PoolItem, FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let result = async {
            let name = name.trim();
            if name.is_empty() {
                return Err(FlowError::invalid(messages::EMPTY_POOL_NAME));
            }
            let created = store.create_pool(name).await.map_err(|e| {
                tracing::error!(error = %e, "creating pool failed");
                FlowError::failed(messages::CREATE_POOL_FAILED)
            })?;
            let item = PoolItem::from(&created);
            lock(&self.state).items.push(item.clone());
            Ok(item)
        }
        .await;
        self.error.record(result)
    }

    /// Delete a pool remotely, then drop it from the list. Only the owner may
    /// delete; anyone else is refused without a request.
    ///
    /// # Errors
    ///
    /// [`FlowError::Invalid`] for an unknown row or a non-owner,
    /// [`FlowError::Failed`] when the store rejects the delete.
    pub async fn delete_pool(&self, store: &dyn DocumentStore, id: &str) -> Result<(), FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let result = async {
            let item = lock(&self.state).items.iter().find(|item| item.id == id).cloned();
            let Some(item) = item else {
                return Err(FlowError::invalid(messages::POOL_NOT_FOUND));
            };
            if !self.can_delete(&item) {
                return Err(FlowError::invalid(messages::NOT_POOL_OWNER));
            }
            store.delete_pool(id).await.map_err(|e| {
                tracing::error!(error = %e, pool_id = %id, "deleting pool failed");
                FlowError::failed(messages::DELETE_POOL_FAILED)
            })?;
            lock(&self.state).items.retain(|item| item.id != id);
            Ok(())
        }
        .await;
        self.error.record(result)
    }
}

// =============================================================================
// DETAIL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailStatus {
    Loading,
    Loaded(Pool),
    NotFound,
    /// Fetch failed; carries the message to show.
    Failed(String),
}

/// One pool's page: its members and, for the owner, membership controls.
pub struct PoolDetailManager {
    current_user: String,
    submitting: AtomicBool,
    error: ErrorSlot,
    status: Mutex<DetailStatus>,
}

impl PoolDetailManager {
    #[must_use]
    pub fn new(current_user: impl Into<String>) -> Self {
        Self {
            current_user: current_user.into(),
            submitting: AtomicBool::new(false),
            error: ErrorSlot::default(),
            status: Mutex::new(DetailStatus::Loading),
        }
    }

    #[must_use]
    pub fn status(&self) -> DetailStatus {
        lock(&self.status).clone()
    }

    #[must_use]
    pub fn pool(&self) -> Option<Pool> {
        match &*lock(&self.status) {
            DetailStatus::Loaded(pool) => Some(pool.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    /// Membership controls are shown to the owner only.
    #[must_use]
    pub fn can_manage(&self) -> bool {
        self.pool().is_some_and(|pool| pool.is_owned_by(&self.current_user))
    }

    /// Fetch the pool. Not-found and fetch failure end in different states.
    pub async fn load(&self, store: &dyn DocumentStore, id: &str) -> DetailStatus {
        *lock(&self.status) = DetailStatus::Loading;
        let next = match store.get_pool(id).await {
            Ok(Some(pool)) => DetailStatus::Loaded(pool),
            Ok(None) => DetailStatus::NotFound,
            Err(e) => {
                tracing::error!(error = %e, pool_id = %id, "loading pool failed");
                DetailStatus::Failed(messages::POOL_LOAD_FAILED.to_owned())
            }
        };
        *lock(&self.status) = next.clone();
        next
    }

    /// Loaded pool the current user owns, or the reason they can't edit it.
    fn managed_pool(&self) -> Result<Pool, FlowError> {
        let pool = self.pool().ok_or_else(|| FlowError::invalid(messages::POOL_MISSING))?;
        if !pool.is_owned_by(&self.current_user) {
            return Err(FlowError::invalid(messages::NOT_POOL_OWNER));
        }
        Ok(pool)
    }

    /// Apply `edit` to the loaded pool if it is still the one with `id`.
    fn mirror(&self, id: &str, edit: impl FnOnce(&mut Pool)) {
        if let DetailStatus::Loaded(pool) = &mut *lock(&self.status)
            && pool.id == id
        {
            edit(pool);
        }
    }

    /// Add a member remotely, then mirror it locally.
    ///
    /// # Errors
    ///
    /// [`FlowError::Invalid`] for empty, malformed or duplicate input and for
    /// non-owners; [`FlowError::Failed`] when the store rejects the change.
    pub async fn add_member(&self, store: &dyn DocumentStore, email: &str) -> Result<(), FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let result = async {
            let pool = self.managed_pool()?;
            let email = check_new_member(&pool, email).map_err(|e| FlowError::invalid(e.to_string()))?;
            store.add_member(&pool.id, &email).await.map_err(|e| {
                if e.is(MemberError::AlreadyMember.code()) {
                    FlowError::failed(messages::ALREADY_MEMBER)
                } else {
                    tracing::error!(error = %e, pool_id = %pool.id, "adding member failed");
                    FlowError::failed(messages::ADD_MEMBER_FAILED)
                }
            })?;
            self.mirror(&pool.id, |p| {
                if !p.members.contains(&email) {
                    p.members.push(email.clone());
                }
            });
            tracing::info!(pool_id = %pool.id, member = %email, "member added");
            Ok(())
        }
        .await;
        self.error.record(result)
    }

    /// Remove a member remotely, then mirror it locally. The owner can never
    /// be removed.
    ///
    /// # Errors
    ///
    /// [`FlowError::Invalid`] for the owner, a non-member or a non-owner
    /// caller; [`FlowError::Failed`] when the store rejects the change.
    pub async fn remove_member(&self, store: &dyn DocumentStore, email: &str) -> Result<(), FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let result = async {
            let email = email.trim();
            let pool = self.managed_pool()?;
            check_member_removal(&pool, email).map_err(|e| FlowError::invalid(e.to_string()))?;
            store.remove_member(&pool.id, email).await.map_err(|e| {
                tracing::error!(error = %e, pool_id = %pool.id, "removing member failed");
                FlowError::failed(messages::REMOVE_MEMBER_FAILED)
            })?;
            self.mirror(&pool.id, |p| p.members.retain(|m| m != email));
            tracing::info!(pool_id = %pool.id, member = %email, "member removed");
            Ok(())
        }
        .await;
        self.error.record(result)
    }
}

#[cfg(test)]
#[path = "pools_test.rs"]
mod tests;
