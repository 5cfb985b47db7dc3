//! Component list manager. Every mutation is followed by a full refetch. The
//! one local edit is after a create whose refetch fails: the stored record is
//! appended so the list still shows it.

use std::sync::atomic::AtomicBool;
use std::sync::{Mutex, PoisonError};

use records::{Component, filter_components, messages, normalize_component_input};

use crate::backend::DocumentStore;
use crate::flow::{ErrorSlot, FlowError, SubmitGuard};

#[derive(Default)]
pub struct ComponentListManager {
    submitting: AtomicBool,
    error: ErrorSlot,
    items: Mutex<Vec<Component>>,
}

impl ComponentListManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    /// Components whose name contains `search`, case-insensitively.
    #[must_use]
    pub fn visible(&self, search: &str) -> Vec<Component> {
        filter_components(&self.items.lock().unwrap_or_else(PoisonError::into_inner), search)
    }

    /// # Errors
    ///
    /// [`FlowError::Failed`] when the fetch fails; the previous list is kept.
    pub async fn load(&self, store: &dyn DocumentStore) -> Result<(), FlowError> {
        let result = self.refetch(store).await;
        self.error.record(result)
    }

    async fn refetch(&self, store: &dyn DocumentStore) -> Result<(), FlowError> {
        let fetched = store.list_components().await.map_err(|e| {
            tracing::error!(error = %e, "loading components failed");
            FlowError::failed(messages::COMPONENTS_LOAD_FAILED)
        })?;
        *self.items.lock().unwrap_or_else(PoisonError::into_inner) = fetched;
        Ok(())
    }

    /// Persist a component owned by the signed-in user, then refetch. Once the
    /// create succeeds the call succeeds; a failed refetch is only logged.
    ///
    /// # Errors
    ///
    /// [`FlowError::Invalid`] for a blank name, [`FlowError::Failed`] when the
    /// create fails.
    pub async fn add(
        &self,
        store: &dyn DocumentStore,
        name: &str,
        description: Option<&str>,
    ) -> Result<Component, FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let result = async {
            let (name, description) =
                normalize_component_input(name, description).map_err(|e| FlowError::invalid(e.to_string()))?;
            let created = store.create_component(&name, &description).await.map_err(|e| {
                tracing::error!(error = %e, "creating component failed");
                FlowError::failed(messages::CREATE_COMPONENT_FAILED)
            })?;
            if let Err(e) = self.refetch(store).await {
                tracing::warn!(error = %e, component_id = %created.id, "component stored but list refresh failed");
                self.items.lock().unwrap_or_else(PoisonError::into_inner).push(created.clone());
            }
            Ok(created)
        }
        .await;
        self.error.record(result)
    }

    /// # Errors
    ///
    /// [`FlowError::Failed`] when the delete or the refetch fails.
    pub async fn delete(&self, store: &dyn DocumentStore, id: &str) -> Result<(), FlowError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;
        let result = async {
            store.delete_component(id).await.map_err(|e| {
                tracing::error!(error = %e, component_id = %id, "deleting component failed");
                FlowError::failed(messages::DELETE_COMPONENT_FAILED)
            })?;
            self.refetch(store).await
        }
        .await;
        self.error.record(result)
    }
}

#[cfg(test)]
#[path = "components_test.rs"]
mod tests;
