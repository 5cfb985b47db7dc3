//! Shared pieces of every manager: the duplicate-submission guard and the
//! error a flow reports to the user.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// User-facing failure of a manager operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// A previous submission from the same manager is still in flight.
    #[error("a request is already in progress")]
    Busy,
    /// Rejected locally; no request was sent.
    #[error("{0}")]
    Invalid(String),
    /// The backend call failed.
    #[error("{0}")]
    Failed(String),
}

impl FlowError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Set while a submission runs; cleared when dropped.
pub struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    /// # Errors
    ///
    /// [`FlowError::Busy`] when the flag is already set.
    pub fn acquire(flag: &'a AtomicBool) -> Result<Self, FlowError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| FlowError::Busy)
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Last user-facing error of a manager; replaced by every completed submission.
#[derive(Debug, Default)]
pub struct ErrorSlot(Mutex<Option<String>>);

impl ErrorSlot {
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Store the outcome's message (or clear it on success) and pass it through.
    pub fn record<T>(&self, result: Result<T, FlowError>) -> Result<T, FlowError> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = result.as_ref().err().map(ToString::to_string);
        result
    }
}

#[cfg(test)]
#[path = "flow_test.rs"]
mod tests;
