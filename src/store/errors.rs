//! # Store Errors
//!
//! Closed set of failure kinds a gear store can report.

use thiserror::Error;

use crate::model::{GearId, IdError};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Gear store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Point lookup matched no document
    #[error("no {kind} found with id {id}")]
    NotFound { kind: &'static str, id: GearId },

    /// Update did not match and modify exactly one document
    #[error("could not update {kind} {id}: matched {matched} and modified {modified} documents, expected exactly 1 of each")]
    Conflict {
        kind: &'static str,
        id: GearId,
        matched: u64,
        modified: u64,
    },

    /// Transport, timeout, encoding, or driver failure
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Malformed identifier or query value
    #[error("{0}")]
    Validation(String),
}

impl StoreError {
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Check if this is the store's "no documents" signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<IdError> for StoreError {
    fn from(err: IdError) -> Self {
        Self::Validation(err.to_string())
    }
}
