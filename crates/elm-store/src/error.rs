//! Store error types

use elm_types::{EnvironmentId, PlatformId};
use thiserror::Error;

/// Store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Environment not found: {0}")]
    EnvNotFound(String),

    #[error("Platform not found: {0}")]
    PlatformNotFound(PlatformId),

    #[error("Environment name already taken: {0}")]
    NameTaken(String),

    #[error("Status conflict on {entity}: expected {expected}, found {actual}")]
    StatusConflict {
        entity: String,
        expected: String,
        actual: String,
    },

    #[error("Illegal status transition on {entity}: {from} -> {to}")]
    IllegalTransition {
        entity: String,
        from: String,
        to: String,
    },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn env_not_found(id: &EnvironmentId) -> Self {
        Self::EnvNotFound(id.to_string())
    }

    /// Whether this is a concurrency conflict on a conditional write.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::StatusConflict { .. })
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
