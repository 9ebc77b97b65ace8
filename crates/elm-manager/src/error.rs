//! Error types for the orchestrator

use elm_platform::PlatformError;
use elm_registry::RegistryError;
use elm_store::StoreError;
use serde_json::Value;
use thiserror::Error;

/// Orchestrator error type
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Aggregate spec validation failure: every entry is checked and all
    /// errors are gathered before reporting. Nothing durable is written.
    #[error("Invalid environment spec: {}", errors.join("; "))]
    InvalidSpec { spec: Value, errors: Vec<String> },

    /// Operation requires a specific environment status
    #[error("Invalid environment state: expected {expected}, actual {actual}")]
    InvalidState { expected: String, actual: String },

    /// Plugin resolution failure (e.g. a persisted qualified name no
    /// longer resolves to a registered plugin)
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Persistence gateway failure, including concurrency conflicts on
    /// conditional status writes
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A platform could not be rebuilt from its record
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Deliberately unimplemented operation
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),
}

/// Result type for orchestrator operations
pub type Result<T> = std::result::Result<T, ManagerError>;
