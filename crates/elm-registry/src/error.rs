//! Registry error types

use elm_types::QualifiedName;
use thiserror::Error;

/// Registry errors
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("Platform plugin not found: {0}")]
    PluginNotFound(QualifiedName),

    #[error("Platform plugin already registered: {0}")]
    PluginAlreadyRegistered(QualifiedName),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
