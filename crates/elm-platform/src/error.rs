//! Platform capability error taxonomy

use elm_types::{QualifiedName, Traceback};
use thiserror::Error;

/// Errors returned by platform capability calls.
///
/// `Unsupported` is the default for optional capabilities a plugin chose
/// not to implement; callers must be able to tell it apart from a real
/// failure.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("Plugin {plugin} does not implement {operation}()")]
    Unsupported {
        plugin: QualifiedName,
        operation: &'static str,
    },

    #[error("{message}")]
    Failed {
        message: String,
        traceback: Traceback,
    },
}

impl PlatformError {
    /// A genuine failure with a captured trace.
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Failed {
            traceback: Traceback::new("PlatformError", message.clone()),
            message,
        }
    }

    pub fn unsupported(plugin: QualifiedName, operation: &'static str) -> Self {
        Self::Unsupported { plugin, operation }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Structured trace for this failure. Unsupported operations carry a
    /// trace built from their own description.
    pub fn traceback(&self) -> Traceback {
        match self {
            Self::Failed { traceback, .. } => traceback.clone(),
            Self::Unsupported { .. } => Traceback::new("Unsupported", self.to_string()),
        }
    }
}

/// Result alias for platform capability calls
pub type PlatformResult<T> = Result<T, PlatformError>;
