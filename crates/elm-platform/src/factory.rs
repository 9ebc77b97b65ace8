//! Platform factories: typed construction and spec validation
//!
//! Each plugin registers one factory under its fully qualified name. The
//! factory validates raw spec documents and rebuilds [`Platform`] instances
//! from persisted records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use elm_types::{DiscoveryReport, PlatformRecord, QualifiedName, SpecDocument};

use crate::error::{PlatformError, PlatformResult};
use crate::platform::Platform;

/// One spec validation failure, collected rather than raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Builds and validates platform instances for one plugin
pub trait PlatformFactory: Send + Sync {
    /// Qualified name this factory registers under.
    fn qualified_name(&self) -> QualifiedName;

    /// Check a raw spec document against the plugin's declared schema.
    /// Returns every problem found; an empty list means valid.
    fn validate_spec(&self, spec: &SpecDocument) -> Vec<ValidationError>;

    /// Rebuild a platform instance from its persisted record.
    fn build(&self, record: PlatformRecord) -> PlatformResult<Box<dyn Platform>>;

    /// Inspect a snapshot of the process environment and report whether a
    /// spec for this plugin can be composed from it.
    fn discover_from_environ(
        &self,
        _environ: &HashMap<String, String>,
    ) -> PlatformResult<DiscoveryReport> {
        Err(PlatformError::unsupported(
            self.qualified_name(),
            "discover_from_environ",
        ))
    }
}
