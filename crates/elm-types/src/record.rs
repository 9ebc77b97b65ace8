//! Durable record layouts for environments and platforms
//!
//! The store owns these rows; the orchestrator only reads them and drives
//! status transitions through conditional writes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{EnvironmentId, PlatformId};
use crate::qualified::QualifiedName;
use crate::status::{EnvStatus, PlatformStatus};

/// Opaque per-platform specification document. Only the concrete plugin
/// understands its contents.
pub type SpecDocument = Value;

/// Caller-defined key-value metadata with no orchestrator-imposed schema.
pub type Extras = serde_json::Map<String, Value>;

/// Durable environment row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    /// Unique identifier
    pub id: EnvironmentId,

    /// Human name, unique across environments, renameable
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Current lifecycle status
    pub status: EnvStatus,

    /// Normalized spec: qualified platform key -> raw spec document
    pub spec: BTreeMap<QualifiedName, SpecDocument>,

    /// Caller-defined metadata
    pub extras: Extras,

    /// Set by the store on insert
    pub created_at: DateTime<Utc>,

    /// Maintained by the store on every write
    pub updated_at: DateTime<Utc>,
}

/// Durable platform row, owned by exactly one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformRecord {
    /// Unique identifier
    pub id: PlatformId,

    /// Parent environment
    pub env_id: EnvironmentId,

    /// Fully qualified `<plugin>@<kind>` name
    pub plugin_name: QualifiedName,

    /// The bare platform kind (the component after `@`)
    pub platform_name: String,

    /// Opaque spec document, validated only by the plugin
    pub spec: SpecDocument,

    /// Internal plugin bookkeeping, never shown to the caller
    pub plugin_data: Value,

    /// Externally meaningful data produced by `create()`
    pub platform_data: Value,

    /// Current lifecycle status
    pub status: PlatformStatus,

    /// Set by the store on insert
    pub created_at: DateTime<Utc>,

    /// Maintained by the store on every write
    pub updated_at: DateTime<Utc>,
}

/// Input for the atomic environment insert
#[derive(Debug, Clone)]
pub struct NewEnvironment {
    pub name: String,
    pub description: String,
    pub extras: Extras,
    pub spec: BTreeMap<QualifiedName, SpecDocument>,
    /// Platform rows to insert alongside the environment, in creation order
    pub platforms: Vec<NewPlatform>,
}

/// One platform row of an atomic environment insert
#[derive(Debug, Clone)]
pub struct NewPlatform {
    pub plugin_name: QualifiedName,
    pub platform_name: String,
    pub spec: SpecDocument,
}
