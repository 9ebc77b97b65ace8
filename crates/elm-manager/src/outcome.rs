//! Aggregate result types returned by orchestrator operations

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use elm_types::{
    CleanupReport, DiscoveryReport, EnvStatus, EnvironmentId, Extras, PlatformRecord,
    PlatformStatus, QualifiedName, SpecDocument, Traceback,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cleanup portion of a destroy outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupInfo {
    /// Whether cleanup was skipped by the caller
    pub skipped: bool,

    /// Whether any platform's cleanup reported errors
    pub failed: bool,

    /// Per-platform cleanup reports, keyed by qualified name
    pub info: Option<BTreeMap<String, CleanupReport>>,
}

/// Before/after record of one platform's destroy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformDestroyResult {
    pub old_status: PlatformStatus,
    pub new_status: PlatformStatus,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<Traceback>,
}

/// Destroy portion of a destroy outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestroyInfo {
    /// True when destruction never started (cleanup reported errors)
    pub skipped: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Per-platform results, keyed by qualified name
    pub platforms: BTreeMap<String, PlatformDestroyResult>,
}

/// Full result of `EnvManager::destroy`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestroyOutcome {
    pub cleanup_info: CleanupInfo,
    pub destroy_info: DestroyInfo,
}

/// Aggregated environment view for consumption by other subsystems
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvData {
    pub id: EnvironmentId,
    pub name: String,
    pub description: String,
    pub status: EnvStatus,
    pub spec: BTreeMap<QualifiedName, SpecDocument>,
    pub extras: Extras,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Platform records keyed by bare platform kind
    pub platforms: BTreeMap<String, PlatformRecord>,
}

/// Result of composing a creation spec from the process environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecDiscovery {
    /// Creation spec assembled from the available plugins
    pub spec: serde_json::Map<String, Value>,

    /// Full per-plugin discovery detail, keyed by qualified name
    pub details: BTreeMap<String, DiscoveryReport>,
}
