//! Persistence gateway trait definitions

use async_trait::async_trait;

use elm_types::{
    EnvStatus, EnvironmentId, EnvironmentRecord, Extras, NewEnvironment, PlatformId,
    PlatformRecord, PlatformStatus,
};
use serde_json::Value;

use crate::error::Result;

/// Durable state gateway for environments and their platforms.
///
/// `env_create` is the only multi-row write in the system and must be
/// atomic. Both `*_set_status` operations are conditional: they fail with
/// `StoreError::StatusConflict` when the stored status no longer matches
/// the expected old value, so two concurrent callers cannot both act on a
/// stale status.
#[async_trait]
pub trait EnvStore: Send + Sync {
    /// Atomically insert one environment row plus one platform row per spec
    /// entry, all with INITIALIZING status.
    async fn env_create(&self, new: NewEnvironment) -> Result<EnvironmentRecord>;

    /// Fetch by id (uuid string) or by unique name.
    async fn env_get(&self, id_or_name: &str) -> Result<EnvironmentRecord>;

    /// List environments, optionally filtered by status.
    async fn env_list(&self, status: Option<EnvStatus>) -> Result<Vec<EnvironmentRecord>>;

    /// Current durable status of an environment.
    async fn env_get_status(&self, id: &EnvironmentId) -> Result<EnvStatus>;

    /// Conditional status write. Rejects illegal transitions before, and
    /// stale expectations during, the write.
    async fn env_set_status(
        &self,
        id: &EnvironmentId,
        old: EnvStatus,
        new: EnvStatus,
    ) -> Result<()>;

    /// Update description and/or extras. `None` fields are left untouched.
    async fn env_update(
        &self,
        id: &EnvironmentId,
        description: Option<String>,
        extras: Option<Extras>,
    ) -> Result<()>;

    /// Rename, conditional on the current name.
    async fn env_rename(&self, id: &EnvironmentId, old_name: &str, new_name: &str) -> Result<()>;

    /// Irreversibly remove the environment and every dependent record.
    async fn env_delete_cascade(&self, id: &EnvironmentId) -> Result<()>;

    /// Platforms of an environment, in the order they were persisted.
    async fn platforms_list(&self, env_id: &EnvironmentId) -> Result<Vec<PlatformRecord>>;

    /// Conditional platform status write; same semantics as
    /// `env_set_status`.
    async fn platform_set_status(
        &self,
        id: &PlatformId,
        old: PlatformStatus,
        new: PlatformStatus,
    ) -> Result<()>;

    /// Persist the outputs of a successful `create()` call.
    async fn platform_set_data(
        &self,
        id: &PlatformId,
        platform_data: Value,
        plugin_data: Value,
    ) -> Result<()>;
}
