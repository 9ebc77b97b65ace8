//! The environment orchestrator
//!
//! `EnvManager` drives every platform of one environment through its
//! lifecycle. Creation is sequential with partial-failure containment:
//! once a platform fails, the remaining ones are marked SKIPPED rather
//! than attempted, and platforms already created are left in place (skip,
//! not rollback). Health, info and cleanup fan out over all platforms
//! concurrently with a bounded worker pool and per-platform error
//! isolation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{error, info, instrument, warn};

use elm_platform::{PlatformError, PlatformHandle};
use elm_registry::PlatformRegistry;
use elm_store::EnvStore;
use elm_types::{
    CleanupErrorEntry, CleanupReport, DiscoveryReport, EnvStatus, EnvironmentId,
    EnvironmentRecord, Extras, HealthReport, InfoReport, NewEnvironment, NewPlatform,
    PlatformStatus, QualifiedName,
};

use crate::error::{ManagerError, Result};
use crate::events::EnvEvent;
use crate::outcome::{
    CleanupInfo, DestroyInfo, DestroyOutcome, EnvData, PlatformDestroyResult, SpecDiscovery,
};
use crate::validator::SpecValidator;

/// Orchestrator tunables
#[derive(Clone)]
pub struct ManagerConfig {
    /// Worker-pool bound for the health/info/cleanup fan-outs. The
    /// creation workflow is always sequential.
    pub fanout_concurrency: usize,

    /// Sender the manager emits lifecycle events on. Creation-phase
    /// events are broadcast before `create` returns, so callers that want
    /// them must subscribe to this channel beforehand and pass the sender
    /// here; when unset, each manager gets a private channel reachable
    /// through `subscribe` (destroy/cleanup/delete events only).
    pub events: Option<broadcast::Sender<EnvEvent>>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            fanout_concurrency: 8,
            events: None,
        }
    }
}

impl std::fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("fanout_concurrency", &self.fanout_concurrency)
            .field("events", &self.events.is_some())
            .finish()
    }
}

/// Input to `EnvManager::create`
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub name: String,
    pub description: String,
    pub extras: Extras,
    /// Raw spec: short platform-kind names or qualified keys, each mapped
    /// to that platform's spec document
    pub spec: serde_json::Map<String, Value>,
}

impl CreateRequest {
    pub fn new(name: impl Into<String>, spec: serde_json::Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            spec,
            ..Default::default()
        }
    }
}

fn broken_message(name: &QualifiedName, operation: &str) -> String {
    format!("Plugin {name}.{operation}() method is broken")
}

/// Lifecycle orchestrator for one environment
pub struct EnvManager {
    store: Arc<dyn EnvStore>,
    registry: Arc<PlatformRegistry>,
    config: ManagerConfig,
    env_id: EnvironmentId,
    record: EnvironmentRecord,
    event_tx: broadcast::Sender<EnvEvent>,
}

impl EnvManager {
    fn from_record(
        store: Arc<dyn EnvStore>,
        registry: Arc<PlatformRegistry>,
        config: ManagerConfig,
        record: EnvironmentRecord,
    ) -> Self {
        let event_tx = config
            .events
            .clone()
            .unwrap_or_else(|| broadcast::channel(1024).0);
        Self {
            store,
            registry,
            config,
            env_id: record.id,
            record,
            event_tx,
        }
    }

    /// Validate the spec, insert the durable records, and run the creation
    /// workflow. The manager is returned even when the environment ends up
    /// FAILED_TO_CREATE; only validation failures and fatal store errors
    /// raise.
    #[instrument(skip_all, fields(name = %request.name))]
    pub async fn create(
        store: Arc<dyn EnvStore>,
        registry: Arc<PlatformRegistry>,
        config: ManagerConfig,
        request: CreateRequest,
    ) -> Result<Self> {
        let validator = SpecValidator::new(registry.clone());
        let entries = validator.normalize_and_validate(&request.spec)?;

        let spec = entries
            .iter()
            .map(|e| (e.qualified.clone(), e.spec.clone()))
            .collect();
        let platforms = entries
            .into_iter()
            .map(|e| NewPlatform {
                plugin_name: e.qualified,
                platform_name: e.kind,
                spec: e.spec,
            })
            .collect();

        // The only multi-row write in the workflow; the store makes it
        // atomic.
        let record = store
            .env_create(NewEnvironment {
                name: request.name,
                description: request.description,
                extras: request.extras,
                spec,
                platforms,
            })
            .await?;

        info!(env_id = %record.id, "Environment records created");

        let mut manager = Self::from_record(store, registry, config, record);
        manager.create_platforms().await?;
        manager.refresh().await?;
        Ok(manager)
    }

    /// Reconstruct a manager for an existing environment by uuid or name.
    pub async fn get(
        store: Arc<dyn EnvStore>,
        registry: Arc<PlatformRegistry>,
        config: ManagerConfig,
        id_or_name: &str,
    ) -> Result<Self> {
        let record = store.env_get(id_or_name).await?;
        Ok(Self::from_record(store, registry, config, record))
    }

    /// Managers for all environments, optionally filtered by status.
    pub async fn list(
        store: Arc<dyn EnvStore>,
        registry: Arc<PlatformRegistry>,
        config: ManagerConfig,
        status: Option<EnvStatus>,
    ) -> Result<Vec<Self>> {
        let records = store.env_list(status).await?;
        Ok(records
            .into_iter()
            .map(|r| {
                Self::from_record(store.clone(), registry.clone(), config.clone(), r)
            })
            .collect())
    }

    pub fn id(&self) -> EnvironmentId {
        self.env_id
    }

    /// Record snapshot taken at construction (or the last `refresh`).
    pub fn record(&self) -> &EnvironmentRecord {
        &self.record
    }

    /// Current durable status.
    pub async fn status(&self) -> Result<EnvStatus> {
        Ok(self.store.env_get_status(&self.env_id).await?)
    }

    /// Subscribe to lifecycle events of this manager.
    pub fn subscribe(&self) -> broadcast::Receiver<EnvEvent> {
        self.event_tx.subscribe()
    }

    /// Full aggregated view including platform records.
    pub async fn data(&self) -> Result<EnvData> {
        let record = self.store.env_get(&self.env_id.to_string()).await?;
        let platforms = self.store.platforms_list(&self.env_id).await?;
        Ok(EnvData {
            id: record.id,
            name: record.name,
            description: record.description,
            status: record.status,
            spec: record.spec,
            extras: record.extras,
            created_at: record.created_at,
            updated_at: record.updated_at,
            platforms: platforms
                .into_iter()
                .map(|p| (p.platform_name.clone(), p))
                .collect(),
        })
    }

    async fn refresh(&mut self) -> Result<()> {
        self.record = self.store.env_get(&self.env_id.to_string()).await?;
        Ok(())
    }

    /// Rebuild platform handles from the persisted rows, in persisted
    /// order. Fails when a stored qualified name no longer resolves.
    async fn platforms(&self) -> Result<Vec<PlatformHandle>> {
        let records = self.store.platforms_list(&self.env_id).await?;
        let mut handles = Vec::with_capacity(records.len());
        for record in records {
            let factory = self.registry.resolve(&record.plugin_name)?;
            let platform = factory.build(record.clone())?;
            handles.push(PlatformHandle::new(record, platform));
        }
        Ok(handles)
    }

    fn emit(&self, event: EnvEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Sequential creation with partial-failure containment. Never aborts
    /// because of a persistence error on one platform; the aggregate
    /// outcome is written last.
    async fn create_platforms(&self) -> Result<()> {
        let mut outcome = EnvStatus::Ready;

        for handle in self.platforms().await? {
            let name = handle.qualified_name().clone();

            if outcome != EnvStatus::Ready {
                // A prior platform failed; later platforms may depend on
                // implicit ordering or shared account state, so they are
                // skipped rather than attempted.
                if let Err(err) = self
                    .store
                    .platform_set_status(
                        &handle.record.id,
                        PlatformStatus::Initializing,
                        PlatformStatus::Skipped,
                    )
                    .await
                {
                    warn!(platform = %name, %err, "Failed to mark platform as skipped");
                }
                self.emit(EnvEvent::PlatformSkipped {
                    env_id: self.env_id,
                    platform: name,
                });
                continue;
            }

            match handle.platform.create().await {
                Ok(output) => {
                    let persisted = match self
                        .store
                        .platform_set_data(
                            &handle.record.id,
                            output.platform_data.clone(),
                            output.plugin_data.clone(),
                        )
                        .await
                    {
                        Ok(()) => {
                            self.store
                                .platform_set_status(
                                    &handle.record.id,
                                    PlatformStatus::Initializing,
                                    PlatformStatus::Ready,
                                )
                                .await
                        }
                        Err(err) => Err(err),
                    };

                    match persisted {
                        Ok(()) => {
                            info!(platform = %name, "Platform created");
                            self.emit(EnvEvent::PlatformCreated {
                                env_id: self.env_id,
                                platform: name,
                            });
                        }
                        Err(store_err) => {
                            // Created but unrecorded is worse than failed:
                            // tear the platform down again while we still
                            // hold its data.
                            outcome = EnvStatus::FailedToCreate;
                            error!(
                                platform = %name, %store_err,
                                "Couldn't store platform data"
                            );
                            if let Err(err) = self
                                .store
                                .platform_set_status(
                                    &handle.record.id,
                                    PlatformStatus::Initializing,
                                    PlatformStatus::FailedToCreate,
                                )
                                .await
                            {
                                warn!(platform = %name, %err, "Failed to set platform status");
                            }
                            match handle.platform.destroy().await {
                                Ok(()) => warn!(
                                    platform = %name,
                                    "Couldn't store platform data. Attempt to destroy it succeeded"
                                ),
                                Err(destroy_err) => {
                                    error!(
                                        platform = %name, %destroy_err,
                                        "Couldn't store platform data and the attempt to \
                                         destroy it failed; resource is orphaned"
                                    );
                                    self.emit(EnvEvent::PlatformOrphaned {
                                        env_id: self.env_id,
                                        platform: name,
                                        message: destroy_err.to_string(),
                                    });
                                }
                            }
                        }
                    }
                }
                Err(create_err) => {
                    outcome = EnvStatus::FailedToCreate;
                    error!(
                        platform = %name, spec = %handle.record.spec, %create_err,
                        "Failed to create platform"
                    );
                    self.emit(EnvEvent::PlatformCreateFailed {
                        env_id: self.env_id,
                        platform: name.clone(),
                        message: create_err.to_string(),
                    });
                    if let Err(err) = self
                        .store
                        .platform_set_status(
                            &handle.record.id,
                            PlatformStatus::Initializing,
                            PlatformStatus::FailedToCreate,
                        )
                        .await
                    {
                        error!(platform = %name, %err, "Failed to set platform status");
                    }
                }
            }
        }

        self.store
            .env_set_status(&self.env_id, EnvStatus::Initializing, outcome)
            .await?;
        self.emit(EnvEvent::EnvironmentCreated {
            env_id: self.env_id,
            status: outcome,
        });
        Ok(())
    }

    /// Probe every platform's liveness. Always returns one entry per
    /// platform; a broken plugin is synthesized as unavailable.
    #[instrument(skip_all, fields(env_id = %self.env_id))]
    pub async fn check_health(&self) -> Result<BTreeMap<String, HealthReport>> {
        let handles = self.platforms().await?;
        let results: Vec<(String, HealthReport)> = stream::iter(handles.into_iter().map(
            |handle| async move {
                let name = handle.qualified_name().clone();
                let report = match handle.platform.check_health().await {
                    Ok(mut report) => {
                        if report.validate().is_err() {
                            HealthReport::unavailable(broken_message(&name, "check_health"))
                        } else {
                            if report.message.is_empty() {
                                report.message = "OK!".to_string();
                            }
                            report
                        }
                    }
                    Err(err) => {
                        let mut report =
                            HealthReport::unavailable(broken_message(&name, "check_health"));
                        report.traceback = Some(err.traceback());
                        report
                    }
                };
                (name.to_string(), report)
            },
        ))
        .buffer_unordered(self.config.fanout_concurrency.max(1))
        .collect()
        .await;

        Ok(results.into_iter().collect())
    }

    /// Collect every platform's descriptive dump. Always returns one
    /// entry per platform.
    #[instrument(skip_all, fields(env_id = %self.env_id))]
    pub async fn get_info(&self) -> Result<BTreeMap<String, InfoReport>> {
        let handles = self.platforms().await?;
        let results: Vec<(String, InfoReport)> = stream::iter(handles.into_iter().map(
            |handle| async move {
                let name = handle.qualified_name().clone();
                let report = match handle.platform.info().await {
                    Ok(report) => {
                        if report.validate().is_err() {
                            InfoReport::failed(broken_message(&name, "info"))
                        } else {
                            report
                        }
                    }
                    Err(err) => {
                        let mut report = InfoReport::failed(broken_message(&name, "info"));
                        report.traceback = Some(err.traceback());
                        report
                    }
                };
                (name.to_string(), report)
            },
        ))
        .buffer_unordered(self.config.fanout_concurrency.max(1))
        .collect()
        .await;

        Ok(results.into_iter().collect())
    }

    /// Disaster-cleanup of every platform's leaked resources, optionally
    /// scoped to one task. The environment is CLEANING for the duration;
    /// per-platform failures are reported in the result, never by
    /// blocking the status transition back to READY.
    #[instrument(skip_all, fields(env_id = %self.env_id))]
    pub async fn cleanup(&self, task_id: Option<&str>) -> Result<BTreeMap<String, CleanupReport>> {
        self.store
            .env_set_status(&self.env_id, EnvStatus::Ready, EnvStatus::Cleaning)
            .await?;

        let handles = self.platforms().await?;
        let results: Vec<(String, CleanupReport)> = stream::iter(handles.into_iter().map(
            |handle| async move {
                let name = handle.qualified_name().clone();
                let report = match handle.platform.cleanup(task_id).await {
                    Ok(mut report) => {
                        if report.validate().is_err() {
                            CleanupReport::failed(CleanupErrorEntry::new(broken_message(
                                &name, "cleanup",
                            )))
                        } else {
                            if report.message.is_empty() {
                                report.message = "Succeeded".to_string();
                            }
                            report
                        }
                    }
                    Err(err) if err.is_unsupported() => CleanupReport::not_implemented(),
                    Err(err) => {
                        let mut entry = CleanupErrorEntry::new(broken_message(&name, "cleanup"));
                        entry.traceback = Some(err.traceback());
                        CleanupReport::failed(entry)
                    }
                };
                (name.to_string(), report)
            },
        ))
        .buffer_unordered(self.config.fanout_concurrency.max(1))
        .collect()
        .await;

        self.store
            .env_set_status(&self.env_id, EnvStatus::Cleaning, EnvStatus::Ready)
            .await?;
        self.emit(EnvEvent::CleanupCompleted { env_id: self.env_id });

        Ok(results.into_iter().collect())
    }

    /// Tear down every platform, then finalize the environment status.
    ///
    /// Unless `skip_cleanup`, cleanup runs first and any cleanup error
    /// aborts destruction entirely: destroy never proceeds over an
    /// environment whose resources were not successfully enumerated.
    #[instrument(skip_all, fields(env_id = %self.env_id))]
    pub async fn destroy(&self, skip_cleanup: bool) -> Result<DestroyOutcome> {
        let mut cleanup_info = CleanupInfo {
            skipped: true,
            failed: false,
            info: None,
        };

        if !skip_cleanup {
            let info = self.cleanup(None).await?;
            cleanup_info.skipped = false;
            cleanup_info.failed = info.values().any(|r| r.has_errors());
            cleanup_info.info = Some(info);
            if cleanup_info.failed {
                warn!("Cleanup reported errors; skipping destroy");
                return Ok(DestroyOutcome {
                    cleanup_info,
                    destroy_info: DestroyInfo {
                        skipped: true,
                        message: Some("Skipped because cleanup has errors".to_string()),
                        platforms: BTreeMap::new(),
                    },
                });
            }
        }

        let current = self.store.env_get_status(&self.env_id).await?;
        self.store
            .env_set_status(&self.env_id, current, EnvStatus::Destroying)
            .await?;

        let mut new_env_status = EnvStatus::Destroyed;
        let mut platforms = BTreeMap::new();

        for handle in self.platforms().await? {
            let name = handle.qualified_name().clone();
            let old_status = handle.record.status;

            if old_status.nothing_to_destroy() {
                let message = if old_status == PlatformStatus::Destroyed {
                    "Platform is already destroyed. Do nothing"
                } else {
                    "Platform was never created. Do nothing"
                };
                platforms.insert(
                    name.to_string(),
                    PlatformDestroyResult {
                        old_status,
                        new_status: old_status,
                        message: message.to_string(),
                        traceback: None,
                    },
                );
                continue;
            }

            if let Err(err) = self
                .store
                .platform_set_status(&handle.record.id, old_status, PlatformStatus::Destroying)
                .await
            {
                new_env_status = EnvStatus::FailedToDestroy;
                warn!(platform = %name, %err, "Could not move platform into DESTROYING");
                platforms.insert(
                    name.to_string(),
                    PlatformDestroyResult {
                        old_status,
                        new_status: old_status,
                        message: format!("Failed to destroy: {err}"),
                        traceback: None,
                    },
                );
                continue;
            }

            match handle.platform.destroy().await {
                Ok(()) => {
                    self.store
                        .platform_set_status(
                            &handle.record.id,
                            PlatformStatus::Destroying,
                            PlatformStatus::Destroyed,
                        )
                        .await?;
                    self.emit(EnvEvent::PlatformDestroyed {
                        env_id: self.env_id,
                        platform: name.clone(),
                    });
                    platforms.insert(
                        name.to_string(),
                        PlatformDestroyResult {
                            old_status,
                            new_status: PlatformStatus::Destroyed,
                            message: "Successfully destroyed".to_string(),
                            traceback: None,
                        },
                    );
                }
                Err(err) => {
                    self.store
                        .platform_set_status(
                            &handle.record.id,
                            PlatformStatus::Destroying,
                            PlatformStatus::FailedToDestroy,
                        )
                        .await?;
                    new_env_status = EnvStatus::FailedToDestroy;
                    error!(platform = %name, %err, "Failed to destroy platform");
                    self.emit(EnvEvent::PlatformDestroyFailed {
                        env_id: self.env_id,
                        platform: name.clone(),
                        message: err.to_string(),
                    });
                    platforms.insert(
                        name.to_string(),
                        PlatformDestroyResult {
                            old_status,
                            new_status: PlatformStatus::FailedToDestroy,
                            message: "Failed to destroy".to_string(),
                            traceback: Some(err.traceback()),
                        },
                    );
                }
            }
        }

        self.store
            .env_set_status(&self.env_id, EnvStatus::Destroying, new_env_status)
            .await?;
        self.emit(EnvEvent::EnvironmentDestroyed {
            env_id: self.env_id,
            status: new_env_status,
        });

        Ok(DestroyOutcome {
            cleanup_info,
            destroy_info: DestroyInfo {
                skipped: false,
                message: None,
                platforms,
            },
        })
    }

    /// Cascade-delete the environment and everything referencing it.
    /// Only allowed from DESTROYED status unless forced.
    #[instrument(skip_all, fields(env_id = %self.env_id))]
    pub async fn delete(&self, force: bool) -> Result<()> {
        let status = self.store.env_get_status(&self.env_id).await?;
        if !force && status != EnvStatus::Destroyed {
            return Err(ManagerError::InvalidState {
                expected: EnvStatus::Destroyed.to_string(),
                actual: status.to_string(),
            });
        }
        self.store.env_delete_cascade(&self.env_id).await?;
        self.emit(EnvEvent::EnvironmentDeleted { env_id: self.env_id });
        Ok(())
    }

    /// Rename the environment. A no-op without a write when the name is
    /// unchanged.
    pub async fn rename(&self, new_name: &str) -> Result<()> {
        let record = self.store.env_get(&self.env_id.to_string()).await?;
        if record.name == new_name {
            return Ok(());
        }
        self.store
            .env_rename(&self.env_id, &record.name, new_name)
            .await?;
        Ok(())
    }

    /// Update description and/or extras. Fields equal to the current
    /// values are dropped; if nothing changes, no write happens.
    pub async fn update(
        &self,
        description: Option<String>,
        extras: Option<Extras>,
    ) -> Result<()> {
        let record = self.store.env_get(&self.env_id.to_string()).await?;
        let description = description.filter(|d| *d != record.description);
        let extras = extras.filter(|e| *e != record.extras);
        if description.is_none() && extras.is_none() {
            return Ok(());
        }
        self.store
            .env_update(&self.env_id, description, extras)
            .await?;
        Ok(())
    }

    /// Changing a live environment's platform spec needs a state machine
    /// with journaled execution; deliberately unimplemented until then.
    pub async fn update_spec(&self, _new_spec: serde_json::Map<String, Value>) -> Result<()> {
        Err(ManagerError::Unsupported("update_spec"))
    }

    /// Compose a creation spec from a snapshot of the process environment
    /// by asking every registered plugin what it can discover. Reports are
    /// shape-validated exactly like the fan-out reports.
    pub fn spec_from_system_environ(
        registry: &PlatformRegistry,
        environ: &HashMap<String, String>,
    ) -> SpecDiscovery {
        let mut details = BTreeMap::new();
        let mut spec = serde_json::Map::new();

        for factory in registry.factories() {
            let name = factory.qualified_name();
            let report = match factory.discover_from_environ(environ) {
                Ok(mut report) => {
                    if report.validate().is_err() {
                        DiscoveryReport::unavailable(broken_message(
                            &name,
                            "discover_from_environ",
                        ))
                    } else {
                        if report.message.is_empty() {
                            report.message = "Available".to_string();
                        }
                        report
                    }
                }
                Err(PlatformError::Unsupported { .. }) => {
                    DiscoveryReport::unavailable("Not implemented")
                }
                Err(err) => {
                    let mut report = DiscoveryReport::unavailable(broken_message(
                        &name,
                        "discover_from_environ",
                    ));
                    report.traceback = Some(err.traceback());
                    report
                }
            };

            if report.available {
                spec.insert(
                    name.to_string(),
                    report
                        .spec
                        .clone()
                        .unwrap_or(Value::Object(Default::default())),
                );
            }
            details.insert(name.to_string(), report);
        }

        SpecDiscovery { spec, details }
    }
}

impl std::fmt::Debug for EnvManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvManager")
            .field("env_id", &self.env_id)
            .field("name", &self.record.name)
            .finish()
    }
}
