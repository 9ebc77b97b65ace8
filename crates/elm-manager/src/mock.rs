//! Shared test doubles: configurable platform plugin and a store wrapper
//! that can be told to fail specific writes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use elm_platform::{
    CreateOutput, Platform, PlatformError, PlatformFactory, PlatformResult, ValidationError,
};
use elm_store::{EnvStore, InMemoryEnvStore, Result as StoreResult, StoreError};
use elm_types::{
    CleanupReport, DiscoveryReport, EnvStatus, EnvironmentId, EnvironmentRecord, Extras,
    HealthReport, InfoReport, NewEnvironment, PlatformId, PlatformRecord, PlatformStatus,
    QualifiedName, SpecDocument,
};

/// Call counters shared between a factory and every platform it builds.
#[derive(Default)]
pub struct Counters {
    pub create_calls: AtomicUsize,
    pub destroy_calls: AtomicUsize,
    pub cleanup_calls: AtomicUsize,
    pub health_calls: AtomicUsize,
    pub info_calls: AtomicUsize,
    /// Task scope received by each `cleanup` call, in call order.
    pub cleanup_task_ids: Mutex<Vec<Option<String>>>,
}

/// Configured responses for a mock platform. `None` for an optional
/// capability means the trait default (unsupported).
#[derive(Clone, Default)]
pub struct Behavior {
    pub create_error: Option<String>,
    pub create_output: Option<(Value, Value)>,
    pub destroy_error: Option<String>,
    pub health: Option<PlatformResult<HealthReport>>,
    pub info: Option<PlatformResult<InfoReport>>,
    pub cleanup: Option<PlatformResult<CleanupReport>>,
}

pub struct MockPlatform {
    name: QualifiedName,
    behavior: Behavior,
    counters: Arc<Counters>,
}

#[async_trait]
impl Platform for MockPlatform {
    fn qualified_name(&self) -> QualifiedName {
        self.name.clone()
    }

    async fn create(&self) -> PlatformResult<CreateOutput> {
        self.counters.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = &self.behavior.create_error {
            return Err(PlatformError::failed(msg.clone()));
        }
        let (platform_data, plugin_data) = self
            .behavior
            .create_output
            .clone()
            .unwrap_or((Value::Object(Default::default()), Value::Object(Default::default())));
        Ok(CreateOutput {
            platform_data,
            plugin_data,
        })
    }

    async fn destroy(&self) -> PlatformResult<()> {
        self.counters.destroy_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior.destroy_error {
            Some(msg) => Err(PlatformError::failed(msg.clone())),
            None => Ok(()),
        }
    }

    async fn cleanup(&self, task_id: Option<&str>) -> PlatformResult<CleanupReport> {
        self.counters.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        self.counters
            .cleanup_task_ids
            .lock()
            .unwrap()
            .push(task_id.map(str::to_string));
        match &self.behavior.cleanup {
            Some(result) => result.clone(),
            None => Err(PlatformError::unsupported(self.name.clone(), "cleanup")),
        }
    }

    async fn check_health(&self) -> PlatformResult<HealthReport> {
        self.counters.health_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior.health {
            Some(result) => result.clone(),
            None => Err(PlatformError::unsupported(self.name.clone(), "check_health")),
        }
    }

    async fn info(&self) -> PlatformResult<InfoReport> {
        self.counters.info_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior.info {
            Some(result) => result.clone(),
            None => Err(PlatformError::unsupported(self.name.clone(), "info")),
        }
    }
}

pub struct MockFactory {
    pub name: QualifiedName,
    pub behavior: Behavior,
    pub validation_errors: Vec<ValidationError>,
    pub discovery: Option<PlatformResult<DiscoveryReport>>,
    pub counters: Arc<Counters>,
}

impl MockFactory {
    pub fn named(name: &str) -> Self {
        Self {
            name: QualifiedName::parse(name).expect("valid qualified name"),
            behavior: Behavior::default(),
            validation_errors: Vec::new(),
            discovery: None,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_behavior(name: &str, behavior: Behavior) -> Self {
        Self {
            behavior,
            ..Self::named(name)
        }
    }
}

impl PlatformFactory for MockFactory {
    fn qualified_name(&self) -> QualifiedName {
        self.name.clone()
    }

    fn validate_spec(&self, _spec: &SpecDocument) -> Vec<ValidationError> {
        self.validation_errors.clone()
    }

    fn build(&self, _record: PlatformRecord) -> PlatformResult<Box<dyn Platform>> {
        Ok(Box::new(MockPlatform {
            name: self.name.clone(),
            behavior: self.behavior.clone(),
            counters: self.counters.clone(),
        }))
    }

    fn discover_from_environ(
        &self,
        _environ: &HashMap<String, String>,
    ) -> PlatformResult<DiscoveryReport> {
        match &self.discovery {
            Some(result) => result.clone(),
            None => Err(PlatformError::unsupported(
                self.name.clone(),
                "discover_from_environ",
            )),
        }
    }
}

/// Store wrapper that fails `platform_set_data` on demand, for exercising
/// the create-succeeded-but-persist-failed branch.
pub struct FailingStore {
    inner: InMemoryEnvStore,
    pub fail_platform_set_data: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryEnvStore::new(),
            fail_platform_set_data: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EnvStore for FailingStore {
    async fn env_create(&self, new: NewEnvironment) -> StoreResult<EnvironmentRecord> {
        self.inner.env_create(new).await
    }

    async fn env_get(&self, id_or_name: &str) -> StoreResult<EnvironmentRecord> {
        self.inner.env_get(id_or_name).await
    }

    async fn env_list(&self, status: Option<EnvStatus>) -> StoreResult<Vec<EnvironmentRecord>> {
        self.inner.env_list(status).await
    }

    async fn env_get_status(&self, id: &EnvironmentId) -> StoreResult<EnvStatus> {
        self.inner.env_get_status(id).await
    }

    async fn env_set_status(
        &self,
        id: &EnvironmentId,
        old: EnvStatus,
        new: EnvStatus,
    ) -> StoreResult<()> {
        self.inner.env_set_status(id, old, new).await
    }

    async fn env_update(
        &self,
        id: &EnvironmentId,
        description: Option<String>,
        extras: Option<Extras>,
    ) -> StoreResult<()> {
        self.inner.env_update(id, description, extras).await
    }

    async fn env_rename(
        &self,
        id: &EnvironmentId,
        old_name: &str,
        new_name: &str,
    ) -> StoreResult<()> {
        self.inner.env_rename(id, old_name, new_name).await
    }

    async fn env_delete_cascade(&self, id: &EnvironmentId) -> StoreResult<()> {
        self.inner.env_delete_cascade(id).await
    }

    async fn platforms_list(&self, env_id: &EnvironmentId) -> StoreResult<Vec<PlatformRecord>> {
        self.inner.platforms_list(env_id).await
    }

    async fn platform_set_status(
        &self,
        id: &PlatformId,
        old: PlatformStatus,
        new: PlatformStatus,
    ) -> StoreResult<()> {
        self.inner.platform_set_status(id, old, new).await
    }

    async fn platform_set_data(
        &self,
        id: &PlatformId,
        platform_data: Value,
        plugin_data: Value,
    ) -> StoreResult<()> {
        if self.fail_platform_set_data.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }
        self.inner
            .platform_set_data(id, platform_data, plugin_data)
            .await
    }
}
