//! In-memory store implementation
//!
//! A single lock guards all tables so the multi-row environment insert and
//! the conditional status writes are atomic with respect to each other.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use elm_types::{
    EnvStatus, EnvironmentId, EnvironmentRecord, Extras, NewEnvironment, PlatformId,
    PlatformRecord, PlatformStatus,
};

use crate::error::{Result, StoreError};
use crate::traits::EnvStore;

#[derive(Default)]
struct Tables {
    envs: HashMap<EnvironmentId, EnvironmentRecord>,
    names: HashMap<String, EnvironmentId>,
    platforms: HashMap<PlatformId, PlatformRecord>,
    /// Platform ids per environment, in insertion order
    by_env: HashMap<EnvironmentId, Vec<PlatformId>>,
}

/// In-memory environment store for development and testing
pub struct InMemoryEnvStore {
    tables: RwLock<Tables>,
}

impl InMemoryEnvStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemoryEnvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnvStore for InMemoryEnvStore {
    async fn env_create(&self, new: NewEnvironment) -> Result<EnvironmentRecord> {
        let mut tables = self.tables.write().await;

        if tables.names.contains_key(&new.name) {
            return Err(StoreError::NameTaken(new.name));
        }

        let now = Utc::now();
        let env_id = EnvironmentId::generate();
        let record = EnvironmentRecord {
            id: env_id,
            name: new.name.clone(),
            description: new.description,
            status: EnvStatus::Initializing,
            spec: new.spec,
            extras: new.extras,
            created_at: now,
            updated_at: now,
        };

        let mut ids = Vec::with_capacity(new.platforms.len());
        for p in new.platforms {
            let id = PlatformId::generate();
            tables.platforms.insert(
                id,
                PlatformRecord {
                    id,
                    env_id,
                    plugin_name: p.plugin_name,
                    platform_name: p.platform_name,
                    spec: p.spec,
                    plugin_data: Value::Object(Default::default()),
                    platform_data: Value::Object(Default::default()),
                    status: PlatformStatus::Initializing,
                    created_at: now,
                    updated_at: now,
                },
            );
            ids.push(id);
        }

        tables.by_env.insert(env_id, ids);
        tables.names.insert(new.name, env_id);
        tables.envs.insert(env_id, record.clone());

        Ok(record)
    }

    async fn env_get(&self, id_or_name: &str) -> Result<EnvironmentRecord> {
        let tables = self.tables.read().await;
        let id = match id_or_name.parse::<EnvironmentId>() {
            Ok(id) if tables.envs.contains_key(&id) => id,
            _ => *tables
                .names
                .get(id_or_name)
                .ok_or_else(|| StoreError::EnvNotFound(id_or_name.to_string()))?,
        };
        tables
            .envs
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::EnvNotFound(id_or_name.to_string()))
    }

    async fn env_list(&self, status: Option<EnvStatus>) -> Result<Vec<EnvironmentRecord>> {
        let tables = self.tables.read().await;
        let mut envs: Vec<_> = tables
            .envs
            .values()
            .filter(|e| status.map_or(true, |s| e.status == s))
            .cloned()
            .collect();
        envs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(envs)
    }

    async fn env_get_status(&self, id: &EnvironmentId) -> Result<EnvStatus> {
        let tables = self.tables.read().await;
        tables
            .envs
            .get(id)
            .map(|e| e.status)
            .ok_or_else(|| StoreError::env_not_found(id))
    }

    async fn env_set_status(
        &self,
        id: &EnvironmentId,
        old: EnvStatus,
        new: EnvStatus,
    ) -> Result<()> {
        if !old.can_transition_to(new) {
            return Err(StoreError::IllegalTransition {
                entity: format!("environment {id}"),
                from: old.to_string(),
                to: new.to_string(),
            });
        }

        let mut tables = self.tables.write().await;
        let env = tables
            .envs
            .get_mut(id)
            .ok_or_else(|| StoreError::env_not_found(id))?;
        if env.status != old {
            return Err(StoreError::StatusConflict {
                entity: format!("environment {id}"),
                expected: old.to_string(),
                actual: env.status.to_string(),
            });
        }
        env.status = new;
        env.updated_at = Utc::now();
        Ok(())
    }

    async fn env_update(
        &self,
        id: &EnvironmentId,
        description: Option<String>,
        extras: Option<Extras>,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let env = tables
            .envs
            .get_mut(id)
            .ok_or_else(|| StoreError::env_not_found(id))?;
        if let Some(description) = description {
            env.description = description;
        }
        if let Some(extras) = extras {
            env.extras = extras;
        }
        env.updated_at = Utc::now();
        Ok(())
    }

    async fn env_rename(&self, id: &EnvironmentId, old_name: &str, new_name: &str) -> Result<()> {
        let mut tables = self.tables.write().await;

        if tables.names.contains_key(new_name) {
            return Err(StoreError::NameTaken(new_name.to_string()));
        }

        let env = tables
            .envs
            .get_mut(id)
            .ok_or_else(|| StoreError::env_not_found(id))?;
        if env.name != old_name {
            return Err(StoreError::Backend(format!(
                "rename expected name `{old_name}`, found `{}`",
                env.name
            )));
        }
        env.name = new_name.to_string();
        env.updated_at = Utc::now();

        tables.names.remove(old_name);
        tables.names.insert(new_name.to_string(), *id);
        Ok(())
    }

    async fn env_delete_cascade(&self, id: &EnvironmentId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let env = tables
            .envs
            .remove(id)
            .ok_or_else(|| StoreError::env_not_found(id))?;
        tables.names.remove(&env.name);
        if let Some(ids) = tables.by_env.remove(id) {
            for pid in ids {
                tables.platforms.remove(&pid);
            }
        }
        Ok(())
    }

    async fn platforms_list(&self, env_id: &EnvironmentId) -> Result<Vec<PlatformRecord>> {
        let tables = self.tables.read().await;
        if !tables.envs.contains_key(env_id) {
            return Err(StoreError::env_not_found(env_id));
        }
        let ids = tables.by_env.get(env_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| tables.platforms.get(id).cloned())
            .collect())
    }

    async fn platform_set_status(
        &self,
        id: &PlatformId,
        old: PlatformStatus,
        new: PlatformStatus,
    ) -> Result<()> {
        if !old.can_transition_to(new) {
            return Err(StoreError::IllegalTransition {
                entity: format!("platform {id}"),
                from: old.to_string(),
                to: new.to_string(),
            });
        }

        let mut tables = self.tables.write().await;
        let platform = tables
            .platforms
            .get_mut(id)
            .ok_or(StoreError::PlatformNotFound(*id))?;
        if platform.status != old {
            return Err(StoreError::StatusConflict {
                entity: format!("platform {id}"),
                expected: old.to_string(),
                actual: platform.status.to_string(),
            });
        }
        platform.status = new;
        platform.updated_at = Utc::now();
        Ok(())
    }

    async fn platform_set_data(
        &self,
        id: &PlatformId,
        platform_data: Value,
        plugin_data: Value,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let platform = tables
            .platforms
            .get_mut(id)
            .ok_or(StoreError::PlatformNotFound(*id))?;
        platform.platform_data = platform_data;
        platform.plugin_data = plugin_data;
        platform.updated_at = Utc::now();
        Ok(())
    }
}
