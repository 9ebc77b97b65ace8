//! Lifecycle events emitted by the orchestrator
//!
//! Events are observability only: the durable source of truth is always
//! the store. Dropped events (no subscriber) are harmless.

use elm_types::{EnvStatus, EnvironmentId, QualifiedName};
use serde::{Deserialize, Serialize};

/// Environment lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnvEvent {
    /// Creation workflow finished; `status` is the aggregate outcome
    EnvironmentCreated {
        env_id: EnvironmentId,
        status: EnvStatus,
    },

    /// One platform was created and persisted
    PlatformCreated {
        env_id: EnvironmentId,
        platform: QualifiedName,
    },

    /// One platform's `create()` failed
    PlatformCreateFailed {
        env_id: EnvironmentId,
        platform: QualifiedName,
        message: String,
    },

    /// Platform never attempted because an earlier one failed
    PlatformSkipped {
        env_id: EnvironmentId,
        platform: QualifiedName,
    },

    /// A platform was created but its result could not be persisted, and
    /// the best-effort destroy failed too: a live resource exists that no
    /// record points at
    PlatformOrphaned {
        env_id: EnvironmentId,
        platform: QualifiedName,
        message: String,
    },

    /// Disaster cleanup fan-out finished
    CleanupCompleted { env_id: EnvironmentId },

    /// One platform torn down
    PlatformDestroyed {
        env_id: EnvironmentId,
        platform: QualifiedName,
    },

    /// One platform failed to tear down
    PlatformDestroyFailed {
        env_id: EnvironmentId,
        platform: QualifiedName,
        message: String,
    },

    /// Destroy workflow finished; `status` is the aggregate outcome
    EnvironmentDestroyed {
        env_id: EnvironmentId,
        status: EnvStatus,
    },

    /// Environment and all dependent records removed
    EnvironmentDeleted { env_id: EnvironmentId },
}
