//! Environment and platform lifecycle statuses with transition tables
//!
//! Every status change goes through a conditional write against the store,
//! and the store rejects transitions that are not listed here before
//! anything is persisted.

use serde::{Deserialize, Serialize};

/// Environment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvStatus {
    /// Environment and platform records inserted, creation in progress
    Initializing,
    /// Every platform reached READY (or none failed)
    Ready,
    /// At least one platform failed during creation
    FailedToCreate,
    /// Disaster cleanup fan-out in progress
    Cleaning,
    /// Destroy fan-out in progress
    Destroying,
    /// At least one platform failed to destroy
    FailedToDestroy,
    /// Every platform destroyed; eligible for deletion
    Destroyed,
}

impl EnvStatus {
    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition_to(&self, to: EnvStatus) -> bool {
        use EnvStatus::*;
        matches!(
            (*self, to),
            (Initializing, Ready)
                | (Initializing, FailedToCreate)
                | (Ready, Destroying)
                | (Ready, Cleaning)
                | (Cleaning, Ready)
                | (FailedToCreate, Destroying)
                | (Destroying, Destroyed)
                | (Destroying, FailedToDestroy)
                | (FailedToDestroy, Destroying)
        )
    }
}

impl std::fmt::Display for EnvStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EnvStatus::Initializing => "INITIALIZING",
            EnvStatus::Ready => "READY",
            EnvStatus::FailedToCreate => "FAILED_TO_CREATE",
            EnvStatus::Cleaning => "CLEANING",
            EnvStatus::Destroying => "DESTROYING",
            EnvStatus::FailedToDestroy => "FAILED_TO_DESTROY",
            EnvStatus::Destroyed => "DESTROYED",
        };
        write!(f, "{s}")
    }
}

/// Platform lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlatformStatus {
    /// Record inserted, `create()` not yet finished
    Initializing,
    /// Never attempted because an earlier platform in the same
    /// environment failed to create
    Skipped,
    /// Created successfully
    Ready,
    /// `create()` failed, or its result could not be persisted
    FailedToCreate,
    /// `destroy()` in progress
    Destroying,
    /// `destroy()` failed
    FailedToDestroy,
    /// Torn down
    Destroyed,
}

impl PlatformStatus {
    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition_to(&self, to: PlatformStatus) -> bool {
        use PlatformStatus::*;
        matches!(
            (*self, to),
            (Initializing, Ready)
                | (Initializing, Skipped)
                | (Initializing, FailedToCreate)
                | (Ready, Destroying)
                | (FailedToCreate, Destroying)
                | (Destroying, Destroyed)
                | (Destroying, FailedToDestroy)
                | (FailedToDestroy, Destroying)
        )
    }

    /// Terminal statuses never transition on their own; while any platform
    /// is non-terminal its environment must not be READY or DESTROYED.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlatformStatus::Ready
                | PlatformStatus::Skipped
                | PlatformStatus::Destroyed
                | PlatformStatus::FailedToCreate
                | PlatformStatus::FailedToDestroy
        )
    }

    /// Whether there is nothing to tear down for a platform in this status.
    /// SKIPPED platforms never ran `create()`, DESTROYED ones already ran
    /// `destroy()`.
    pub fn nothing_to_destroy(&self) -> bool {
        matches!(self, PlatformStatus::Skipped | PlatformStatus::Destroyed)
    }
}

impl std::fmt::Display for PlatformStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PlatformStatus::Initializing => "INITIALIZING",
            PlatformStatus::Skipped => "SKIPPED",
            PlatformStatus::Ready => "READY",
            PlatformStatus::FailedToCreate => "FAILED_TO_CREATE",
            PlatformStatus::Destroying => "DESTROYING",
            PlatformStatus::FailedToDestroy => "FAILED_TO_DESTROY",
            PlatformStatus::Destroyed => "DESTROYED",
        };
        write!(f, "{s}")
    }
}
