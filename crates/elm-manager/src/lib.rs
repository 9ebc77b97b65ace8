//! ELM Manager - environment lifecycle orchestration
//!
//! The [`EnvManager`] is the aggregate root of the subsystem. It validates
//! multi-platform specs, drives platforms through the creation workflow
//! with partial-failure containment, and exposes health/info/cleanup/
//! destroy as fan-out operations with per-platform error isolation: no
//! single platform's failure ever prevents the other platforms' results
//! from being collected.
//!
//! Collaborators are injected at construction: the plugin registry resolves
//! qualified names to factories, the store owns durable state and enforces
//! the status transition tables through conditional writes.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod events;
pub mod manager;
pub mod outcome;
pub mod validator;

#[cfg(test)]
pub(crate) mod mock;

pub use error::{ManagerError, Result};
pub use events::EnvEvent;
pub use manager::{CreateRequest, EnvManager, ManagerConfig};
pub use outcome::{
    CleanupInfo, DestroyInfo, DestroyOutcome, EnvData, PlatformDestroyResult, SpecDiscovery,
};
pub use validator::{NormalizedEntry, SpecValidator};
