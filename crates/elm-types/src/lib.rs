//! ELM Types - Core types for environment lifecycle orchestration
//!
//! ELM (Environment Lifecycle Manager) creates, health-checks, cleans up,
//! and destroys sets of heterogeneous platform instances that together
//! compose one logical environment.
//!
//! ## Architectural Boundaries
//!
//! - **elm-manager** owns: the creation workflow, fan-out operations,
//!   destroy/delete policy
//! - **elm-store** owns: durable records and conditional status writes
//! - **Platform plugins** own: the actual create/destroy/cleanup side
//!   effects, including their own retry and timeout policy
//!
//! ## Key Concepts
//!
//! - **Environment**: aggregate root owning N platform records
//! - **Platform**: one pluggable, independently lifecycled component
//! - **Qualified name**: `<plugin>@<kind>` identifying a plugin
//!   implementation for a platform kind
//! - **Reports**: typed health/info/cleanup results with a boundary
//!   validation the orchestrator runs on every platform call

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod ids;
pub mod qualified;
pub mod record;
pub mod report;
pub mod status;

pub use ids::{EnvironmentId, PlatformId};
pub use qualified::{QualifiedName, QualifiedNameError, DEFAULT_PLUGIN};
pub use record::{
    EnvironmentRecord, Extras, NewEnvironment, NewPlatform, PlatformRecord, SpecDocument,
};
pub use report::{
    CleanupErrorEntry, CleanupReport, DiscoveryReport, HealthReport, InfoReport, ReportError,
    ResourceCounts, Traceback,
};
pub use status::{EnvStatus, PlatformStatus};
