//! ELM Registry - explicit registration table for platform plugins
//!
//! Replaces reflective plugin lookup with a typed table built at process
//! start and passed into the validator and orchestrator by constructor
//! injection. Lifecycle is process start to process shutdown; there are no
//! hidden singletons.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod registry;

pub use error::{RegistryError, Result};
pub use registry::PlatformRegistry;
