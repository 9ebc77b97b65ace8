//! ELM Store - the persistence gateway
//!
//! The store is the only component allowed to mutate durable state. All
//! status transitions go through conditional compare-and-swap writes, and
//! illegal transitions are rejected against the transition tables before
//! anything is persisted. The in-memory implementation is suitable for
//! development and testing; production deployments should use a persistent
//! backend implementing [`EnvStore`].

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::InMemoryEnvStore;
pub use traits::EnvStore;
