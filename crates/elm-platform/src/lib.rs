//! ELM Platform - the capability contract every platform plugin implements
//!
//! A platform is one opaque, independently lifecycled component of an
//! environment. The orchestrator drives platforms exclusively through the
//! [`Platform`] trait and builds them through [`PlatformFactory`] values
//! held in an explicit registration table; there is no reflective lookup.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod factory;
pub mod handle;
pub mod platform;

pub use error::{PlatformError, PlatformResult};
pub use factory::{PlatformFactory, ValidationError};
pub use handle::PlatformHandle;
pub use platform::{CreateOutput, Platform};
