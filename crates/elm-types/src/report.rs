//! Typed platform reports and their boundary validation
//!
//! Platforms hand these back from `check_health()`, `info()`, `cleanup()`
//! and environ discovery. The orchestrator runs `validate()` on every
//! report before trusting it; a violation is a plugin-authoring defect and
//! gets a synthesized replacement with a fixed diagnostic message and no
//! traceback, while a genuine call failure gets one with the structured
//! traceback attached.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Structured three-part trace attached to genuine failures:
/// the error type, its message, and the frames leading to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traceback {
    pub error_type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<String>,
}

impl Traceback {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
            frames: Vec::new(),
        }
    }

    /// Capture a trace from any error value.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        let mut frames = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            frames.push(cause.to_string());
            source = cause.source();
        }
        Self {
            error_type: std::any::type_name::<E>().to_string(),
            message: err.to_string(),
            frames,
        }
    }
}

/// Malformed-report errors raised by boundary validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("report marked available carries a traceback")]
    TracebackOnHealthy,

    #[error("report carries a traceback without an error message")]
    TracebackWithoutError,

    #[error("report `{field}` total {total} does not match per-resource sum {sum}")]
    CountMismatch {
        field: &'static str,
        total: u64,
        sum: u64,
    },

    #[error("discovery report marked unavailable carries a spec")]
    SpecOnUnavailable,
}

/// Liveness/availability probe result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub available: bool,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<Traceback>,
}

impl HealthReport {
    pub fn available() -> Self {
        Self {
            available: true,
            message: String::new(),
            traceback: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
            traceback: None,
        }
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.available && self.traceback.is_some() {
            return Err(ReportError::TracebackOnHealthy);
        }
        Ok(())
    }
}

/// Free-form descriptive platform dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoReport {
    pub info: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<Traceback>,
}

impl InfoReport {
    pub fn new(info: Value) -> Self {
        Self {
            info,
            error: None,
            traceback: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            info: Value::Null,
            error: Some(message.into()),
            traceback: None,
        }
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.traceback.is_some() && self.error.is_none() {
            return Err(ReportError::TracebackWithoutError);
        }
        Ok(())
    }
}

/// Per-resource-type counters within a cleanup report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounts {
    pub discovered: u64,
    pub deleted: u64,
    pub failed: u64,
}

/// One cleanup failure entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupErrorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<Traceback>,
}

impl CleanupErrorEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            resource_id: None,
            resource_type: None,
            message: message.into(),
            traceback: None,
        }
    }
}

/// Disaster-cleanup result over a platform's leaked resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupReport {
    #[serde(default)]
    pub message: String,

    pub discovered: u64,
    pub deleted: u64,
    pub failed: u64,

    /// Counters broken down by resource type
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceCounts>,

    #[serde(default)]
    pub errors: Vec<CleanupErrorEntry>,
}

impl CleanupReport {
    /// An empty, successful cleanup.
    pub fn empty() -> Self {
        Self {
            message: String::new(),
            discovered: 0,
            deleted: 0,
            failed: 0,
            resources: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Synthesized report for a broken or failed cleanup call.
    pub fn failed(error: CleanupErrorEntry) -> Self {
        Self {
            message: "Failed".to_string(),
            discovered: 0,
            deleted: 0,
            failed: 0,
            resources: BTreeMap::new(),
            errors: vec![error],
        }
    }

    /// Report for a platform that does not implement cleanup.
    pub fn not_implemented() -> Self {
        Self {
            message: "Not implemented".to_string(),
            ..Self::empty()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// When per-resource counters are reported, they must sum to the totals.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.resources.is_empty() {
            return Ok(());
        }
        let sums = self.resources.values().fold((0, 0, 0), |acc, c| {
            (acc.0 + c.discovered, acc.1 + c.deleted, acc.2 + c.failed)
        });
        for (field, total, sum) in [
            ("discovered", self.discovered, sums.0),
            ("deleted", self.deleted, sums.1),
            ("failed", self.failed, sums.2),
        ] {
            if total != sum {
                return Err(ReportError::CountMismatch { field, total, sum });
            }
        }
        Ok(())
    }
}

/// Result of asking a plugin to compose a platform spec from the process
/// environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub available: bool,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<Traceback>,
}

impl DiscoveryReport {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
            spec: None,
            traceback: None,
        }
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.available && self.traceback.is_some() {
            return Err(ReportError::TracebackOnHealthy);
        }
        if !self.available && self.spec.is_some() {
            return Err(ReportError::SpecOnUnavailable);
        }
        Ok(())
    }
}
