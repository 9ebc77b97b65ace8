//! Qualified platform names
//!
//! A qualified name is a `<plugin>@<kind>` pair: which plugin implementation
//! to use for which platform kind. A bare kind means "use the
//! existing-instance plugin for that kind" and is rewritten to
//! `existing@<kind>`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Plugin name substituted for bare platform-kind keys.
pub const DEFAULT_PLUGIN: &str = "existing";

/// A `<plugin>@<kind>` qualified platform name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    plugin: String,
    kind: String,
}

/// Malformed qualified-name errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QualifiedNameError {
    #[error("qualified name `{0}` has an empty plugin component")]
    EmptyPlugin(String),

    #[error("qualified name `{0}` has an empty platform kind")]
    EmptyKind(String),

    #[error("qualified name `{0}` contains more than one `@`")]
    TooManySeparators(String),
}

impl QualifiedName {
    /// Build a qualified name from explicit components.
    pub fn new(plugin: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            kind: kind.into(),
        }
    }

    /// Parse a spec key. A key without `@` resolves to the default
    /// (existing-instance) plugin for that kind.
    pub fn parse(key: &str) -> Result<Self, QualifiedNameError> {
        let mut parts = key.split('@');
        let first = parts.next().unwrap_or("");
        match (parts.next(), parts.next()) {
            (None, _) => {
                if first.is_empty() {
                    return Err(QualifiedNameError::EmptyKind(key.to_string()));
                }
                Ok(Self::new(DEFAULT_PLUGIN, first))
            }
            (Some(kind), None) => {
                if first.is_empty() {
                    return Err(QualifiedNameError::EmptyPlugin(key.to_string()));
                }
                if kind.is_empty() {
                    return Err(QualifiedNameError::EmptyKind(key.to_string()));
                }
                Ok(Self::new(first, kind))
            }
            (Some(_), Some(_)) => Err(QualifiedNameError::TooManySeparators(key.to_string())),
        }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// The platform kind: the component after `@`.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.plugin, self.kind)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = QualifiedNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        QualifiedName::parse(&value)
    }
}

impl From<QualifiedName> for String {
    fn from(value: QualifiedName) -> Self {
        value.to_string()
    }
}
