//! Spec normalization and validation
//!
//! Turns a raw mapping of short platform-kind names (or already-qualified
//! keys) into normalized `<plugin>@<kind>` entries, then asks each plugin
//! whether its declared schema accepts the entry's document. Validation is
//! collected, not fail-fast: every entry is checked and all errors are
//! gathered before reporting, and nothing durable is written on failure.

use std::collections::HashMap;
use std::sync::Arc;

use elm_registry::PlatformRegistry;
use elm_types::{QualifiedName, SpecDocument};
use serde_json::Value;

use crate::error::{ManagerError, Result};

/// One normalized spec entry
#[derive(Debug, Clone)]
pub struct NormalizedEntry {
    /// Fully qualified `<plugin>@<kind>` key
    pub qualified: QualifiedName,

    /// The bare platform kind, used for the platform row's name
    pub kind: String,

    /// The raw per-platform spec document
    pub spec: SpecDocument,
}

/// Validates multi-platform specification documents
pub struct SpecValidator {
    registry: Arc<PlatformRegistry>,
}

impl SpecValidator {
    pub fn new(registry: Arc<PlatformRegistry>) -> Self {
        Self { registry }
    }

    /// Normalize keys and validate every entry against its plugin.
    ///
    /// On failure, returns a single aggregate error carrying the full spec
    /// and the full list of per-entry errors.
    pub fn normalize_and_validate(
        &self,
        raw: &serde_json::Map<String, Value>,
    ) -> Result<Vec<NormalizedEntry>> {
        let mut errors = Vec::new();
        let mut entries = Vec::new();
        let mut kinds_seen: HashMap<String, QualifiedName> = HashMap::new();

        for (key, doc) in raw {
            let qualified = match QualifiedName::parse(key) {
                Ok(q) => q,
                Err(err) => {
                    errors.push(err.to_string());
                    continue;
                }
            };

            // One plugin per platform kind: two plugins driving the same
            // kind in a single environment would race over shared state.
            if let Some(prev) = kinds_seen.get(qualified.kind()) {
                errors.push(format!(
                    "Using multiple plugins [{prev}, {qualified}] for the same \
                     platform kind in a single environment is not supported"
                ));
                continue;
            }
            kinds_seen.insert(qualified.kind().to_string(), qualified.clone());

            entries.push(NormalizedEntry {
                kind: qualified.kind().to_string(),
                qualified,
                spec: doc.clone(),
            });
        }

        for entry in &entries {
            match self.registry.validate(&entry.qualified, &entry.spec) {
                Ok(entry_errors) => errors.extend(
                    entry_errors
                        .into_iter()
                        .map(|e| format!("{}: {e}", entry.qualified)),
                ),
                Err(err) => errors.push(err.to_string()),
            }
        }

        if !errors.is_empty() {
            return Err(ManagerError::InvalidSpec {
                spec: Value::Object(raw.clone()),
                errors,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFactory;
    use elm_platform::ValidationError;
    use serde_json::json;

    fn registry_with(factories: &[&str]) -> Arc<PlatformRegistry> {
        let registry = Arc::new(PlatformRegistry::new());
        for name in factories {
            registry
                .register(Arc::new(MockFactory::named(name)))
                .unwrap();
        }
        registry
    }

    fn raw(entries: &[(&str, Value)]) -> serde_json::Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn bare_kind_is_rewritten_to_default_plugin() {
        let validator = SpecValidator::new(registry_with(&["existing@devstack"]));
        let entries = validator
            .normalize_and_validate(&raw(&[("devstack", json!({"auth_url": "x"}))]))
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].qualified.to_string(), "existing@devstack");
        assert_eq!(entries[0].kind, "devstack");
    }

    #[test]
    fn duplicate_platform_kind_is_rejected() {
        let validator = SpecValidator::new(registry_with(&[
            "existing@docker",
            "remote@docker",
        ]));
        let err = validator
            .normalize_and_validate(&raw(&[
                ("existing@docker", json!({})),
                ("remote@docker", json!({})),
            ]))
            .unwrap_err();

        match err {
            ManagerError::InvalidSpec { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("same platform kind"));
            }
            other => panic!("expected InvalidSpec, got {other:?}"),
        }
    }

    #[test]
    fn all_errors_are_collected_before_reporting() {
        let registry = Arc::new(PlatformRegistry::new());
        let mut bad = MockFactory::named("existing@bad");
        bad.validation_errors = vec![
            ValidationError::new("missing `auth_url`"),
            ValidationError::new("`users` must be a list"),
        ];
        registry.register(Arc::new(bad)).unwrap();

        let validator = SpecValidator::new(registry);
        let err = validator
            .normalize_and_validate(&raw(&[
                ("existing@bad", json!({})),
                ("existing@unknown", json!({})),
                ("a@b@c", json!({})),
            ]))
            .unwrap_err();

        match err {
            ManagerError::InvalidSpec { errors, .. } => {
                // malformed key + unknown plugin + two schema errors
                assert_eq!(errors.len(), 4);
            }
            other => panic!("expected InvalidSpec, got {other:?}"),
        }
    }

    #[test]
    fn valid_spec_yields_entries_in_key_order() {
        let validator = SpecValidator::new(registry_with(&[
            "existing@alpha",
            "existing@beta",
        ]));
        let entries = validator
            .normalize_and_validate(&raw(&[
                ("existing@beta", json!({})),
                ("existing@alpha", json!({})),
            ]))
            .unwrap();

        let kinds: Vec<_> = entries.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["alpha", "beta"]);
    }
}
