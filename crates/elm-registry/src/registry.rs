//! The platform plugin registration table

use std::sync::Arc;

use dashmap::DashMap;

use elm_platform::{PlatformFactory, ValidationError};
use elm_types::{QualifiedName, SpecDocument};

use crate::error::{RegistryError, Result};

/// Maps qualified plugin names to their factories.
///
/// Built once at process start, shared as `Arc<PlatformRegistry>`.
pub struct PlatformRegistry {
    factories: DashMap<QualifiedName, Arc<dyn PlatformFactory>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Register a factory under its own qualified name.
    pub fn register(&self, factory: Arc<dyn PlatformFactory>) -> Result<()> {
        let name = factory.qualified_name();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::PluginAlreadyRegistered(name));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a qualified name to its factory.
    pub fn resolve(&self, name: &QualifiedName) -> Result<Arc<dyn PlatformFactory>> {
        self.factories
            .get(name)
            .map(|f| f.value().clone())
            .ok_or_else(|| RegistryError::PluginNotFound(name.clone()))
    }

    /// Ask a plugin whether its declared schema accepts a spec document.
    /// An empty list means valid; an unknown plugin is a not-found error.
    pub fn validate(
        &self,
        name: &QualifiedName,
        spec: &SpecDocument,
    ) -> Result<Vec<ValidationError>> {
        Ok(self.resolve(name)?.validate_spec(spec))
    }

    /// Every registered factory, ordered by qualified name so discovery
    /// output is deterministic.
    pub fn factories(&self) -> Vec<Arc<dyn PlatformFactory>> {
        let mut all: Vec<_> = self
            .factories
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all.into_iter().map(|(_, f)| f).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elm_platform::{Platform, PlatformError, PlatformResult};
    use elm_types::PlatformRecord;

    struct DummyFactory {
        name: QualifiedName,
        errors: Vec<ValidationError>,
    }

    impl PlatformFactory for DummyFactory {
        fn qualified_name(&self) -> QualifiedName {
            self.name.clone()
        }

        fn validate_spec(&self, _spec: &SpecDocument) -> Vec<ValidationError> {
            self.errors.clone()
        }

        fn build(&self, _record: PlatformRecord) -> PlatformResult<Box<dyn Platform>> {
            Err(PlatformError::failed("dummy factory cannot build"))
        }
    }

    fn dummy(name: &str) -> Arc<dyn PlatformFactory> {
        Arc::new(DummyFactory {
            name: QualifiedName::parse(name).unwrap(),
            errors: Vec::new(),
        })
    }

    #[test]
    fn register_and_resolve() {
        let registry = PlatformRegistry::new();
        registry.register(dummy("existing@docker")).unwrap();

        let name = QualifiedName::parse("existing@docker").unwrap();
        assert!(registry.resolve(&name).is_ok());

        let missing = QualifiedName::parse("existing@nowhere").unwrap();
        assert!(matches!(
            registry.resolve(&missing),
            Err(RegistryError::PluginNotFound(_))
        ));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = PlatformRegistry::new();
        registry.register(dummy("existing@docker")).unwrap();
        assert!(matches!(
            registry.register(dummy("existing@docker")),
            Err(RegistryError::PluginAlreadyRegistered(_))
        ));
    }

    #[test]
    fn validate_collects_plugin_errors() {
        let registry = PlatformRegistry::new();
        registry
            .register(Arc::new(DummyFactory {
                name: QualifiedName::parse("existing@bad").unwrap(),
                errors: vec![
                    ValidationError::new("missing field `auth_url`"),
                    ValidationError::new("`users` must be a list"),
                ],
            }))
            .unwrap();

        let name = QualifiedName::parse("existing@bad").unwrap();
        let errors = registry.validate(&name, &serde_json::json!({})).unwrap();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn factories_are_sorted_by_name() {
        let registry = PlatformRegistry::new();
        registry.register(dummy("zeta@last")).unwrap();
        registry.register(dummy("alpha@first")).unwrap();

        let names: Vec<_> = registry
            .factories()
            .iter()
            .map(|f| f.qualified_name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha@first", "zeta@last"]);
    }
}
