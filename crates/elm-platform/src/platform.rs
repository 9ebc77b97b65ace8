//! The six-operation platform capability contract

use async_trait::async_trait;
use serde_json::Value;

use elm_types::{CleanupReport, HealthReport, InfoReport, QualifiedName, SpecDocument};

use crate::error::{PlatformError, PlatformResult};

/// Output of a successful `create()` call
#[derive(Debug, Clone)]
pub struct CreateOutput {
    /// Externally meaningful result data, handed back to the caller
    pub platform_data: Value,

    /// Internal bookkeeping the plugin needs on subsequent calls
    pub plugin_data: Value,
}

/// One platform instance wrapped behind the capability contract.
///
/// `create` and `destroy` are mandatory; the remaining operations default
/// to an explicit unsupported failure carrying the platform's qualified
/// name, never a silent no-op. No operation may be assumed idempotent
/// unless the concrete plugin documents so, and each plugin owns its own
/// retry and timeout policy.
#[async_trait]
pub trait Platform: Send + Sync {
    /// The `<plugin>@<kind>` name this instance was built under.
    fn qualified_name(&self) -> QualifiedName;

    /// Perform whatever side effects establish the platform.
    async fn create(&self) -> PlatformResult<CreateOutput>;

    /// Tear the platform down. May be invoked even if `create` partially
    /// failed.
    async fn destroy(&self) -> PlatformResult<()>;

    /// Re-apply a changed spec, returning fresh platform data.
    async fn update(&self, _new_spec: &SpecDocument) -> PlatformResult<Value> {
        Err(PlatformError::unsupported(self.qualified_name(), "update"))
    }

    /// Disaster-cleanup of leaked resources, scoped to one task if given.
    async fn cleanup(&self, _task_id: Option<&str>) -> PlatformResult<CleanupReport> {
        Err(PlatformError::unsupported(self.qualified_name(), "cleanup"))
    }

    /// Liveness/availability probe.
    async fn check_health(&self) -> PlatformResult<HealthReport> {
        Err(PlatformError::unsupported(
            self.qualified_name(),
            "check_health",
        ))
    }

    /// Free-form descriptive dump.
    async fn info(&self) -> PlatformResult<InfoReport> {
        Err(PlatformError::unsupported(self.qualified_name(), "info"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BareMinimum;

    #[async_trait]
    impl Platform for BareMinimum {
        fn qualified_name(&self) -> QualifiedName {
            QualifiedName::new("existing", "bare")
        }

        async fn create(&self) -> PlatformResult<CreateOutput> {
            Ok(CreateOutput {
                platform_data: Value::Null,
                plugin_data: Value::Null,
            })
        }

        async fn destroy(&self) -> PlatformResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn optional_operations_default_to_unsupported() {
        let p = BareMinimum;
        let err = p.check_health().await.unwrap_err();
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("existing@bare"));
        assert!(err.to_string().contains("check_health"));

        assert!(p.cleanup(None).await.unwrap_err().is_unsupported());
        assert!(p.info().await.unwrap_err().is_unsupported());
        assert!(p
            .update(&Value::Null)
            .await
            .unwrap_err()
            .is_unsupported());
    }
}
