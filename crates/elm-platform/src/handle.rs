//! Platform handle pairing a durable record with its live implementation

use elm_types::{PlatformRecord, QualifiedName};

use crate::platform::Platform;

/// One platform of an environment: the persisted row plus the plugin
/// instance rebuilt from it. Handles are fetched in persisted order and the
/// orchestrator never reorders them for creation.
pub struct PlatformHandle {
    pub record: PlatformRecord,
    pub platform: Box<dyn Platform>,
}

impl PlatformHandle {
    pub fn new(record: PlatformRecord, platform: Box<dyn Platform>) -> Self {
        Self { record, platform }
    }

    /// The fully qualified `<plugin>@<kind>` name, used as the key of every
    /// aggregate fan-out result.
    pub fn qualified_name(&self) -> &QualifiedName {
        &self.record.plugin_name
    }
}

impl std::fmt::Debug for PlatformHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformHandle")
            .field("id", &self.record.id)
            .field("plugin_name", &self.record.plugin_name)
            .field("status", &self.record.status)
            .finish()
    }
}
