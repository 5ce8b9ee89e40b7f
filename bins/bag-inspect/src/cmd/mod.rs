pub mod dump;
pub mod info;
pub mod topics;

use bag_api::{IoFlag, PluginRegistry, ReadOnlyStorage};

use crate::config::InspectConfig;
use crate::error::InspectError;

/// Registry with every plugin this binary ships.
pub fn registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    bag_v2_plugins::register(&mut registry);
    registry
}

/// Create the configured storage and open `bag` read-only.
pub fn open_storage(
    registry: &PluginRegistry,
    config: &InspectConfig,
    bag: &str,
) -> Result<Box<dyn ReadOnlyStorage>, InspectError> {
    let mut storage = registry.create_storage(&config.storage)?;
    storage.open(bag, IoFlag::ReadOnly)?;
    tracing::debug!(bag, storage = %config.storage, "opened bag");
    Ok(storage)
}
