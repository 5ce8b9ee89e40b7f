use std::collections::HashMap;

use crate::error::PluginError;
use crate::storage::{
    DeserializerFactory, ReadOnlyStorage, SerializationFormatDeserializer, StorageFactory,
};

/// Explicit name → factory registry.
///
/// The host builds it once at startup and asks each plugin crate to
/// register itself. Storages are keyed by storage identifier,
/// deserializers by serialization format tag.
#[derive(Default)]
pub struct PluginRegistry {
    storages: HashMap<String, Box<dyn StorageFactory>>,
    deserializers: HashMap<String, Box<dyn DeserializerFactory>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a storage factory. A later registration under the same
    /// identifier replaces the earlier one.
    pub fn register_storage(
        &mut self,
        storage_id: impl Into<String>,
        factory: impl StorageFactory + 'static,
    ) {
        self.storages.insert(storage_id.into(), Box::new(factory));
    }

    pub fn register_deserializer(
        &mut self,
        serialization_format: impl Into<String>,
        factory: impl DeserializerFactory + 'static,
    ) {
        self.deserializers
            .insert(serialization_format.into(), Box::new(factory));
    }

    pub fn create_storage(&self, storage_id: &str) -> Result<Box<dyn ReadOnlyStorage>, PluginError> {
        let factory = self
            .storages
            .get(storage_id)
            .ok_or_else(|| PluginError::new(format!("storage '{storage_id}' not registered")))?;
        factory.create()
    }

    pub fn create_deserializer(
        &self,
        serialization_format: &str,
    ) -> Result<Box<dyn SerializationFormatDeserializer>, PluginError> {
        let factory = self.deserializers.get(serialization_format).ok_or_else(|| {
            PluginError::new(format!(
                "deserializer for '{serialization_format}' not registered"
            ))
        })?;
        factory.create()
    }

    pub fn storage_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.storages.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
