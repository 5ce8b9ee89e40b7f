use crate::error::PluginError;
use crate::message::IntrospectionMessage;
use crate::types::{BagMetadata, IoFlag, SerializedBagMessage, TopicMetadata};

// ════════════════════════════════════════════════════════════════
//  Storage Plugin Traits
// ════════════════════════════════════════════════════════════════

/// Read-only sequential log storage.
///
/// All calls are synchronous and block on file I/O. An instance owns a
/// single forward-only cursor and is not meant to be shared between
/// threads; open one instance per reader instead.
///
/// Lifecycle: `open` once, iterate with `has_next`/`read_next`, `close`
/// (or drop). Calling `open` twice without `close` in between is a
/// caller bug.
pub trait ReadOnlyStorage: Send {
    /// Open the log at `uri`. Implementations reject `IoFlag::ReadWrite`
    /// before touching the file system.
    fn open(&mut self, uri: &str, flag: IoFlag) -> Result<(), PluginError>;

    /// `true` iff another record can be read. No side effects.
    fn has_next(&self) -> bool;

    /// Return the next record and advance the cursor by exactly one.
    /// Fails with `ErrorKind::EndOfLog` when `has_next()` is `false`.
    fn read_next(&mut self) -> Result<SerializedBagMessage, PluginError>;

    /// Topics readable through this storage, one entry per topic.
    fn get_all_topics_and_types(&self) -> Result<Vec<TopicMetadata>, PluginError>;

    /// Recomputed on every call.
    fn get_metadata(&self) -> Result<BagMetadata, PluginError>;

    fn get_storage_identifier(&self) -> &str;

    fn get_bagfile_size(&self) -> Result<u64, PluginError>;

    fn get_relative_file_path(&self) -> Result<String, PluginError>;

    /// Release the underlying file. Safe to call on an instance that was
    /// never opened or whose `open` failed.
    fn close(&mut self);
}

/// Converts a storage record into the host's introspectable message.
pub trait SerializationFormatDeserializer: Send + Sync {
    /// `type_hint` is the host type the caller expects. Implementations
    /// whose records are self-describing may ignore it.
    fn deserialize(
        &self,
        message: &SerializedBagMessage,
        type_hint: Option<&str>,
    ) -> Result<IntrospectionMessage, PluginError>;

    /// Serialization format tag this deserializer handles.
    fn serialization_format(&self) -> &str;
}

// ════════════════════════════════════════════════════════════════
//  Factories
// ════════════════════════════════════════════════════════════════

/// Creates fresh storage instances. One instance per reader.
pub trait StorageFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn ReadOnlyStorage>, PluginError>;
}

impl<F> StorageFactory for F
where
    F: Fn() -> Result<Box<dyn ReadOnlyStorage>, PluginError> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn ReadOnlyStorage>, PluginError> {
        self()
    }
}

pub trait DeserializerFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn SerializationFormatDeserializer>, PluginError>;
}

impl<F> DeserializerFactory for F
where
    F: Fn() -> Result<Box<dyn SerializationFormatDeserializer>, PluginError> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn SerializationFormatDeserializer>, PluginError> {
        self()
    }
}
