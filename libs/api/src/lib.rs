//! Host-side contracts for read-only log storages and the deserializers
//! that turn their records into introspectable messages.

mod error;
mod message;
mod registry;
mod storage;
mod types;

pub use error::{ErrorKind, PluginError};
pub use message::{FieldValue, IntrospectionMessage, MessageFields, MessageWriter};
pub use registry::PluginRegistry;
pub use storage::{
    DeserializerFactory, ReadOnlyStorage, SerializationFormatDeserializer, StorageFactory,
};
pub use types::{BagMetadata, IoFlag, SerializedBagMessage, TopicInformation, TopicMetadata};
