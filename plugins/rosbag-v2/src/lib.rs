//! Storage and deserializer plugins reading ROS bag 2.0 files.
//!
//! The storage exposes only channels whose legacy type is in the
//! [`mapping`] table and emits every record as a [`TaggedRecordBuffer`].
//! The deserializer decodes that envelope and transcodes the payload
//! into an [`IntrospectionMessage`](bag_api::IntrospectionMessage).
//!
//! ```rust,no_run
//! use bag_api::{IoFlag, PluginRegistry};
//!
//! # fn main() -> Result<(), bag_api::PluginError> {
//! let mut registry = PluginRegistry::new();
//! bag_v2_plugins::register(&mut registry);
//!
//! let mut storage = registry.create_storage("rosbag_v2")?;
//! let deserializer = registry.create_deserializer("rosbag_v2")?;
//! storage.open("recording.bag", IoFlag::ReadOnly)?;
//! while storage.has_next() {
//!     let record = storage.read_next()?;
//!     let msg = deserializer.deserialize(&record, None)?;
//!     println!("{} {}", msg.topic_name, msg.message_type);
//! }
//! # Ok(())
//! # }
//! ```

pub mod convert;
mod deserializer;
pub mod mapping;
mod storage;
mod tagged;
mod view;

use bag_api::{PluginError, PluginRegistry, ReadOnlyStorage, SerializationFormatDeserializer};

pub use deserializer::RosbagV2Deserializer;
pub use storage::RosbagV2Storage;
pub use tagged::TaggedRecordBuffer;
pub use view::{
    mapped_channels, ChannelObserver, FilteredView, MappedChannel, SilentObserver, TracingObserver,
};

/// Storage identifier and serialization format tag of this plugin.
pub const IDENTIFIER: &str = "rosbag_v2";

/// Register the storage and the deserializer under [`IDENTIFIER`].
pub fn register(registry: &mut PluginRegistry) {
    registry.register_storage(IDENTIFIER, || -> Result<Box<dyn ReadOnlyStorage>, PluginError> {
        Ok(Box::new(RosbagV2Storage::new()))
    });
    registry.register_deserializer(
        IDENTIFIER,
        || -> Result<Box<dyn SerializationFormatDeserializer>, PluginError> {
            Ok(Box::new(RosbagV2Deserializer))
        },
    );
}
