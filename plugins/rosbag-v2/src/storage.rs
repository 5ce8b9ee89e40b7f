use std::path::Path;
use std::sync::Arc;

use bag_api::{
    BagMetadata, IoFlag, PluginError, ReadOnlyStorage, SerializedBagMessage, TopicInformation,
    TopicMetadata,
};
use rosbag::{Bag, BagError, Query};

use crate::tagged::TaggedRecordBuffer;
use crate::view::{mapped_channels, ChannelObserver, FilteredView, SilentObserver, TracingObserver};
use crate::IDENTIFIER;

/// Host metadata schema version reported by `get_metadata`.
const METADATA_VERSION: u32 = 2;

// ════════════════════════════════════════════════════════════════
//  RosbagV2Storage
// ════════════════════════════════════════════════════════════════

enum State {
    Unopened,
    Opened(OpenBag),
    Closed,
}

struct OpenBag {
    uri: String,
    file_name: String,
    bag: Bag,
    view: FilteredView,
}

/// Read-only storage over a ROS bag 2.0 file.
///
/// Only channels whose legacy type has a mapping are visible: they alone
/// are listed by `get_all_topics_and_types` and returned by `read_next`.
/// Each record is emitted as a `TaggedRecordBuffer` so the deserializer
/// can transcode it without a schema side channel.
///
/// Calling `open` on an already opened storage replaces the open log.
/// After `close` the storage is unusable.
pub struct RosbagV2Storage {
    state: State,
    observer: Arc<dyn ChannelObserver>,
}

impl Default for RosbagV2Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl RosbagV2Storage {
    pub fn new() -> Self {
        Self::with_observer(Arc::new(TracingObserver))
    }

    /// Storage reporting skipped channels to `observer` instead of the log.
    pub fn with_observer(observer: Arc<dyn ChannelObserver>) -> Self {
        Self { state: State::Unopened, observer }
    }

    fn opened(&self) -> Result<&OpenBag, PluginError> {
        match &self.state {
            State::Opened(open) => Ok(open),
            State::Unopened => Err(PluginError::new("storage is not open")),
            State::Closed => Err(PluginError::new("storage is closed")),
        }
    }

    fn opened_mut(&mut self) -> Result<&mut OpenBag, PluginError> {
        match &mut self.state {
            State::Opened(open) => Ok(open),
            State::Unopened => Err(PluginError::new("storage is not open")),
            State::Closed => Err(PluginError::new("storage is closed")),
        }
    }
}

/// Final path component of `uri`; the uri itself when it has none.
fn file_name(uri: &str) -> String {
    Path::new(uri)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| uri.to_string())
}

fn read_err(e: BagError) -> PluginError {
    match e {
        BagError::Io(e) => PluginError::io(e.to_string()),
        other => PluginError::format_err(other.to_string()),
    }
}

impl ReadOnlyStorage for RosbagV2Storage {
    fn open(&mut self, uri: &str, flag: IoFlag) -> Result<(), PluginError> {
        if flag != IoFlag::ReadOnly {
            return Err(PluginError::unsupported_mode(format!(
                "{IDENTIFIER} storage is read-only, requested {flag}"
            )));
        }
        if matches!(self.state, State::Closed) {
            return Err(PluginError::new("storage is closed"));
        }

        let bag = Bag::open(uri).map_err(|e| PluginError::open(format!("{uri}: {e}")))?;
        let view = FilteredView::build(&bag, self.observer.as_ref());
        tracing::debug!(
            uri,
            topics = view.channels().len(),
            records = view.remaining(),
            "rosbag_v2 storage opened"
        );

        self.state = State::Opened(OpenBag {
            uri: uri.to_string(),
            file_name: file_name(uri),
            bag,
            view,
        });
        Ok(())
    }

    fn has_next(&self) -> bool {
        match &self.state {
            State::Opened(open) => open.view.has_next(),
            State::Unopened | State::Closed => false,
        }
    }

    fn read_next(&mut self) -> Result<SerializedBagMessage, PluginError> {
        let open = self.opened_mut()?;
        let entry = *open
            .view
            .peek()
            .ok_or_else(|| PluginError::end_of_log(format!("no more records in {}", open.uri)))?;

        let instance = open.bag.instance(&entry).map_err(read_err)?;
        let mut payload = Vec::with_capacity(instance.size());
        instance.write(&mut payload).map_err(read_err)?;
        let serialized_data = TaggedRecordBuffer::new(instance.data_type(), payload).encode()?;
        let topic_name = instance.topic().to_string();

        // u32 seconds always fit in i64 nanoseconds.
        let time_stamp = entry.time.to_nsec() as i64;
        open.view.advance();

        Ok(SerializedBagMessage { topic_name, time_stamp, serialized_data })
    }

    fn get_all_topics_and_types(&self) -> Result<Vec<TopicMetadata>, PluginError> {
        let open = self.opened()?;
        Ok(mapped_channels(&open.bag, &SilentObserver)
            .into_iter()
            .map(|ch| TopicMetadata {
                name: ch.topic,
                type_name: ch.mapping.host_type.to_string(),
                serialization_format: IDENTIFIER.to_string(),
            })
            .collect())
    }

    fn get_metadata(&self) -> Result<BagMetadata, PluginError> {
        let open = self.opened()?;
        let bag = &open.bag;

        // Duration and total count span the whole log, unmapped channels included.
        let full = bag.view(&Query::All);
        let (starting_time_ns, duration_ns) = match (full.begin_time(), full.end_time()) {
            (Some(begin), Some(end)) => (begin.to_nsec(), end.to_nsec() - begin.to_nsec()),
            _ => (0, 0),
        };

        let topics_with_message_count = mapped_channels(bag, &SilentObserver)
            .into_iter()
            .map(|ch| {
                let message_count = bag.view(&ch.query(bag)).size() as u64;
                TopicInformation {
                    topic_metadata: TopicMetadata {
                        type_name: ch.mapping.host_type.to_string(),
                        name: ch.topic,
                        serialization_format: IDENTIFIER.to_string(),
                    },
                    message_count,
                }
            })
            .collect();

        Ok(BagMetadata {
            version: METADATA_VERSION,
            storage_identifier: IDENTIFIER.to_string(),
            relative_file_paths: vec![open.file_name.clone()],
            bag_size: bag.file_size().map_err(read_err)?,
            duration_ns,
            starting_time_ns,
            message_count: full.size() as u64,
            topics_with_message_count,
        })
    }

    fn get_storage_identifier(&self) -> &str {
        IDENTIFIER
    }

    fn get_bagfile_size(&self) -> Result<u64, PluginError> {
        self.opened()?.bag.file_size().map_err(read_err)
    }

    fn get_relative_file_path(&self) -> Result<String, PluginError> {
        Ok(self.opened()?.file_name.clone())
    }

    fn close(&mut self) {
        if let State::Opened(open) = std::mem::replace(&mut self.state, State::Closed) {
            open.bag.close();
        }
    }
}

impl Drop for RosbagV2Storage {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bag_api::ErrorKind;

    #[test]
    fn write_mode_rejected_before_io() {
        let mut storage = RosbagV2Storage::new();
        let err = storage
            .open("/definitely/not/here.bag", IoFlag::ReadWrite)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMode);
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bag");
        let mut storage = RosbagV2Storage::new();
        let err = storage.open(path.to_str().unwrap(), IoFlag::ReadOnly).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Open);
        assert!(!storage.has_next());
    }

    #[test]
    fn relative_path_is_the_file_name() {
        assert_eq!(file_name("/var/log/run_1.bag"), "run_1.bag");
        assert_eq!(file_name("run_1.bag"), "run_1.bag");
        assert_eq!(file_name("logs/run_1.bag"), "run_1.bag");
        assert_eq!(file_name("/"), "/");
    }

    #[test]
    fn unopened_and_closed_storage() {
        let mut storage = RosbagV2Storage::new();
        assert!(!storage.has_next());
        assert_eq!(storage.read_next().unwrap_err().kind(), ErrorKind::Logic);
        assert_eq!(storage.get_storage_identifier(), "rosbag_v2");

        // Close without open is fine; afterwards everything is invalid.
        storage.close();
        assert_eq!(storage.get_metadata().unwrap_err().kind(), ErrorKind::Logic);
        assert_eq!(
            storage.open("whatever.bag", IoFlag::ReadOnly).unwrap_err().kind(),
            ErrorKind::Logic
        );
        storage.close();
    }
}
