#![allow(dead_code)]

use std::sync::Mutex;

use bag_api::{IoFlag, ReadOnlyStorage};
use bag_v2_plugins::{ChannelObserver, RosbagV2Storage};
use rosbag::testing::{BagBuilder, ChunkCompression};
use rosbag::Time;
use tempfile::NamedTempFile;

pub const CHATTER_TYPE: &str = "std_msgs/String";
pub const UNMAPPED_TYPE: &str = "custom_msgs/Telemetry";

/// Legacy encoding of a `string` field.
pub fn ros_string(s: &str) -> Vec<u8> {
    let mut out = (s.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out
}

pub fn write_bag(builder: &BagBuilder) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    builder.write_to(file.path()).unwrap();
    file
}

pub fn open_storage(file: &NamedTempFile) -> RosbagV2Storage {
    let mut storage = RosbagV2Storage::new();
    storage
        .open(file.path().to_str().unwrap(), IoFlag::ReadOnly)
        .unwrap();
    storage
}

/// Name the storage reports as the relative file path of `file`.
pub fn file_name(file: &NamedTempFile) -> String {
    file.path().file_name().unwrap().to_str().unwrap().to_string()
}

/// `/chatter` (mapped) with records at 100, 200 and 300 ns, interleaved
/// with five `/unmapped_topic` records at 50..450 ns.
pub fn chatter_bag(compression: ChunkCompression) -> BagBuilder {
    let mut b = BagBuilder::new().compression(compression).messages_per_chunk(3);
    b.connection(0, "/chatter", CHATTER_TYPE);
    b.connection(1, "/unmapped_topic", UNMAPPED_TYPE);
    for (i, ns) in [50u64, 150, 250, 350, 450].into_iter().enumerate() {
        b.message(1, Time::from_nsec(ns), &[i as u8; 6]);
        if ns < 350 {
            let text = format!("hello {}", i + 1);
            b.message(0, Time::from_nsec(ns + 50), &ros_string(&text));
        }
    }
    b
}

/// Collects skipped-channel diagnostics.
#[derive(Default)]
pub struct Recorder(pub Mutex<Vec<(String, String)>>);

impl Recorder {
    pub fn skipped(&self) -> Vec<(String, String)> {
        self.0.lock().unwrap().clone()
    }
}

impl ChannelObserver for Recorder {
    fn channel_skipped(&self, topic: &str, legacy_type: &str) {
        self.0
            .lock()
            .unwrap()
            .push((topic.to_string(), legacy_type.to_string()));
    }
}
