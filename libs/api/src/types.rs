use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  IoFlag
// ════════════════════════════════════════════════════════════════

/// Access mode requested when opening a storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoFlag {
    ReadOnly,
    ReadWrite,
}

impl std::fmt::Display for IoFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoFlag::ReadOnly => write!(f, "read_only"),
            IoFlag::ReadWrite => write!(f, "read_write"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  SerializedBagMessage
// ════════════════════════════════════════════════════════════════

/// One record as produced by a storage.
///
/// `serialized_data` is opaque to the host: only the deserializer
/// registered for the topic's serialization format interprets it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializedBagMessage {
    pub topic_name: String,
    /// Nanoseconds since the Unix epoch.
    pub time_stamp: i64,
    pub serialized_data: Vec<u8>,
}

// ════════════════════════════════════════════════════════════════
//  Topic metadata
// ════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMetadata {
    pub name: String,
    /// Host type name (`pkg/msg/Type`).
    pub type_name: String,
    /// Tag of the deserializer able to read this topic's records.
    pub serialization_format: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicInformation {
    pub topic_metadata: TopicMetadata,
    pub message_count: u64,
}

// ════════════════════════════════════════════════════════════════
//  BagMetadata
// ════════════════════════════════════════════════════════════════

/// Snapshot describing an opened log. Computed on demand, never cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagMetadata {
    pub version: u32,
    pub storage_identifier: String,
    pub relative_file_paths: Vec<String>,
    /// File size in bytes.
    pub bag_size: u64,
    pub duration_ns: u64,
    /// Nanoseconds since the Unix epoch of the earliest record.
    pub starting_time_ns: u64,
    pub message_count: u64,
    pub topics_with_message_count: Vec<TopicInformation>,
}
