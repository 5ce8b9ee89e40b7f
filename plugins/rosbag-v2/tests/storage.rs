mod common;

use std::sync::Arc;

use bag_api::{ErrorKind, IoFlag, PluginRegistry, ReadOnlyStorage, TopicMetadata};
use bag_v2_plugins::RosbagV2Storage;
use rosbag::testing::{BagBuilder, ChunkCompression};
use rosbag::Time;

use common::{chatter_bag, file_name, open_storage, ros_string, write_bag, Recorder};

#[test]
fn chatter_scenario() {
    let file = write_bag(&chatter_bag(ChunkCompression::None));
    let mut storage = open_storage(&file);

    assert_eq!(
        storage.get_all_topics_and_types().unwrap(),
        vec![TopicMetadata {
            name: "/chatter".into(),
            type_name: "std_msgs/msg/String".into(),
            serialization_format: "rosbag_v2".into(),
        }]
    );

    let mut stamps = Vec::new();
    while storage.has_next() {
        let record = storage.read_next().unwrap();
        assert_eq!(record.topic_name, "/chatter");
        stamps.push(record.time_stamp);
    }
    assert_eq!(stamps, vec![100, 200, 300]);
}

#[test]
fn read_past_end_keeps_failing_without_state_change() {
    let file = write_bag(&chatter_bag(ChunkCompression::None));
    let mut storage = open_storage(&file);
    for _ in 0..3 {
        storage.read_next().unwrap();
    }

    for _ in 0..2 {
        assert!(!storage.has_next());
        let err = storage.read_next().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndOfLog);
    }
    // Still usable for metadata.
    assert_eq!(storage.get_metadata().unwrap().message_count, 8);
}

#[test]
fn write_mode_on_missing_path_is_unsupported_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never-created.bag");
    let mut storage = RosbagV2Storage::new();

    let err = storage.open(path.to_str().unwrap(), IoFlag::ReadWrite).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedMode);
    assert!(!path.exists());

    let err = storage.open(path.to_str().unwrap(), IoFlag::ReadOnly).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Open);
}

#[test]
fn metadata_spans_full_log_and_is_idempotent() {
    let file = write_bag(&chatter_bag(ChunkCompression::None));
    let storage = open_storage(&file);

    let first = storage.get_metadata().unwrap();
    let second = storage.get_metadata().unwrap();
    assert_eq!(first, second);

    assert_eq!(first.storage_identifier, "rosbag_v2");
    assert_eq!(first.bag_size, std::fs::metadata(file.path()).unwrap().len());
    assert_eq!(first.starting_time_ns, 50);
    assert_eq!(first.duration_ns, 400);
    assert_eq!(first.message_count, 8);
    assert_eq!(first.topics_with_message_count.len(), 1);
    assert_eq!(first.topics_with_message_count[0].topic_metadata.name, "/chatter");
    assert_eq!(first.topics_with_message_count[0].message_count, 3);
    assert_eq!(first.relative_file_paths, vec![file_name(&file)]);
}

#[test]
fn empty_log_metadata() {
    let file = write_bag(&BagBuilder::new());
    let mut storage = open_storage(&file);
    let meta = storage.get_metadata().unwrap();
    assert_eq!((meta.starting_time_ns, meta.duration_ns, meta.message_count), (0, 0, 0));
    assert!(meta.topics_with_message_count.is_empty());
    assert!(!storage.has_next());
    assert_eq!(storage.read_next().unwrap_err().kind(), ErrorKind::EndOfLog);
}

#[test]
fn lz4_chunks_yield_only_mapped_records() {
    let file = write_bag(&chatter_bag(ChunkCompression::Lz4));
    let mut storage = open_storage(&file);

    let mut count = 0;
    while storage.has_next() {
        let record = storage.read_next().unwrap();
        assert_eq!(record.topic_name, "/chatter");
        assert!(record.serialized_data.starts_with(b"std_msgs/String\0"));
        count += 1;
    }
    assert_eq!(count, 3);
}

#[test]
fn bz2_chunks_yield_only_mapped_records() {
    let file = write_bag(&chatter_bag(ChunkCompression::Bz2));
    let mut storage = open_storage(&file);

    let mut stamps = Vec::new();
    while storage.has_next() {
        let record = storage.read_next().unwrap();
        assert_eq!(record.topic_name, "/chatter");
        stamps.push(record.time_stamp);
    }
    assert_eq!(stamps, vec![100, 200, 300]);
    assert_eq!(storage.get_metadata().unwrap().message_count, 8);
}

#[test]
fn unmapped_first_type_hides_later_mapped_connection() {
    let mut b = BagBuilder::new();
    b.connection(0, "/mixed", common::UNMAPPED_TYPE);
    b.connection(1, "/mixed", "std_msgs/Int32");
    b.message(0, Time::new(1, 0), &[0; 6]);
    b.message(1, Time::new(2, 0), &7i32.to_le_bytes());
    let file = write_bag(&b);

    let recorder = Arc::new(Recorder::default());
    let mut storage = RosbagV2Storage::with_observer(recorder.clone());
    storage
        .open(file.path().to_str().unwrap(), IoFlag::ReadOnly)
        .unwrap();

    assert!(storage.get_all_topics_and_types().unwrap().is_empty());
    assert!(!storage.has_next());
    assert_eq!(storage.read_next().unwrap_err().kind(), ErrorKind::EndOfLog);

    let meta = storage.get_metadata().unwrap();
    assert_eq!(meta.message_count, 2);
    assert!(meta.topics_with_message_count.is_empty());

    let mut skipped = recorder.skipped();
    skipped.sort();
    assert_eq!(
        skipped,
        vec![
            ("/mixed".to_string(), common::UNMAPPED_TYPE.to_string()),
            ("/mixed".to_string(), "std_msgs/Int32".to_string()),
        ]
    );
}

#[test]
fn topics_are_deduplicated_and_never_leak_legacy_names() {
    let mut b = BagBuilder::new();
    b.connection(0, "/pose", "geometry_msgs/Pose2D");
    b.connection(1, "/flag", "std_msgs/Bool");
    b.connection(2, "/pose", "geometry_msgs/Pose2D");
    b.message(0, Time::new(1, 0), &[0; 24]);
    b.message(1, Time::new(2, 0), &[1]);
    b.message(2, Time::new(3, 0), &[0; 24]);
    let file = write_bag(&b);
    let storage = open_storage(&file);

    let topics: Vec<_> = storage
        .get_all_topics_and_types()
        .unwrap()
        .into_iter()
        .map(|t| (t.name, t.type_name))
        .collect();
    assert_eq!(
        topics,
        vec![
            ("/pose".to_string(), "geometry_msgs/msg/Pose2D".to_string()),
            ("/flag".to_string(), "std_msgs/msg/Bool".to_string()),
        ]
    );

    let counts: Vec<_> = storage
        .get_metadata()
        .unwrap()
        .topics_with_message_count
        .into_iter()
        .map(|t| t.message_count)
        .collect();
    assert_eq!(counts, vec![2, 1]);
}

#[test]
fn observer_sees_skipped_channels() {
    let file = write_bag(&chatter_bag(ChunkCompression::None));
    let recorder = Arc::new(Recorder::default());
    let mut storage = RosbagV2Storage::with_observer(recorder.clone());
    storage
        .open(file.path().to_str().unwrap(), IoFlag::ReadOnly)
        .unwrap();

    assert_eq!(
        recorder.skipped(),
        vec![("/unmapped_topic".to_string(), common::UNMAPPED_TYPE.to_string())]
    );

    // Topic listing and metadata do not repeat the diagnostic.
    storage.get_all_topics_and_types().unwrap();
    storage.get_metadata().unwrap();
    assert_eq!(recorder.skipped().len(), 1);
}

#[test]
fn file_accessors() {
    let file = write_bag(&chatter_bag(ChunkCompression::None));
    let mut storage = open_storage(&file);
    assert_eq!(storage.get_storage_identifier(), "rosbag_v2");
    assert_eq!(
        storage.get_bagfile_size().unwrap(),
        std::fs::metadata(file.path()).unwrap().len()
    );
    let relative = storage.get_relative_file_path().unwrap();
    assert_eq!(relative, file_name(&file));
    assert!(!relative.contains('/'));
    assert_eq!(
        storage.get_metadata().unwrap().relative_file_paths,
        vec![relative]
    );

    storage.close();
    assert!(!storage.has_next());
    assert_eq!(storage.get_bagfile_size().unwrap_err().kind(), ErrorKind::Logic);
}

#[test]
fn registry_creates_storage() {
    let mut registry = PluginRegistry::new();
    bag_v2_plugins::register(&mut registry);
    assert_eq!(registry.storage_ids(), vec!["rosbag_v2"]);

    let mut b = BagBuilder::new();
    b.connection(0, "/chatter", common::CHATTER_TYPE);
    b.message(0, Time::new(1, 0), &ros_string("x"));
    let file = write_bag(&b);

    let mut storage = registry.create_storage("rosbag_v2").unwrap();
    storage
        .open(file.path().to_str().unwrap(), IoFlag::ReadOnly)
        .unwrap();
    assert!(storage.has_next());
    assert_eq!(storage.read_next().unwrap().time_stamp, 1_000_000_000);
}
