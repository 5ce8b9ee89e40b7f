use std::collections::HashMap;
use std::io::Write;

use bag_api::SerializationFormatDeserializer;

use crate::config::{DumpArgs, DumpSettings, InspectConfig};
use crate::error::InspectError;

pub fn run(args: &DumpArgs, config: &InspectConfig, out: &mut impl Write) -> Result<(), InspectError> {
    let settings = DumpSettings::resolve(args, config);
    let registry = super::registry();
    let mut storage = super::open_storage(&registry, config, &args.bag)?;

    // One deserializer per serialization format; topic -> (host type, format).
    let mut deserializers: HashMap<String, Box<dyn SerializationFormatDeserializer>> = HashMap::new();
    let mut types = HashMap::new();
    for topic in storage.get_all_topics_and_types()? {
        if !deserializers.contains_key(&topic.serialization_format) {
            let deserializer = registry.create_deserializer(&topic.serialization_format)?;
            deserializers.insert(topic.serialization_format.clone(), deserializer);
        }
        types.insert(topic.name, (topic.type_name, topic.serialization_format));
    }

    let mut printed = 0usize;
    while storage.has_next() && settings.limit.is_none_or(|limit| printed < limit) {
        let record = storage.read_next()?;
        if !settings.wants(&record.topic_name) {
            continue;
        }
        let Some((type_name, format)) = types.get(&record.topic_name) else {
            tracing::warn!(topic = %record.topic_name, "record on a topic the storage did not list");
            continue;
        };
        let Some(deserializer) = deserializers.get(format) else {
            continue;
        };
        let message = deserializer.deserialize(&record, Some(type_name.as_str()))?;
        if settings.pretty {
            serde_json::to_writer_pretty(&mut *out, &message)?;
        } else {
            serde_json::to_writer(&mut *out, &message)?;
        }
        writeln!(out)?;
        printed += 1;
    }

    storage.close();
    tracing::info!(printed, "dump finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::test_support::{path, sample_bag};

    fn dump(args: DumpArgs) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        run(&args, &InspectConfig::default(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn args(file: &tempfile::NamedTempFile) -> DumpArgs {
        DumpArgs { bag: path(file), topics: Vec::new(), limit: None, pretty: false }
    }

    #[test]
    fn dumps_mapped_records_in_time_order() {
        let file = sample_bag();
        let lines = dump(args(&file));
        let topics: Vec<_> = lines.iter().map(|l| l["topic_name"].as_str().unwrap()).collect();
        assert_eq!(topics, vec!["/chatter", "/flag", "/chatter", "/chatter"]);
        assert_eq!(lines[1]["fields"]["data"], true);
        assert_eq!(lines[3]["fields"]["data"], "three");
        assert_eq!(lines[3]["time_stamp"], 3_000_000_000i64);
        assert_eq!(lines[0]["message_type"], "std_msgs/msg/String");
    }

    #[test]
    fn topic_filter_and_limit() {
        let file = sample_bag();
        let lines = dump(DumpArgs {
            topics: vec!["/chatter".into()],
            limit: Some(2),
            ..args(&file)
        });
        let data: Vec<_> = lines.iter().map(|l| l["fields"]["data"].as_str().unwrap()).collect();
        assert_eq!(data, vec!["one", "two"]);
    }
}
