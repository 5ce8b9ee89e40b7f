use std::io::Write;

use crate::config::{BagArgs, InspectConfig};
use crate::error::InspectError;

/// One line per readable topic: name, host type, message count.
pub fn run(args: &BagArgs, config: &InspectConfig, out: &mut impl Write) -> Result<(), InspectError> {
    let registry = super::registry();
    let storage = super::open_storage(&registry, config, &args.bag)?;
    let metadata = storage.get_metadata()?;

    let width = metadata
        .topics_with_message_count
        .iter()
        .map(|t| t.topic_metadata.name.len())
        .max()
        .unwrap_or(0);
    for topic in &metadata.topics_with_message_count {
        writeln!(
            out,
            "{:<width$}  {}  {}",
            topic.topic_metadata.name, topic.topic_metadata.type_name, topic.message_count
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::test_support::{path, sample_bag};

    #[test]
    fn lists_mapped_topics_only() {
        let file = sample_bag();
        let mut out = Vec::new();
        run(&BagArgs { bag: path(&file) }, &InspectConfig::default(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["/chatter  std_msgs/msg/String  3", "/flag     std_msgs/msg/Bool  1"]
        );
    }
}
