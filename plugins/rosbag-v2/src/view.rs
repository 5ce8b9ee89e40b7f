use std::collections::HashSet;

use rosbag::{Bag, IndexEntry, Query, View};

use crate::mapping::{self, TypeMapping};

// ════════════════════════════════════════════════════════════════
//  ChannelObserver
// ════════════════════════════════════════════════════════════════

/// Receives diagnostics about channels excluded from the host view.
pub trait ChannelObserver: Send + Sync {
    fn channel_skipped(&self, topic: &str, legacy_type: &str);
}

/// Default observer: one `info` line per skipped channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ChannelObserver for TracingObserver {
    fn channel_skipped(&self, topic: &str, legacy_type: &str) {
        tracing::info!(topic, legacy_type, "unsupported message type, topic will be skipped");
    }
}

/// Drops every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl ChannelObserver for SilentObserver {
    fn channel_skipped(&self, _topic: &str, _legacy_type: &str) {}
}

// ════════════════════════════════════════════════════════════════
//  Channels
// ════════════════════════════════════════════════════════════════

/// A topic whose first-seen legacy type has a mapping.
#[derive(Debug, Clone)]
pub struct MappedChannel {
    pub topic: String,
    pub legacy_type: String,
    pub mapping: &'static TypeMapping,
}

impl MappedChannel {
    /// Connections carrying this channel: same topic, same legacy type.
    /// A connection on the topic with any other type is never selected.
    pub fn connection_ids(&self, bag: &Bag) -> Vec<u32> {
        bag.connections()
            .iter()
            .filter(|c| c.topic == self.topic && c.datatype == self.legacy_type)
            .map(|c| c.id)
            .collect()
    }

    pub fn query(&self, bag: &Bag) -> Query {
        Query::Connections(self.connection_ids(bag))
    }
}

/// Channels of `bag` with a mapping, deduplicated by topic in file order.
/// Every other channel is reported to `observer` once.
pub fn mapped_channels(bag: &Bag, observer: &dyn ChannelObserver) -> Vec<MappedChannel> {
    let mut seen_topics = HashSet::new();
    let mut reported = HashSet::new();
    let mut first_types = Vec::new();
    for c in bag.connections() {
        if seen_topics.insert(c.topic.as_str()) {
            first_types.push((c.topic.as_str(), c.datatype.as_str()));
        } else if !first_types.contains(&(c.topic.as_str(), c.datatype.as_str()))
            && reported.insert((c.topic.as_str(), c.datatype.as_str()))
        {
            // Second type on a topic already claimed by another one.
            observer.channel_skipped(&c.topic, &c.datatype);
        }
    }

    first_types
        .into_iter()
        .filter_map(|(topic, legacy_type)| match mapping::lookup(legacy_type) {
            Some(mapping) => Some(MappedChannel {
                topic: topic.to_string(),
                legacy_type: legacy_type.to_string(),
                mapping,
            }),
            None => {
                observer.channel_skipped(topic, legacy_type);
                None
            }
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════
//  FilteredView
// ════════════════════════════════════════════════════════════════

/// Time-ordered, forward-only cursor over the records of mapped channels.
pub struct FilteredView {
    channels: Vec<MappedChannel>,
    view: View,
    cursor: usize,
}

impl FilteredView {
    pub fn build(bag: &Bag, observer: &dyn ChannelObserver) -> Self {
        let channels = mapped_channels(bag, observer);
        let ids = channels.iter().flat_map(|ch| ch.connection_ids(bag)).collect();
        let view = bag.view(&Query::Connections(ids));

        tracing::debug!(
            channels = channels.len(),
            records = view.size(),
            "filtered view built"
        );
        Self { channels, view, cursor: 0 }
    }

    pub fn channels(&self) -> &[MappedChannel] {
        &self.channels
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.view.size()
    }

    /// Record under the cursor, without advancing.
    pub fn peek(&self) -> Option<&IndexEntry> {
        self.view.get(self.cursor)
    }

    pub fn advance(&mut self) {
        if self.has_next() {
            self.cursor += 1;
        }
    }

    pub fn remaining(&self) -> usize {
        self.view.size() - self.cursor
    }
}
