use std::collections::HashSet;
use std::io::Write;

use crate::bag::{Bag, Connection, IndexEntry};
use crate::error::BagError;
use crate::time::Time;

// ════════════════════════════════════════════════════════════════
//  Query
// ════════════════════════════════════════════════════════════════

/// Selects the connections a `View` covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    All,
    /// Every connection whose topic is in the list.
    Topics(Vec<String>),
    /// Connections by id.
    Connections(Vec<u32>),
}

impl Query {
    pub fn topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::Topics(topics.into_iter().map(Into::into).collect())
    }

    fn matches(&self, connection: &Connection) -> bool {
        match self {
            Query::All => true,
            Query::Topics(topics) => topics.iter().any(|t| *t == connection.topic),
            Query::Connections(ids) => ids.contains(&connection.id),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  View
// ════════════════════════════════════════════════════════════════

/// Snapshot of the records selected by a `Query`, ascending by time.
/// Records with equal timestamps keep their file order.
///
/// A view owns its entries; payloads are fetched through the `Bag`
/// that produced it.
#[derive(Debug, Clone)]
pub struct View {
    connections: Vec<Connection>,
    entries: Vec<IndexEntry>,
}

impl View {
    pub(crate) fn build(connections: &[Connection], index: &[IndexEntry], query: &Query) -> Self {
        let connections: Vec<Connection> =
            connections.iter().filter(|c| query.matches(c)).cloned().collect();
        let selected: HashSet<u32> = connections.iter().map(|c| c.id).collect();

        let mut entries: Vec<IndexEntry> = index
            .iter()
            .filter(|e| selected.contains(&e.connection_id))
            .copied()
            .collect();
        entries.sort_by_key(|e| e.time);

        Self { connections, entries }
    }

    /// Connections covered by the view, in file order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&IndexEntry> {
        self.entries.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexEntry> {
        self.entries.iter()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `None` for an empty view.
    pub fn begin_time(&self) -> Option<Time> {
        self.entries.first().map(|e| e.time)
    }

    /// `None` for an empty view.
    pub fn end_time(&self) -> Option<Time> {
        self.entries.last().map(|e| e.time)
    }
}

impl<'a> IntoIterator for &'a View {
    type Item = &'a IndexEntry;
    type IntoIter = std::slice::Iter<'a, IndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ════════════════════════════════════════════════════════════════
//  MessageInstance
// ════════════════════════════════════════════════════════════════

/// Accessors for a single record and the connection it belongs to.
pub struct MessageInstance<'a> {
    bag: &'a Bag,
    connection: &'a Connection,
    entry: &'a IndexEntry,
}

impl<'a> MessageInstance<'a> {
    pub(crate) fn new(bag: &'a Bag, connection: &'a Connection, entry: &'a IndexEntry) -> Self {
        Self { bag, connection, entry }
    }

    pub fn topic(&self) -> &'a str {
        &self.connection.topic
    }

    pub fn time(&self) -> Time {
        self.entry.time
    }

    pub fn data_type(&self) -> &'a str {
        &self.connection.datatype
    }

    pub fn md5sum(&self) -> &'a str {
        &self.connection.md5sum
    }

    pub fn message_definition(&self) -> &'a str {
        &self.connection.message_definition
    }

    pub fn callerid(&self) -> Option<&'a str> {
        self.connection.callerid.as_deref()
    }

    pub fn is_latching(&self) -> bool {
        self.connection.latching
    }

    pub fn connection(&self) -> &'a Connection {
        self.connection
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.entry.size()
    }

    pub fn data(&self) -> Result<Vec<u8>, BagError> {
        self.bag.read_data(self.entry)
    }

    /// Write the raw payload, unchanged, to `out`.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<(), BagError> {
        let data = self.data()?;
        out.write_all(&data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::DataLocation;

    fn conn(id: u32, topic: &str) -> Connection {
        Connection {
            id,
            topic: topic.into(),
            datatype: "std_msgs/String".into(),
            md5sum: "*".into(),
            message_definition: String::new(),
            callerid: None,
            latching: false,
        }
    }

    fn entry(connection_id: u32, sec: u32, pos: u64) -> IndexEntry {
        IndexEntry {
            connection_id,
            time: Time::new(sec, 0),
            location: DataLocation::File { pos, len: 1 },
        }
    }

    #[test]
    fn topic_query_merges_connections_by_time() {
        let connections = vec![conn(0, "/a"), conn(1, "/b"), conn(2, "/a")];
        let index = vec![entry(0, 5, 10), entry(1, 1, 20), entry(2, 3, 30), entry(0, 3, 40)];

        let view = View::build(&connections, &index, &Query::topics(["/a"]));
        assert_eq!(view.connections().len(), 2);
        let positions: Vec<_> = view
            .iter()
            .map(|e| match e.location {
                DataLocation::File { pos, .. } => pos,
                DataLocation::Chunk { .. } => unreachable!(),
            })
            .collect();
        // Equal timestamps keep file order.
        assert_eq!(positions, vec![30, 40, 10]);
    }

    #[test]
    fn empty_view_has_no_time_bounds() {
        let view = View::build(&[conn(0, "/a")], &[], &Query::All);
        assert!(view.is_empty());
        assert_eq!(view.begin_time(), None);
        assert_eq!(view.end_time(), None);
    }

    #[test]
    fn connection_query() {
        let connections = vec![conn(4, "/a"), conn(9, "/b")];
        let index = vec![entry(4, 1, 0), entry(9, 2, 1)];
        let view = View::build(&connections, &index, &Query::Connections(vec![9]));
        assert_eq!(view.size(), 1);
        assert_eq!(view.get(0).map(|e| e.connection_id), Some(9));
    }
}
