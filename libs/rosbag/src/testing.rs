//! Fixture writer for tests. Produces small, valid ROS bag 2.0 files
//! (bag header, chunks, per-chunk index data, connection and chunk info
//! records). Not a general-purpose writer.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::Path;

use crate::bag::{op, MAGIC};
use crate::header::encode_header;
use crate::time::Time;

/// The bag header record is padded to this many bytes.
const BAG_HEADER_RECORD_LEN: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkCompression {
    None,
    Lz4,
    Bz2,
    /// Write the given compression name but store the body uncompressed.
    Raw(&'static str),
}

struct FixtureConnection {
    id: u32,
    topic: String,
    datatype: String,
    md5sum: String,
    definition: String,
}

struct FixtureMessage {
    conn: u32,
    time: Time,
    data: Vec<u8>,
}

struct ChunkSummary {
    rel_pos: usize,
    start: Time,
    end: Time,
    counts: Vec<(u32, u32)>,
}

pub struct BagBuilder {
    compression: ChunkCompression,
    messages_per_chunk: usize,
    connections: Vec<FixtureConnection>,
    messages: Vec<FixtureMessage>,
}

impl Default for BagBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BagBuilder {
    pub fn new() -> Self {
        Self {
            compression: ChunkCompression::None,
            messages_per_chunk: usize::MAX,
            connections: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn compression(mut self, compression: ChunkCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn messages_per_chunk(mut self, n: usize) -> Self {
        self.messages_per_chunk = n.max(1);
        self
    }

    pub fn connection(&mut self, id: u32, topic: &str, datatype: &str) -> &mut Self {
        self.connections.push(FixtureConnection {
            id,
            topic: topic.to_string(),
            datatype: datatype.to_string(),
            md5sum: "*".to_string(),
            definition: String::new(),
        });
        self
    }

    pub fn message(&mut self, conn: u32, time: Time, data: &[u8]) -> &mut Self {
        self.messages.push(FixtureMessage { conn, time, data: data.to_vec() });
        self
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.build()?)
    }

    pub fn build(&self) -> std::io::Result<Vec<u8>> {
        let mut body = Vec::new();
        let mut summaries = Vec::new();
        let mut defined = HashSet::new();

        for group in self.messages.chunks(self.messages_per_chunk) {
            let mut chunk = Vec::new();
            let mut index: BTreeMap<u32, Vec<(Time, u32)>> = BTreeMap::new();
            for msg in group {
                if defined.insert(msg.conn) {
                    if let Some(c) = self.connections.iter().find(|c| c.id == msg.conn) {
                        chunk.extend(connection_record(c));
                    }
                }
                let offset = chunk.len() as u32;
                chunk.extend(record(
                    &[
                        ("op", &[op::MSG_DATA]),
                        ("conn", &msg.conn.to_le_bytes()),
                        ("time", &msg.time.to_le_bytes()),
                    ],
                    &msg.data,
                ));
                index.entry(msg.conn).or_default().push((msg.time, offset));
            }

            let (name, stored) = match self.compression {
                ChunkCompression::None => ("none", chunk.clone()),
                ChunkCompression::Lz4 => {
                    let mut enc = lz4_flex::frame::FrameEncoder::new(Vec::new());
                    enc.write_all(&chunk)?;
                    ("lz4", enc.finish().map_err(std::io::Error::other)?)
                }
                ChunkCompression::Bz2 => {
                    let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
                    enc.write_all(&chunk)?;
                    ("bz2", enc.finish()?)
                }
                ChunkCompression::Raw(name) => (name, chunk.clone()),
            };

            let rel_pos = body.len();
            body.extend(record(
                &[
                    ("op", &[op::CHUNK]),
                    ("compression", name.as_bytes()),
                    ("size", &(chunk.len() as u32).to_le_bytes()),
                ],
                &stored,
            ));

            for (conn, entries) in &index {
                let mut data = Vec::new();
                for (time, offset) in entries {
                    data.extend(time.to_le_bytes());
                    data.extend(offset.to_le_bytes());
                }
                body.extend(record(
                    &[
                        ("op", &[op::INDEX_DATA]),
                        ("ver", &1u32.to_le_bytes()),
                        ("conn", &conn.to_le_bytes()),
                        ("count", &(entries.len() as u32).to_le_bytes()),
                    ],
                    &data,
                ));
            }

            summaries.push(ChunkSummary {
                rel_pos,
                start: group.iter().map(|m| m.time).min().unwrap_or_default(),
                end: group.iter().map(|m| m.time).max().unwrap_or_default(),
                counts: index.iter().map(|(c, e)| (*c, e.len() as u32)).collect(),
            });
        }

        let body_start = MAGIC.len() + BAG_HEADER_RECORD_LEN;
        let index_pos = (body_start + body.len()) as u64;
        for c in &self.connections {
            body.extend(connection_record(c));
        }
        for s in &summaries {
            let mut data = Vec::new();
            for (conn, count) in &s.counts {
                data.extend(conn.to_le_bytes());
                data.extend(count.to_le_bytes());
            }
            body.extend(record(
                &[
                    ("op", &[op::CHUNK_INFO]),
                    ("ver", &1u32.to_le_bytes()),
                    ("chunk_pos", &((body_start + s.rel_pos) as u64).to_le_bytes()),
                    ("start_time", &s.start.to_le_bytes()),
                    ("end_time", &s.end.to_le_bytes()),
                    ("count", &(s.counts.len() as u32).to_le_bytes()),
                ],
                &data,
            ));
        }

        let header = encode_header(&[
            ("op", &[op::BAG_HEADER]),
            ("index_pos", &index_pos.to_le_bytes()),
            ("conn_count", &(self.connections.len() as u32).to_le_bytes()),
            ("chunk_count", &(summaries.len() as u32).to_le_bytes()),
        ]);
        let padding = BAG_HEADER_RECORD_LEN - 8 - header.len();

        let mut out = MAGIC.to_vec();
        out.extend((header.len() as u32).to_le_bytes());
        out.extend(header);
        out.extend((padding as u32).to_le_bytes());
        out.extend(std::iter::repeat_n(b' ', padding));
        out.extend(body);
        Ok(out)
    }
}

fn record(fields: &[(&str, &[u8])], data: &[u8]) -> Vec<u8> {
    let header = encode_header(fields);
    let mut out = Vec::with_capacity(8 + header.len() + data.len());
    out.extend((header.len() as u32).to_le_bytes());
    out.extend(header);
    out.extend((data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    out
}

fn connection_record(c: &FixtureConnection) -> Vec<u8> {
    let data = encode_header(&[
        ("topic", c.topic.as_bytes()),
        ("type", c.datatype.as_bytes()),
        ("md5sum", c.md5sum.as_bytes()),
        ("message_definition", c.definition.as_bytes()),
    ]);
    record(
        &[
            ("op", &[op::CONNECTION]),
            ("conn", &c.id.to_le_bytes()),
            ("topic", c.topic.as_bytes()),
        ],
        &data,
    )
}
