use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use crate::error::BagError;
use crate::header::RecordHeader;
use crate::time::Time;
use crate::view::{MessageInstance, Query, View};

pub(crate) const MAGIC: &[u8] = b"#ROSBAG V2.0\n";

pub(crate) mod op {
    pub const MSG_DATA: u8 = 0x02;
    pub const BAG_HEADER: u8 = 0x03;
    pub const INDEX_DATA: u8 = 0x04;
    pub const CHUNK: u8 = 0x05;
    pub const CHUNK_INFO: u8 = 0x06;
    pub const CONNECTION: u8 = 0x07;
}

// ════════════════════════════════════════════════════════════════
//  Connection & index
// ════════════════════════════════════════════════════════════════

/// A (topic, type) channel as declared by a connection record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: u32,
    pub topic: String,
    /// Fully-qualified legacy type name, e.g. `std_msgs/String`.
    pub datatype: String,
    pub md5sum: String,
    pub message_definition: String,
    pub callerid: Option<String>,
    pub latching: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataLocation {
    /// Payload stored verbatim in the file (uncompressed chunk).
    File { pos: u64, len: u32 },
    /// Payload inside a compressed chunk, offsets relative to the
    /// decompressed chunk body.
    Chunk { chunk: usize, offset: usize, len: usize },
}

/// Position of one message record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub connection_id: u32,
    pub time: Time,
    pub(crate) location: DataLocation,
}

impl IndexEntry {
    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        match self.location {
            DataLocation::File { len, .. } => len as usize,
            DataLocation::Chunk { len, .. } => len,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    Lz4,
    Bz2,
}

impl Codec {
    fn name(self) -> &'static str {
        match self {
            Codec::Lz4 => "lz4",
            Codec::Bz2 => "bz2",
        }
    }

    fn decompress(self, data: &[u8], size: u32, offset: u64) -> Result<Vec<u8>, BagError> {
        let mut body = Vec::with_capacity(size as usize);
        let read = match self {
            Codec::Lz4 => lz4_flex::frame::FrameDecoder::new(data).read_to_end(&mut body),
            Codec::Bz2 => bzip2::read::BzDecoder::new(data).read_to_end(&mut body),
        };
        read.map_err(|e| BagError::Decompress { offset, detail: format!("{}: {e}", self.name()) })?;
        if body.len() != size as usize {
            return Err(BagError::Decompress {
                offset,
                detail: format!("expected {size} bytes, got {}", body.len()),
            });
        }
        Ok(body)
    }
}

struct CompressedChunk {
    codec: Codec,
    data_pos: u64,
    data_len: u32,
    uncompressed_size: u32,
}

// ════════════════════════════════════════════════════════════════
//  Bag
// ════════════════════════════════════════════════════════════════

/// An open ROS bag 2.0 file.
///
/// `open` scans the whole file once and keeps an in-memory message
/// index; payloads are read lazily. Not `Sync`: the chunk cache and the
/// file position are mutated by reads.
pub struct Bag {
    path: PathBuf,
    file: File,
    connections: Vec<Connection>,
    by_id: HashMap<u32, usize>,
    chunks: Vec<CompressedChunk>,
    index: Vec<IndexEntry>,
    chunk_cache: RefCell<Option<(usize, Vec<u8>)>>,
}

impl Bag {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BagError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let file_len = file.metadata()?.len();

        let mut bag = Self {
            path,
            file,
            connections: Vec::new(),
            by_id: HashMap::new(),
            chunks: Vec::new(),
            index: Vec::new(),
            chunk_cache: RefCell::new(None),
        };
        bag.scan(file_len)?;

        tracing::debug!(
            path = %bag.path.display(),
            connections = bag.connections.len(),
            messages = bag.index.len(),
            compressed_chunks = bag.chunks.len(),
            "bag opened"
        );
        Ok(bag)
    }

    /// Current size of the file on disk.
    pub fn file_size(&self) -> Result<u64, BagError> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    /// All connections in the order they first appear in the file.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, id: u32) -> Option<&Connection> {
        self.by_id.get(&id).map(|&i| &self.connections[i])
    }

    /// Time-ordered view over the records matching `query`.
    pub fn view(&self, query: &Query) -> View {
        View::build(&self.connections, &self.index, query)
    }

    pub fn instance<'a>(&'a self, entry: &'a IndexEntry) -> Result<MessageInstance<'a>, BagError> {
        let connection = self
            .connection(entry.connection_id)
            .ok_or(BagError::UnknownConnection(entry.connection_id))?;
        Ok(MessageInstance::new(self, connection, entry))
    }

    /// Raw serialized payload of one record, exactly as stored.
    pub fn read_data(&self, entry: &IndexEntry) -> Result<Vec<u8>, BagError> {
        match entry.location {
            DataLocation::File { pos, len } => {
                let mut file = &self.file;
                file.seek(SeekFrom::Start(pos))?;
                let mut buf = vec![0u8; len as usize];
                file.read_exact(&mut buf)
                    .map_err(|e| eof_as_truncated(e, "message data", pos))?;
                Ok(buf)
            }
            DataLocation::Chunk { chunk, offset, len } => {
                let mut cache = self.chunk_cache.borrow_mut();
                let body = match cache.take() {
                    Some((cached, body)) if cached == chunk => body,
                    _ => self.decompress_chunk(chunk)?,
                };
                let out = body.get(offset..offset + len).map(<[u8]>::to_vec);
                *cache = Some((chunk, body));
                out.ok_or(BagError::Truncated { what: "chunk message data", offset: offset as u64 })
            }
        }
    }

    /// Release the file handle.
    pub fn close(self) {
        tracing::debug!(path = %self.path.display(), "bag closed");
    }

    // ── Scanning ──

    fn scan(&mut self, file_len: u64) -> Result<(), BagError> {
        let mut reader = BufReader::new(self.file.try_clone()?);

        let mut magic = [0u8; MAGIC.len()];
        if reader.read_exact(&mut magic).is_err() || magic != MAGIC {
            return Err(BagError::BadMagic(self.path.display().to_string()));
        }

        let mut pos = MAGIC.len() as u64;
        while pos < file_len {
            let header_len = read_u32(&mut reader, pos, "record header length")?;
            if pos + 8 + u64::from(header_len) > file_len {
                return Err(BagError::Truncated { what: "record header", offset: pos });
            }
            let header_bytes = read_vec(&mut reader, header_len as usize, pos, "record header")?;
            let header = RecordHeader::parse(&header_bytes, pos)?;
            let data_len = read_u32(&mut reader, pos, "record data length")?;
            let data_pos = pos + 8 + u64::from(header_len);
            if data_pos + u64::from(data_len) > file_len {
                return Err(BagError::Truncated { what: "record data", offset: pos });
            }

            match header.op()? {
                op::CHUNK => {
                    let data = read_vec(&mut reader, data_len as usize, pos, "chunk")?;
                    self.scan_chunk(&header, &data, data_pos)?;
                }
                op::CONNECTION => {
                    let data = read_vec(&mut reader, data_len as usize, pos, "connection")?;
                    self.add_connection(&header, &data, pos)?;
                }
                op::MSG_DATA => {
                    self.add_message(&header, DataLocation::File { pos: data_pos, len: data_len })?;
                    reader.seek_relative(i64::from(data_len))?;
                }
                op::BAG_HEADER | op::INDEX_DATA | op::CHUNK_INFO => {
                    reader.seek_relative(i64::from(data_len))?;
                }
                other => return Err(BagError::UnknownOp { op: other, offset: pos }),
            }
            pos = data_pos + u64::from(data_len);
        }

        if let Some(entry) = self.index.iter().find(|e| !self.by_id.contains_key(&e.connection_id)) {
            return Err(BagError::UnknownConnection(entry.connection_id));
        }
        Ok(())
    }

    fn scan_chunk(&mut self, header: &RecordHeader, data: &[u8], data_pos: u64) -> Result<(), BagError> {
        let compression = header.string("compression")?;
        let size = header.u32("size")?;
        match compression.as_str() {
            "none" => self.scan_chunk_records(data, data_pos, |offset, len| DataLocation::File {
                pos: data_pos + offset as u64,
                len: len as u32,
            }),
            "lz4" => self.scan_compressed_chunk(Codec::Lz4, data, size, data_pos),
            "bz2" => self.scan_compressed_chunk(Codec::Bz2, data, size, data_pos),
            other => Err(BagError::UnsupportedCompression(other.to_string())),
        }
    }

    fn scan_compressed_chunk(
        &mut self,
        codec: Codec,
        data: &[u8],
        size: u32,
        data_pos: u64,
    ) -> Result<(), BagError> {
        let body = codec.decompress(data, size, data_pos)?;
        let chunk = self.chunks.len();
        self.chunks.push(CompressedChunk {
            codec,
            data_pos,
            data_len: data.len() as u32,
            uncompressed_size: size,
        });
        tracing::debug!(chunk, codec = codec.name(), offset = data_pos, size, "compressed chunk indexed");
        self.scan_chunk_records(&body, data_pos, |offset, len| DataLocation::Chunk {
            chunk,
            offset,
            len,
        })
    }

    /// Walk the records of a (decompressed) chunk body. `locate` turns a
    /// body-relative payload position into a `DataLocation`.
    fn scan_chunk_records(
        &mut self,
        body: &[u8],
        chunk_pos: u64,
        locate: impl Fn(usize, usize) -> DataLocation,
    ) -> Result<(), BagError> {
        let mut off = 0usize;
        while off < body.len() {
            let record_offset = chunk_pos + off as u64;
            let header_len = slice_u32(body, off, record_offset, "chunk record header length")? as usize;
            let header_end = slice_end(body, off + 4, header_len, record_offset, "chunk record header")?;
            let header = RecordHeader::parse(&body[off + 4..header_end], record_offset)?;
            let data_len = slice_u32(body, header_end, record_offset, "chunk record data length")? as usize;
            let data_start = header_end + 4;
            let data_end = slice_end(body, data_start, data_len, record_offset, "chunk record data")?;

            match header.op()? {
                op::MSG_DATA => self.add_message(&header, locate(data_start, data_len))?,
                op::CONNECTION => {
                    self.add_connection(&header, &body[data_start..data_end], record_offset)?
                }
                other => return Err(BagError::UnknownOp { op: other, offset: record_offset }),
            }
            off = data_end;
        }
        Ok(())
    }

    fn add_connection(&mut self, header: &RecordHeader, data: &[u8], offset: u64) -> Result<(), BagError> {
        let id = header.u32("conn")?;
        // Connection records are repeated in the index section; first one wins.
        if self.by_id.contains_key(&id) {
            return Ok(());
        }
        let topic = header.string("topic")?;
        let fields = RecordHeader::parse(data, offset)?;
        let connection = Connection {
            id,
            topic,
            datatype: fields.string("type")?,
            md5sum: fields.string("md5sum")?,
            message_definition: fields.string_opt("message_definition")?.unwrap_or_default(),
            callerid: fields.string_opt("callerid")?,
            latching: fields.get("latching") == Some(b"1".as_slice()),
        };
        self.by_id.insert(id, self.connections.len());
        self.connections.push(connection);
        Ok(())
    }

    fn add_message(&mut self, header: &RecordHeader, location: DataLocation) -> Result<(), BagError> {
        self.index.push(IndexEntry {
            connection_id: header.u32("conn")?,
            time: header.time("time")?,
            location,
        });
        Ok(())
    }

    fn decompress_chunk(&self, chunk: usize) -> Result<Vec<u8>, BagError> {
        let info = self.chunks.get(chunk).ok_or_else(|| BagError::Decompress {
            offset: 0,
            detail: format!("chunk #{chunk} not indexed"),
        })?;
        let mut file = &self.file;
        file.seek(SeekFrom::Start(info.data_pos))?;
        let mut compressed = vec![0u8; info.data_len as usize];
        file.read_exact(&mut compressed)
            .map_err(|e| eof_as_truncated(e, "chunk", info.data_pos))?;
        info.codec.decompress(&compressed, info.uncompressed_size, info.data_pos)
    }
}

// ════════════════════════════════════════════════════════════════
//  Helpers
// ════════════════════════════════════════════════════════════════

fn eof_as_truncated(e: std::io::Error, what: &'static str, offset: u64) -> BagError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        BagError::Truncated { what, offset }
    } else {
        BagError::Io(e)
    }
}

fn read_u32(reader: &mut impl Read, offset: u64, what: &'static str) -> Result<u32, BagError> {
    reader
        .read_u32::<LittleEndian>()
        .map_err(|e| eof_as_truncated(e, what, offset))
}

fn read_vec(reader: &mut impl Read, len: usize, offset: u64, what: &'static str) -> Result<Vec<u8>, BagError> {
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|e| eof_as_truncated(e, what, offset))?;
    Ok(buf)
}

fn slice_u32(body: &[u8], at: usize, offset: u64, what: &'static str) -> Result<u32, BagError> {
    let end = slice_end(body, at, 4, offset, what)?;
    Ok(LittleEndian::read_u32(&body[at..end]))
}

fn slice_end(body: &[u8], start: usize, len: usize, offset: u64, what: &'static str) -> Result<usize, BagError> {
    start
        .checked_add(len)
        .filter(|&end| end <= body.len())
        .ok_or(BagError::Truncated { what, offset })
}
