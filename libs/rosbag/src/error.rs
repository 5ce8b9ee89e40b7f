#[derive(Debug, thiserror::Error)]
pub enum BagError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("'{0}' is not a ROS bag 2.0 file")]
    BadMagic(String),

    #[error("truncated {what} at offset {offset}")]
    Truncated { what: &'static str, offset: u64 },

    #[error("record at offset {offset}: missing header field '{field}'")]
    MissingField { field: &'static str, offset: u64 },

    #[error("record at offset {offset}: field '{field}': {detail}")]
    InvalidField {
        field: &'static str,
        offset: u64,
        detail: String,
    },

    #[error("unknown record op 0x{op:02x} at offset {offset}")]
    UnknownOp { op: u8, offset: u64 },

    #[error("unsupported chunk compression '{0}'")]
    UnsupportedCompression(String),

    #[error("message references unknown connection {0}")]
    UnknownConnection(u32),

    #[error("chunk at offset {offset}: {detail}")]
    Decompress { offset: u64, detail: String },
}
