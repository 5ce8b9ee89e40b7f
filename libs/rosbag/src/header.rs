use byteorder::{ByteOrder, LittleEndian};

use crate::error::BagError;
use crate::time::Time;

/// Record header: a sequence of `[u32 len]["name=value"]` fields.
///
/// Values are binary; only the name is guaranteed to be ASCII.
/// `offset` is the file offset of the owning record, kept for errors.
#[derive(Debug, Clone)]
pub(crate) struct RecordHeader {
    offset: u64,
    fields: Vec<(String, Vec<u8>)>,
}

impl RecordHeader {
    pub(crate) fn parse(bytes: &[u8], offset: u64) -> Result<Self, BagError> {
        let mut fields = Vec::new();
        let mut pos = 0usize;
        while pos < bytes.len() {
            if bytes.len() - pos < 4 {
                return Err(BagError::Truncated { what: "header field length", offset });
            }
            let len = LittleEndian::read_u32(&bytes[pos..pos + 4]) as usize;
            pos += 4;
            if bytes.len() - pos < len {
                return Err(BagError::Truncated { what: "header field", offset });
            }
            let field = &bytes[pos..pos + len];
            pos += len;

            let eq = field.iter().position(|&b| b == b'=').ok_or_else(|| BagError::InvalidField {
                field: "header",
                offset,
                detail: "field without '='".to_string(),
            })?;
            let name = String::from_utf8_lossy(&field[..eq]).into_owned();
            fields.push((name, field[eq + 1..].to_vec()));
        }
        Ok(Self { offset, fields })
    }

    pub(crate) fn get(&self, name: &str) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_slice())
    }

    fn require(&self, name: &'static str) -> Result<&[u8], BagError> {
        self.get(name).ok_or(BagError::MissingField { field: name, offset: self.offset })
    }

    fn fixed<const N: usize>(&self, name: &'static str) -> Result<[u8; N], BagError> {
        let raw = self.require(name)?;
        raw.try_into().map_err(|_| BagError::InvalidField {
            field: name,
            offset: self.offset,
            detail: format!("expected {N} bytes, got {}", raw.len()),
        })
    }

    pub(crate) fn op(&self) -> Result<u8, BagError> {
        Ok(self.fixed::<1>("op")?[0])
    }

    pub(crate) fn u32(&self, name: &'static str) -> Result<u32, BagError> {
        Ok(u32::from_le_bytes(self.fixed(name)?))
    }

    pub(crate) fn time(&self, name: &'static str) -> Result<Time, BagError> {
        Ok(Time::from_le_bytes(self.fixed(name)?))
    }

    pub(crate) fn string(&self, name: &'static str) -> Result<String, BagError> {
        let raw = self.require(name)?;
        String::from_utf8(raw.to_vec()).map_err(|e| BagError::InvalidField {
            field: name,
            offset: self.offset,
            detail: e.to_string(),
        })
    }

    pub(crate) fn string_opt(&self, name: &'static str) -> Result<Option<String>, BagError> {
        match self.get(name) {
            Some(_) => self.string(name).map(Some),
            None => Ok(None),
        }
    }
}

/// Encode `(name, value)` pairs into the on-disk header layout.
#[cfg(any(test, feature = "test-utils"))]
pub(crate) fn encode_header(fields: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in fields {
        let len = (name.len() + 1 + value.len()) as u32;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.push(b'=');
        out.extend_from_slice(value);
    }
    out
}
