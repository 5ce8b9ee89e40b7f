use std::borrow::Cow;

use bag_api::PluginError;

/// Self-describing record envelope handed from the storage to the
/// deserializer.
///
/// Wire form: `[type_name][0x00][payload]`. The type name is UTF-8 and
/// ends at the first NUL; everything after it is the legacy payload,
/// stored as read from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRecordBuffer<'a> {
    pub data_type: Cow<'a, str>,
    pub payload: Cow<'a, [u8]>,
}

impl<'a> TaggedRecordBuffer<'a> {
    pub fn new(data_type: impl Into<Cow<'a, str>>, payload: impl Into<Cow<'a, [u8]>>) -> Self {
        Self { data_type: data_type.into(), payload: payload.into() }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PluginError> {
        if self.data_type.is_empty() || self.data_type.contains('\0') {
            return Err(PluginError::format_err(format!(
                "type name {:?} cannot be tagged",
                self.data_type
            )));
        }
        let mut out = Vec::with_capacity(self.data_type.len() + 1 + self.payload.len());
        out.extend_from_slice(self.data_type.as_bytes());
        out.push(0);
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Borrowing decode: the result points into `buf`.
    pub fn decode(buf: &'a [u8]) -> Result<Self, PluginError> {
        let nul = buf
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| PluginError::format_err("tagged record has no type terminator"))?;
        if nul == 0 {
            return Err(PluginError::format_err("tagged record has an empty type name"));
        }
        let data_type = std::str::from_utf8(&buf[..nul])
            .map_err(|e| PluginError::format_err(format!("tagged record type name: {e}")))?;
        Ok(Self::new(data_type, &buf[nul + 1..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bag_api::ErrorKind;

    #[test]
    fn wire_layout() {
        let buf = TaggedRecordBuffer::new("std_msgs/String", vec![1u8, 0, 2]).encode().unwrap();
        assert_eq!(&buf[..16], b"std_msgs/String\0");
        assert_eq!(&buf[16..], &[1, 0, 2]);
    }

    #[test]
    fn decode_splits_at_first_nul() {
        // Payload may itself contain NULs.
        let buf = b"std_msgs/Int32\0\x00\x01\x00\x00";
        let tagged = TaggedRecordBuffer::decode(buf).unwrap();
        assert_eq!(tagged.data_type, "std_msgs/Int32");
        assert_eq!(tagged.payload.as_ref(), &[0, 1, 0, 0]);
        assert!(matches!(tagged.payload, Cow::Borrowed(_)));
    }

    #[test]
    fn empty_payload() {
        let tagged = TaggedRecordBuffer::decode(b"std_msgs/Empty\0").unwrap();
        assert!(tagged.payload.is_empty());
    }

    #[test]
    fn malformed_buffers() {
        for buf in [&b"std_msgs/String"[..], b"\0abc", b"\xff\xfe\0"] {
            let err = TaggedRecordBuffer::decode(buf).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "{buf:?}");
        }
        let err = TaggedRecordBuffer::new("bad\0name", &b""[..]).encode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
