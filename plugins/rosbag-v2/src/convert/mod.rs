//! Legacy wire encoding to the host's introspectable message form.

pub(crate) mod geometry_msgs;
mod reader;
pub(crate) mod std_msgs;

pub use reader::Ros1Reader;

use bag_api::{MessageFields, MessageWriter, PluginError};

use crate::mapping;

/// Result of transcoding one payload. Record-level attributes (topic,
/// timestamp) are left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcoded {
    pub host_type: &'static str,
    pub fields: MessageFields,
}

/// Re-read `payload`, encoded as `legacy_type`, field by field into a
/// host message. The whole payload must be consumed.
pub fn transcode(legacy_type: &str, payload: &[u8]) -> Result<Transcoded, PluginError> {
    let Some(entry) = mapping::lookup(legacy_type) else {
        tracing::error!(legacy_type, "record reached the transcoder without a type mapping");
        return Err(PluginError::unmapped_type(format!(
            "no mapping for legacy type '{legacy_type}'"
        )));
    };

    let mut reader = Ros1Reader::new(payload);
    let mut writer = MessageWriter::new();
    (entry.transcode)(&mut reader, &mut writer)
        .and_then(|()| reader.finish())
        .map_err(|e| e.with_context(legacy_type))?;

    Ok(Transcoded { host_type: entry.host_type, fields: writer.finish() })
}
