use bag_api::{IntrospectionMessage, PluginError, SerializationFormatDeserializer, SerializedBagMessage};

use crate::convert;
use crate::tagged::TaggedRecordBuffer;
use crate::IDENTIFIER;

/// Turns records produced by `RosbagV2Storage` into host messages.
///
/// The type tag inside the record is authoritative; a caller-supplied
/// type hint is only compared against it for diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct RosbagV2Deserializer;

impl SerializationFormatDeserializer for RosbagV2Deserializer {
    fn deserialize(
        &self,
        message: &SerializedBagMessage,
        type_hint: Option<&str>,
    ) -> Result<IntrospectionMessage, PluginError> {
        let tagged = TaggedRecordBuffer::decode(&message.serialized_data)
            .map_err(|e| e.with_context(&message.topic_name))?;
        let out = convert::transcode(&tagged.data_type, &tagged.payload)
            .map_err(|e| e.with_context(&message.topic_name))?;

        if let Some(hint) = type_hint.filter(|h| *h != out.host_type) {
            tracing::debug!(
                topic = %message.topic_name,
                hint,
                host_type = out.host_type,
                "type hint ignored, record tag wins"
            );
        }

        Ok(IntrospectionMessage {
            message_type: out.host_type.to_string(),
            topic_name: message.topic_name.clone(),
            time_stamp: message.time_stamp,
            fields: out.fields,
        })
    }

    fn serialization_format(&self) -> &str {
        IDENTIFIER
    }
}
