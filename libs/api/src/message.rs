use base64::Engine;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

// ════════════════════════════════════════════════════════════════
//  FieldValue
// ════════════════════════════════════════════════════════════════

/// Value of a single message field in the host's introspectable form.
///
/// Scalars keep their declared width so that a consumer can
/// re-serialize without guessing. `Bytes` is used for `uint8[]`/`byte[]`
/// sequences; every other sequence is an `Array`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<FieldValue>),
    Message(MessageFields),
}

impl FieldValue {
    pub fn as_message(&self) -> Option<&MessageFields> {
        match self {
            FieldValue::Message(m) => Some(m),
            _ => None,
        }
    }
}

macro_rules! field_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    FieldValue::$variant(v)
                }
            }
        )*
    };
}

field_value_from! {
    bool => Bool,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    String => String,
    Vec<u8> => Bytes,
    MessageFields => Message,
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Bool(v) => serializer.serialize_bool(*v),
            FieldValue::Int8(v) => serializer.serialize_i8(*v),
            FieldValue::UInt8(v) => serializer.serialize_u8(*v),
            FieldValue::Int16(v) => serializer.serialize_i16(*v),
            FieldValue::UInt16(v) => serializer.serialize_u16(*v),
            FieldValue::Int32(v) => serializer.serialize_i32(*v),
            FieldValue::UInt32(v) => serializer.serialize_u32(*v),
            FieldValue::Int64(v) => serializer.serialize_i64(*v),
            FieldValue::UInt64(v) => serializer.serialize_u64(*v),
            FieldValue::Float32(v) => serializer.serialize_f32(*v),
            FieldValue::Float64(v) => serializer.serialize_f64(*v),
            FieldValue::String(v) => serializer.serialize_str(v),
            // JSON has no byte type.
            FieldValue::Bytes(v) => {
                serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(v))
            }
            FieldValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Message(fields) => fields.serialize(serializer),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  MessageFields
// ════════════════════════════════════════════════════════════════

/// Ordered list of `(name, value)` pairs. Order is the declaration
/// order of the host type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageFields(Vec<(String, FieldValue)>);

impl MessageFields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Resolve a dot-separated path through nested messages,
    /// e.g. `"header.stamp.sec"`.
    pub fn get_path(&self, path: &str) -> Option<&FieldValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_message()?.get(segment)?;
        }
        Some(current)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for MessageFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ════════════════════════════════════════════════════════════════
//  MessageWriter
// ════════════════════════════════════════════════════════════════

/// Field-by-field writer used by transcoders to populate a message.
///
/// Fields are appended in call order. Nested messages are written
/// through a child writer handed to a closure.
#[derive(Debug, Default)]
pub struct MessageWriter {
    fields: MessageFields,
}

impl MessageWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.0.push((name.to_string(), value.into()));
    }

    /// Write a nested message field.
    pub fn write_message<E>(
        &mut self,
        name: &str,
        fill: impl FnOnce(&mut MessageWriter) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut child = MessageWriter::new();
        fill(&mut child)?;
        self.write(name, FieldValue::Message(child.finish()));
        Ok(())
    }

    /// Write a sequence of `count` nested messages.
    pub fn write_message_array<E>(
        &mut self,
        name: &str,
        count: usize,
        mut fill: impl FnMut(&mut MessageWriter) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let mut child = MessageWriter::new();
            fill(&mut child)?;
            items.push(FieldValue::Message(child.finish()));
        }
        self.write(name, FieldValue::Array(items));
        Ok(())
    }

    pub fn finish(self) -> MessageFields {
        self.fields
    }
}

// ════════════════════════════════════════════════════════════════
//  IntrospectionMessage
// ════════════════════════════════════════════════════════════════

/// Generic, introspectable message produced by a deserializer.
///
/// `fields` is filled by the type-level transcoder; `time_stamp` and
/// `topic_name` are record-level and set by the deserializer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntrospectionMessage {
    pub message_type: String,
    pub topic_name: String,
    /// Nanoseconds since the Unix epoch.
    pub time_stamp: i64,
    pub fields: MessageFields,
}
