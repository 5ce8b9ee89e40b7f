use bag_api::{FieldValue, MessageWriter, PluginError};

use super::reader::Ros1Reader;

type Result = std::result::Result<(), PluginError>;

// ════════════════════════════════════════════════════════════════
//  Scalars
// ════════════════════════════════════════════════════════════════

pub(crate) fn bool(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write("data", r.bool()?);
    Ok(())
}

/// Legacy `byte` is a signed 8-bit value; the host `byte` is an octet.
/// The bits are kept as they are.
pub(crate) fn byte(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write("data", r.u8()?);
    Ok(())
}

pub(crate) fn char(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write("data", r.u8()?);
    Ok(())
}

pub(crate) fn empty(_r: &mut Ros1Reader<'_>, _w: &mut MessageWriter) -> Result {
    Ok(())
}

pub(crate) fn string(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write("data", r.string()?);
    Ok(())
}

macro_rules! scalar_messages {
    ($($name:ident => $read:ident;)*) => {
        $(
            pub(crate) fn $name(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
                w.write("data", r.$read()?);
                Ok(())
            }
        )*
    };
}

scalar_messages! {
    int8 => i8;
    uint8 => u8;
    int16 => i16;
    uint16 => u16;
    int32 => i32;
    uint32 => u32;
    int64 => i64;
    uint64 => u64;
    float32 => f32;
    float64 => f64;
}

pub(crate) fn color_rgba(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write("r", r.f32()?);
    w.write("g", r.f32()?);
    w.write("b", r.f32()?);
    w.write("a", r.f32()?);
    Ok(())
}

// ════════════════════════════════════════════════════════════════
//  Header
// ════════════════════════════════════════════════════════════════

/// Legacy `time` to `builtin_interfaces/msg/Time`.
pub(crate) fn time(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    let sec = r.u32()?;
    let sec = i32::try_from(sec)
        .map_err(|_| PluginError::format_err(format!("time seconds {sec} exceed the host i32 range")))?;
    w.write("sec", sec);
    w.write("nanosec", r.u32()?);
    Ok(())
}

/// The legacy `seq` counter has no host counterpart and is dropped.
pub(crate) fn header(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    let _seq = r.u32()?;
    w.write_message("stamp", |w| time(r, w))?;
    w.write("frame_id", r.string()?);
    Ok(())
}

// ════════════════════════════════════════════════════════════════
//  Multi-arrays
// ════════════════════════════════════════════════════════════════

pub(crate) fn multi_array_dimension(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write("label", r.string()?);
    w.write("size", r.u32()?);
    w.write("stride", r.u32()?);
    Ok(())
}

pub(crate) fn multi_array_layout(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    // label length prefix + size + stride
    let dims = r.seq_len(12)?;
    w.write_message_array("dim", dims, |w| multi_array_dimension(r, w))?;
    w.write("data_offset", r.u32()?);
    Ok(())
}

/// `uint8[]` and `byte[]` become `Bytes`; the host treats both as octets.
fn octet_multi_array(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write_message("layout", |w| multi_array_layout(r, w))?;
    let len = r.seq_len(1)?;
    w.write("data", r.bytes(len)?.to_vec());
    Ok(())
}

pub(crate) fn byte_multi_array(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    octet_multi_array(r, w)
}

pub(crate) fn uint8_multi_array(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    octet_multi_array(r, w)
}

macro_rules! typed_multi_arrays {
    ($($name:ident => $read:ident, $size:expr;)*) => {
        $(
            pub(crate) fn $name(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
                w.write_message("layout", |w| multi_array_layout(r, w))?;
                let data = r.seq($size, |r| r.$read().map(FieldValue::from))?;
                w.write("data", FieldValue::Array(data));
                Ok(())
            }
        )*
    };
}

typed_multi_arrays! {
    int8_multi_array => i8, 1;
    int16_multi_array => i16, 2;
    uint16_multi_array => u16, 2;
    int32_multi_array => i32, 4;
    uint32_multi_array => u32, 4;
    int64_multi_array => i64, 8;
    uint64_multi_array => u64, 8;
    float32_multi_array => f32, 4;
    float64_multi_array => f64, 8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bag_api::ErrorKind;

    fn run(
        f: fn(&mut Ros1Reader<'_>, &mut MessageWriter) -> Result,
        payload: &[u8],
    ) -> bag_api::MessageFields {
        let mut r = Ros1Reader::new(payload);
        let mut w = MessageWriter::new();
        f(&mut r, &mut w).unwrap();
        r.finish().unwrap();
        w.finish()
    }

    fn ros_string(s: &str) -> Vec<u8> {
        let mut out = (s.len() as u32).to_le_bytes().to_vec();
        out.extend(s.as_bytes());
        out
    }

    #[test]
    fn header_drops_seq() {
        let mut payload = 42u32.to_le_bytes().to_vec();
        payload.extend(10u32.to_le_bytes());
        payload.extend(500u32.to_le_bytes());
        payload.extend(ros_string("base_link"));

        let fields = run(header, &payload);
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["stamp", "frame_id"]);
        assert_eq!(fields.get_path("stamp.sec"), Some(&FieldValue::Int32(10)));
        assert_eq!(fields.get_path("stamp.nanosec"), Some(&FieldValue::UInt32(500)));
        assert_eq!(fields.get("frame_id"), Some(&FieldValue::String("base_link".into())));
    }

    #[test]
    fn stamp_seconds_beyond_i32_are_rejected() {
        let mut payload = 0u32.to_le_bytes().to_vec();
        payload.extend((1u32 << 31).to_le_bytes());
        payload.extend(0u32.to_le_bytes());
        payload.extend(ros_string(""));

        let mut r = Ros1Reader::new(&payload);
        let mut w = MessageWriter::new();
        let err = header(&mut r, &mut w).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn float32_multi_array_with_layout() {
        let mut payload = 1u32.to_le_bytes().to_vec();
        payload.extend(ros_string("rows"));
        payload.extend(2u32.to_le_bytes());
        payload.extend(2u32.to_le_bytes());
        payload.extend(0u32.to_le_bytes());
        payload.extend(2u32.to_le_bytes());
        payload.extend(1.0f32.to_le_bytes());
        payload.extend((-3.5f32).to_le_bytes());

        let fields = run(float32_multi_array, &payload);
        let dim = match fields.get_path("layout.dim") {
            Some(FieldValue::Array(items)) => items.clone(),
            other => panic!("unexpected dim: {other:?}"),
        };
        assert_eq!(dim.len(), 1);
        assert_eq!(
            dim[0].as_message().and_then(|m| m.get("label")),
            Some(&FieldValue::String("rows".into()))
        );
        assert_eq!(
            fields.get("data"),
            Some(&FieldValue::Array(vec![FieldValue::Float32(1.0), FieldValue::Float32(-3.5)]))
        );
    }

    #[test]
    fn uint8_multi_array_is_bytes() {
        let mut payload = 0u32.to_le_bytes().to_vec();
        payload.extend(0u32.to_le_bytes());
        payload.extend(3u32.to_le_bytes());
        payload.extend([9, 8, 7]);
        let fields = run(uint8_multi_array, &payload);
        assert_eq!(fields.get("data"), Some(&FieldValue::Bytes(vec![9, 8, 7])));
    }

    #[test]
    fn truncated_string_fails() {
        let mut payload = 10u32.to_le_bytes().to_vec();
        payload.extend(b"abc");
        let mut w = MessageWriter::new();
        let err = string(&mut Ros1Reader::new(&payload), &mut w).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
