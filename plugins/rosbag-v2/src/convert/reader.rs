use byteorder::{LittleEndian, ReadBytesExt};

use bag_api::PluginError;

/// Forward-only cursor over a legacy-encoded payload.
///
/// Scalars are little endian; strings and variable-length arrays carry a
/// `u32` length prefix; `time` is `sec: u32, nsec: u32`. Every read checks
/// the remaining length first, so a short payload is a `Format` error
/// rather than a partial value.
pub struct Ros1Reader<'a> {
    rest: &'a [u8],
    total: usize,
}

macro_rules! read_le {
    ($($name:ident => $ty:ty, $method:ident, $size:expr;)*) => {
        $(
            pub fn $name(&mut self) -> Result<$ty, PluginError> {
                self.need($size)?;
                Ok(self.rest.$method::<LittleEndian>()?)
            }
        )*
    };
}

impl<'a> Ros1Reader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { rest: payload, total: payload.len() }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.total - self.rest.len()
    }

    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    fn need(&self, n: usize) -> Result<(), PluginError> {
        if self.rest.len() < n {
            return Err(PluginError::format_err(format!(
                "payload truncated at byte {}: need {n}, {} left",
                self.position(),
                self.rest.len()
            )));
        }
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8, PluginError> {
        self.need(1)?;
        Ok(self.rest.read_u8()?)
    }

    pub fn i8(&mut self) -> Result<i8, PluginError> {
        self.need(1)?;
        Ok(self.rest.read_i8()?)
    }

    pub fn bool(&mut self) -> Result<bool, PluginError> {
        Ok(self.u8()? != 0)
    }

    read_le! {
        u16 => u16, read_u16, 2;
        i16 => i16, read_i16, 2;
        u32 => u32, read_u32, 4;
        i32 => i32, read_i32, 4;
        u64 => u64, read_u64, 8;
        i64 => i64, read_i64, 8;
        f32 => f32, read_f32, 4;
        f64 => f64, read_f64, 8;
    }

    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], PluginError> {
        self.need(len)?;
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        Ok(head)
    }

    pub fn string(&mut self) -> Result<String, PluginError> {
        let len = self.u32()? as usize;
        let raw = self.bytes(len)?;
        Ok(std::str::from_utf8(raw)?.to_string())
    }

    /// Length prefix of a variable-length array whose elements occupy
    /// at least `min_elem_size` bytes each. Rejects counts the remaining
    /// payload cannot hold before anything is allocated.
    pub fn seq_len(&mut self, min_elem_size: usize) -> Result<usize, PluginError> {
        let at = self.position();
        let count = self.u32()? as usize;
        if count.saturating_mul(min_elem_size) > self.rest.len() {
            return Err(PluginError::format_err(format!(
                "array at byte {at} declares {count} elements, only {} bytes left",
                self.rest.len()
            )));
        }
        Ok(count)
    }

    /// Variable-length array of fixed-size scalars.
    pub fn seq<T>(
        &mut self,
        elem_size: usize,
        mut read: impl FnMut(&mut Self) -> Result<T, PluginError>,
    ) -> Result<Vec<T>, PluginError> {
        let count = self.seq_len(elem_size)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(read(self)?);
        }
        Ok(out)
    }

    /// Consume the reader, failing if the payload has trailing bytes.
    pub fn finish(self) -> Result<(), PluginError> {
        if !self.rest.is_empty() {
            return Err(PluginError::format_err(format!(
                "{} trailing bytes after byte {}",
                self.rest.len(),
                self.position()
            )));
        }
        Ok(())
    }
}
