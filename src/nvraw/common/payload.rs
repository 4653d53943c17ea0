//! Bounds-checked reader over a chunk payload.
//!
//! Every read checks the remaining length first, so a short payload turns into
//! [`NvRawError::TruncatedChunk`] instead of a panic. The running offset is
//! tracked implicitly: variable-length strings and LUTs shift every later field.

use bytes::Buf;

use crate::nvraw::chunky::ChunkKind;
use crate::nvraw::common::error::{NvRawError, Result};

pub struct PayloadReader<'a> {
    chunk: ChunkKind,
    len: usize,
    buf: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(chunk: ChunkKind, payload: &'a [u8]) -> Self {
        Self {
            chunk,
            len: payload.len(),
            buf: payload,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.len - self.buf.remaining()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(NvRawError::TruncatedChunk {
                chunk: self.chunk,
                offset: self.offset(),
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    pub fn f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.buf.get_f32_le())
    }

    pub fn f32x4(&mut self) -> Result<[f32; 4]> {
        self.ensure(16)?;
        Ok(std::array::from_fn(|_| self.buf.get_f32_le()))
    }

    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.bytes(len).map(|_| ())
    }

    /// Reads `[u32 length][length ASCII bytes]`, returning the string and the
    /// total bytes consumed including the length field. Trailing NULs are dropped.
    pub fn string(&mut self) -> Result<(String, usize)> {
        let start = self.offset();
        let len = self.u32()? as usize;
        let raw = self.bytes(len)?;
        let text = String::from_utf8_lossy(raw)
            .trim_end_matches('\0')
            .to_string();
        Ok((text, self.offset() - start))
    }

    /// Reads `[u32 byte length][f32...]`. The byte length excludes the prefix;
    /// trailing bytes that do not fill a whole float are consumed and dropped.
    pub fn f32_array(&mut self) -> Result<(Vec<f32>, usize)> {
        let start = self.offset();
        let byte_len = self.u32()? as usize;
        let raw = self.bytes(byte_len)?;
        let values = raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok((values, self.offset() - start))
    }

    /// Consumes everything left.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = self.buf;
        self.buf = &[];
        rest
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    /// Little-endian payload builder for synthetic chunks.
    #[derive(Default)]
    pub struct PayloadBuilder(Vec<u8>);

    impl PayloadBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn u8(mut self, v: u8) -> Self {
            self.0.push(v);
            self
        }

        pub fn u32(mut self, v: u32) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }

        pub fn i32(mut self, v: i32) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }

        pub fn f32(mut self, v: f32) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }

        pub fn f32s(self, values: &[f32]) -> Self {
            values.iter().fold(self, |b, &v| b.f32(v))
        }

        pub fn raw(mut self, bytes: &[u8]) -> Self {
            self.0.extend_from_slice(bytes);
            self
        }

        pub fn string(self, s: &str) -> Self {
            self.u32(s.len() as u32).raw(s.as_bytes())
        }

        pub fn lut(self, values: &[f32]) -> Self {
            self.u32((values.len() * 4) as u32).f32s(values)
        }

        pub fn u16s(mut self, values: &[u16]) -> Self {
            for v in values {
                self.0.extend_from_slice(&v.to_le_bytes());
            }
            self
        }

        pub fn build(self) -> Vec<u8> {
            self.0
        }
    }
}
