//! Big-endian linear codec shared by the P-chain and atomic C-chain formats.
//!
//! Every serialized object is `u16 codec version` followed by a `u32` type id
//! and the type's fields. Variable-length arrays carry a `u32` element count,
//! byte strings a `u32` length.

use crate::error::CodecError;

pub const CODEC_VERSION: u16 = 0;

/// Upper bound on any array or byte-string length prefix.
pub const MAX_SLICE_LEN: usize = 256 * 1024;

/// Cursor over a byte slice.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> &'a [u8] {
        &self.buf[..self.pos]
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn fixed<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.fixed()?))
    }

    pub fn u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.fixed()?))
    }

    pub fn u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.fixed()?))
    }

    /// Codec version prefix; only version 0 exists.
    pub fn version(&mut self) -> Result<u16, CodecError> {
        let v = self.u16()?;
        if v != CODEC_VERSION {
            return Err(CodecError::UnsupportedVersion(v));
        }
        Ok(v)
    }

    pub fn len_prefix(&mut self, what: &'static str) -> Result<usize, CodecError> {
        let len = self.u32()? as usize;
        if len > MAX_SLICE_LEN {
            return Err(CodecError::TooLong { what, len });
        }
        Ok(len)
    }

    /// `u32` length followed by that many bytes.
    pub fn bytes(&mut self, what: &'static str) -> Result<Vec<u8>, CodecError> {
        let len = self.len_prefix(what)?;
        Ok(self.take(len)?.to_vec())
    }

    /// `u32` count followed by that many elements.
    pub fn array<T>(
        &mut self,
        what: &'static str,
        mut item: impl FnMut(&mut Self) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        let len = self.len_prefix(what)?;
        // Every element is at least one byte wide.
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(item(self)?);
        }
        Ok(out)
    }
}

/// Append-only encoder mirroring [`Reader`].
#[derive(Debug, Default)]
pub struct Packer {
    buf: Vec<u8>,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an object with the codec version prefix.
    pub fn with_version() -> Self {
        let mut p = Self::new();
        p.u16(CODEC_VERSION);
        p
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn fixed(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    pub fn len_prefix(&mut self, what: &'static str, len: usize) -> Result<&mut Self, CodecError> {
        if len > MAX_SLICE_LEN {
            return Err(CodecError::TooLong { what, len });
        }
        Ok(self.u32(len as u32))
    }

    pub fn bytes(&mut self, what: &'static str, v: &[u8]) -> Result<&mut Self, CodecError> {
        self.len_prefix(what, v.len())?;
        Ok(self.fixed(v))
    }

    pub fn array<T>(
        &mut self,
        what: &'static str,
        items: &[T],
        mut item: impl FnMut(&mut Self, &T) -> Result<(), CodecError>,
    ) -> Result<&mut Self, CodecError> {
        self.len_prefix(what, items.len())?;
        for it in items {
            item(self, it)?;
        }
        Ok(self)
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut p = Packer::with_version();
        p.u32(0x0102_0304).u64(5);
        let bytes = p.finish();
        assert_eq!(hex::encode(&bytes), "0000010203040000000000000005");

        let mut r = Reader::new(&bytes);
        assert_eq!(r.version().unwrap(), 0);
        assert_eq!(r.u32().unwrap(), 0x0102_0304);
        assert_eq!(r.u64().unwrap(), 5);
        assert!(r.is_empty());
    }

    #[test]
    fn truncated_input_reports_eof() {
        let mut r = Reader::new(&[0, 0, 1]);
        r.u16().unwrap();
        assert_eq!(
            r.u32(),
            Err(CodecError::UnexpectedEof { offset: 2, needed: 3 })
        );
    }

    #[test]
    fn oversized_array_count_is_rejected_before_allocation() {
        let mut r = Reader::new(&[0, 0, 0, 9, 1]);
        let res = r.array("outputs", |r| r.fixed::<1>());
        assert!(matches!(res, Err(CodecError::UnexpectedEof { .. })));
    }

    #[test]
    fn non_zero_version_is_rejected() {
        let mut r = Reader::new(&[0x02, 0xf8]);
        assert_eq!(r.version(), Err(CodecError::UnsupportedVersion(0x02f8)));
    }
}
