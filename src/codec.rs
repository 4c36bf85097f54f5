//! Little-endian blob encoding shared by every structure in the crate.
//!
//! A variable-length field is `[u32 length][raw bytes]`. A structure encodes as
//! the concatenation of its fields in construction order, so nested blobs are
//! decoded by sequential parsing: every `load` takes a start offset and returns
//! the offset just past what it consumed.

use crate::error::{Error, Result};

/// Binary (de)serialization in the crate's wire format.
pub trait Blob: Sized {
    /// Append this structure's encoding to `out`.
    fn dump_into(&self, out: &mut Vec<u8>);

    /// Decode a structure starting at `offset`, returning it with the offset
    /// just past the consumed bytes.
    fn load(bytes: &[u8], offset: usize) -> Result<(Self, usize)>;

    /// Encode into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.dump_into(&mut out);
        out
    }

    /// Decode a buffer that holds exactly one encoded structure.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (value, off) = Self::load(bytes, 0)?;
        if off != bytes.len() {
            return Err(Error::InvalidEncoding(format!(
                "{} trailing bytes after blob",
                bytes.len() - off
            )));
        }
        Ok(value)
    }
}

/// Sequential reader over an encoded buffer.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    off: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8], off: usize) -> Self {
        Self { bytes, off }
    }

    /// Offset of the next unread byte.
    pub(crate) fn offset(&self) -> usize {
        self.off
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .off
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| Error::InvalidEncoding("unexpected end of input".to_string()))?;
        let slice = &self.bytes[self.off..end];
        self.off = end;
        Ok(slice)
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let raw = self.take(4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    /// A `[u32 length][bytes]` field.
    pub(crate) fn field(&mut self) -> Result<&'a [u8]> {
        let len = self.u32()? as usize;
        self.take(len)
    }

    /// A field holding packed little-endian `u32` entries.
    pub(crate) fn u32_field(&mut self) -> Result<Vec<u32>> {
        let raw = self.field()?;
        if raw.len() % 4 != 0 {
            return Err(Error::InvalidEncoding(format!(
                "u32 field length {} is not a multiple of 4",
                raw.len()
            )));
        }
        Ok(raw
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// A field holding packed little-endian `u16` entries.
    pub(crate) fn u16_field(&mut self) -> Result<Vec<u16>> {
        let raw = self.field()?;
        if raw.len() % 2 != 0 {
            return Err(Error::InvalidEncoding(format!(
                "u16 field length {} is not a multiple of 2",
                raw.len()
            )));
        }
        Ok(raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect())
    }
}

/// Sizes on the wire are `u32`. Trie builds cap their key bytes at
/// [`crate::louds::MAX_KEY_BYTES`] so every size they emit fits.
pub(crate) fn put_u32(out: &mut Vec<u8>, v: usize) {
    debug_assert!(u32::try_from(v).is_ok(), "{v} does not fit the u32 wire format");
    out.extend_from_slice(&(v as u32).to_le_bytes());
}

pub(crate) fn put_field(out: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(out, bytes.len());
    out.extend_from_slice(bytes);
}

pub(crate) fn put_u32_field(out: &mut Vec<u8>, words: &[u32]) {
    put_u32(out, words.len() * 4);
    for &w in words {
        out.extend_from_slice(&w.to_le_bytes());
    }
}

pub(crate) fn put_u16_field(out: &mut Vec<u8>, words: &[u16]) {
    put_u32(out, words.len() * 2);
    for &w in words {
        out.extend_from_slice(&w.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_read_back_in_order() {
        let mut out = Vec::new();
        put_u32(&mut out, 7);
        put_field(&mut out, b"abc");
        put_u32_field(&mut out, &[1, 0xdead_beef]);
        put_u16_field(&mut out, &[2, 0xffff]);

        let mut r = Reader::new(&out, 0);
        assert_eq!(r.u32().unwrap(), 7);
        assert_eq!(r.field().unwrap(), b"abc");
        assert_eq!(r.u32_field().unwrap(), vec![1, 0xdead_beef]);
        assert_eq!(r.u16_field().unwrap(), vec![2, 0xffff]);
        assert_eq!(r.offset(), out.len());
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut out = Vec::new();
        put_field(&mut out, b"abcdef");
        out.truncate(out.len() - 1);
        let mut r = Reader::new(&out, 0);
        assert!(matches!(r.field(), Err(Error::InvalidEncoding(_))));
    }

    #[test]
    fn misaligned_word_field_is_an_error() {
        let mut out = Vec::new();
        put_field(&mut out, &[1, 2, 3]);
        assert!(Reader::new(&out, 0).u32_field().is_err());
        assert!(Reader::new(&out, 0).u16_field().is_err());
    }
}
