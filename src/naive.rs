//! Naive structures: raw data with no index.
//!
//! These are linear-scan reference implementations. They serve as correctness
//! oracles for the succinct versions and as an alternate trie backend; they are
//! not meant for production lookups.

use crate::codec::{put_field, put_u32, put_u32_field, Blob, Reader};
use crate::error::{Error, Result};
use crate::rank_select::RankSelect;
use crate::strvec::{check_offsets, StringVector};

/// A bit vector without any rank index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaiveBitVector {
    data: Vec<u8>,
    len: usize,
}

impl RankSelect for NaiveBitVector {
    fn from_packed(mut bytes: Vec<u8>, len: usize) -> Self {
        assert!(bytes.len() * 8 >= len, "{} bytes cannot hold {len} bits", bytes.len());
        bytes.truncate(len.div_ceil(8));
        if len % 8 != 0 {
            let last = bytes.len() - 1;
            bytes[last] &= (1u8 << (len % 8)) - 1;
        }
        Self { data: bytes, len }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// O(1).
    fn access(&self, i: usize) -> bool {
        assert!(i < self.len, "access({i}) out of bounds for {} bits", self.len);
        (self.data[i / 8] >> (i % 8)) & 1 == 1
    }

    /// Linear-time rank: O(N).
    fn rank1(&self, i: usize) -> usize {
        assert!(i <= self.len, "rank1({i}) out of bounds for {} bits", self.len);
        let full_bytes = i / 8;
        let mut count: usize = self.data[..full_bytes]
            .iter()
            .map(|b| b.count_ones() as usize)
            .sum();
        let bit_offset = i % 8;
        if bit_offset > 0 {
            let mask = (1u8 << bit_offset) - 1;
            count += (self.data[full_bytes] & mask).count_ones() as usize;
        }
        count
    }

    /// Linear-time select: O(N).
    fn try_select1(&self, k: usize) -> Result<usize> {
        scan_select(self, k, true)
    }

    /// Linear-time select: O(N).
    fn try_select0(&self, k: usize) -> Result<usize> {
        scan_select(self, k, false)
    }
}

fn scan_select(bv: &NaiveBitVector, k: usize, want: bool) -> Result<usize> {
    if k == 0 {
        return Ok(0);
    }
    let mut seen = 0;
    for i in 0..bv.len {
        if bv.access(i) == want {
            seen += 1;
            if seen == k {
                return Ok(i + 1);
            }
        }
    }
    Err(Error::InvalidSelection(k))
}

// No rank table on the wire: rank is a linear scan, so only the bits are kept.
impl Blob for NaiveBitVector {
    /// `len u32` + field(data).
    fn dump_into(&self, out: &mut Vec<u8>) {
        put_u32(out, self.len);
        put_field(out, &self.data);
    }

    fn load(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut r = Reader::new(bytes, offset);
        let len = r.u32()? as usize;
        let data = r.field()?.to_vec();
        if data.len() != len.div_ceil(8) {
            return Err(Error::InvalidEncoding(format!(
                "bit vector of {len} bits carries {} data bytes",
                data.len()
            )));
        }
        if len % 8 != 0 && data[data.len() - 1] >> (len % 8) != 0 {
            return Err(Error::InvalidEncoding(
                "bit vector has set bits past its length".to_string(),
            ));
        }
        Ok((Self { data, len }, r.offset()))
    }
}

/// Concatenated strings addressed through an `n + 1` entry offset table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaiveStringVector {
    data: Vec<u8>,
    offsets: Vec<u32>,
}

impl NaiveStringVector {
    /// Concatenate `strings` into one buffer.
    pub fn from_strs<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut data = Vec::new();
        let mut offsets = vec![0u32];
        for s in strings {
            data.extend_from_slice(s.as_ref());
            offsets.push(data.len() as u32);
        }
        Self { data, offsets }
    }

    /// Adopt an existing buffer and its offset table without copying keys.
    pub fn from_buffer_offsets(buffer: Vec<u8>, offsets: Vec<u32>) -> Result<Self> {
        check_offsets(&offsets, buffer.len())?;
        Ok(Self {
            data: buffer,
            offsets,
        })
    }
}

impl StringVector for NaiveStringVector {
    fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn at(&self, i: usize) -> &[u8] {
        assert!(i < self.len(), "string {i} out of bounds for {} strings", self.len());
        &self.data[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }
}

impl Blob for NaiveStringVector {
    /// `n u32` + field(data) + field(offsets as u32).
    fn dump_into(&self, out: &mut Vec<u8>) {
        put_u32(out, self.len());
        put_field(out, &self.data);
        put_u32_field(out, &self.offsets);
    }

    fn load(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut r = Reader::new(bytes, offset);
        let n = r.u32()? as usize;
        let data = r.field()?.to_vec();
        let offsets = r.u32_field()?;
        if offsets.len() != n + 1 {
            return Err(Error::InvalidEncoding(format!(
                "string vector of {n} strings carries {} offsets",
                offsets.len()
            )));
        }
        check_offsets(&offsets, data.len())
            .map_err(|e| Error::InvalidEncoding(e.to_string()))?;
        Ok((Self { data, offsets }, r.offset()))
    }
}
