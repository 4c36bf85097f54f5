//! Succinct bit vector with two-level rank index.
//!
//! # Layout
//!
//! Bits are packed LSB-first into bytes. Two auxiliary arrays answer `rank1`
//! in constant time:
//! - `chunk[c]` (`u32`, one per 1024-bit super-block): ones in `[0, c * 1024)`.
//! - `block[b]` (`u16`, one per 16-bit block): ones from the start of the
//!   enclosing super-block up to `b * 16`.
//!
//! The remainder inside a block is counted with a process-wide 65536-entry
//! popcount table over 16-bit patterns.
//!
//! `rank1(i) = chunk[i / 1024] + block[i / 16] + popcount(word(i / 16) & mask(i % 16))`
//!
//! Select binary-searches the super-block index, then positions inside the
//! super-block: $O(\log n)$.

use std::sync::LazyLock;

use tracing::trace;

use crate::codec::{put_field, put_u16_field, put_u32, put_u32_field, Blob, Reader};
use crate::error::{Error, Result};
use crate::rank_select::{lower_bound, RankSelect};

const CHUNK_BITS: usize = 1024;
const BLOCK_BITS: usize = 16;

/// Population count of every 16-bit pattern, computed once per process.
static POPCOUNT16: LazyLock<Box<[u8; 1 << 16]>> = LazyLock::new(|| {
    let mut table = Box::new([0u8; 1 << 16]);
    for (pattern, slot) in table.iter_mut().enumerate() {
        *slot = pattern.count_ones() as u8;
    }
    table
});

#[inline]
fn popcount16(pattern: u16) -> usize {
    POPCOUNT16[pattern as usize] as usize
}

/// Immutable bit vector with $O(1)$ rank and $O(\log n)$ select.
#[derive(Clone, PartialEq, Eq)]
pub struct SuccinctBitVector {
    data: Vec<u8>,
    chunk: Vec<u32>,
    block: Vec<u16>,
    len: usize,
}

impl std::fmt::Debug for SuccinctBitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuccinctBitVector")
            .field("len", &self.len)
            .field("ones", &self.count_ones())
            .finish()
    }
}

impl SuccinctBitVector {
    /// Build from packed bytes holding `len` bits.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than `len` bits.
    pub fn new(mut data: Vec<u8>, len: usize) -> Self {
        assert!(
            data.len() * 8 >= len,
            "{} bytes cannot hold {len} bits",
            data.len()
        );
        data.truncate(len.div_ceil(8));
        if len % 8 != 0 {
            let last = data.len() - 1;
            data[last] &= (1u8 << (len % 8)) - 1;
        }
        let (chunk, block) = build_index(&data, len);
        Self {
            data,
            chunk,
            block,
            len,
        }
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.data.capacity() + self.chunk.capacity() * 4 + self.block.capacity() * 2
    }

    /// The 16-bit word starting at bit `b * 16`; missing bytes read as zero.
    #[inline]
    fn word16(&self, b: usize) -> u16 {
        let lo = self.data.get(2 * b).copied().unwrap_or(0);
        let hi = self.data.get(2 * b + 1).copied().unwrap_or(0);
        u16::from_le_bytes([lo, hi])
    }
}

/// Fill `chunk[]` and `block[]` in one pass over the 16-bit blocks.
///
/// The per-block counter resets at every super-block boundary, so
/// `chunk[i / 1024] + block[i / 16]` is exactly the ones before the block.
fn build_index(data: &[u8], len: usize) -> (Vec<u32>, Vec<u16>) {
    let mut chunk = vec![0u32; len / CHUNK_BITS + 1];
    let mut block = vec![0u16; len / BLOCK_BITS + 1];
    let mut total = 0u32;
    let mut within = 0u16;

    for (b, slot) in block.iter_mut().enumerate() {
        let pos = b * BLOCK_BITS;
        if pos % CHUNK_BITS == 0 {
            chunk[pos / CHUNK_BITS] = total;
            within = 0;
        }
        *slot = within;
        let lo = data.get(2 * b).copied().unwrap_or(0);
        let hi = data.get(2 * b + 1).copied().unwrap_or(0);
        let ones = popcount16(u16::from_le_bytes([lo, hi]));
        within += ones as u16;
        total += ones as u32;
    }
    (chunk, block)
}

impl RankSelect for SuccinctBitVector {
    fn from_packed(bytes: Vec<u8>, len: usize) -> Self {
        Self::new(bytes, len)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn access(&self, i: usize) -> bool {
        assert!(i < self.len, "access({i}) out of bounds for {} bits", self.len);
        (self.data[i / 8] >> (i % 8)) & 1 == 1
    }

    #[inline]
    fn rank1(&self, i: usize) -> usize {
        assert!(i <= self.len, "rank1({i}) out of bounds for {} bits", self.len);
        if i == 0 {
            return 0;
        }
        let b = i / BLOCK_BITS;
        let mask = ((1u32 << (i % BLOCK_BITS)) - 1) as u16;
        self.chunk[i / CHUNK_BITS] as usize
            + self.block[b] as usize
            + popcount16(self.word16(b) & mask)
    }

    fn try_select1(&self, k: usize) -> Result<usize> {
        if k == 0 {
            return Ok(0);
        }
        if k > self.count_ones() {
            return Err(Error::InvalidSelection(k));
        }
        // Last super-block starting with fewer than k ones before it.
        let c = self.chunk.partition_point(|&ones| (ones as usize) < k) - 1;
        let lo = c * CHUNK_BITS;
        let hi = (lo + CHUNK_BITS).min(self.len);
        Ok(lower_bound(lo, hi, k, |i| self.rank1(i)))
    }

    fn try_select0(&self, k: usize) -> Result<usize> {
        if k == 0 {
            return Ok(0);
        }
        if k > self.count_zeros() {
            return Err(Error::InvalidSelection(k));
        }
        let zeros_before = |c: usize| c * CHUNK_BITS - self.chunk[c] as usize;
        let (mut lo, mut hi) = (0, self.chunk.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if zeros_before(mid) < k {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let c = lo - 1;
        let lo = c * CHUNK_BITS;
        let hi = (lo + CHUNK_BITS).min(self.len);
        Ok(lower_bound(lo, hi, k, |i| self.rank0(i)))
    }
}

impl Blob for SuccinctBitVector {
    /// `len u32` + field(data) + field(chunk as u32) + field(block as u16).
    fn dump_into(&self, out: &mut Vec<u8>) {
        put_u32(out, self.len);
        put_field(out, &self.data);
        put_u32_field(out, &self.chunk);
        put_u16_field(out, &self.block);
    }

    fn load(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut r = Reader::new(bytes, offset);
        let len = r.u32()? as usize;
        let data = r.field()?.to_vec();
        let chunk = r.u32_field()?;
        let block = r.u16_field()?;

        if data.len() != len.div_ceil(8) {
            return Err(Error::InvalidEncoding(format!(
                "bit vector of {len} bits carries {} data bytes",
                data.len()
            )));
        }
        let expected = build_index(&data, len);
        if chunk.len() != expected.0.len() || block.len() != expected.1.len() {
            return Err(Error::InvalidEncoding(format!(
                "bit vector of {len} bits carries {} chunk and {} block entries",
                chunk.len(),
                block.len()
            )));
        }
        if len % 8 != 0 && data[data.len() - 1] >> (len % 8) != 0 {
            return Err(Error::InvalidEncoding(
                "bit vector has set bits past its length".to_string(),
            ));
        }
        if chunk != expected.0 || block != expected.1 {
            return Err(Error::InvalidEncoding(
                "bit vector rank index does not match its data".to_string(),
            ));
        }
        trace!(len, consumed = r.offset() - offset, "loaded succinct bit vector");

        Ok((
            Self {
                data,
                chunk,
                block,
                len,
            },
            r.offset(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SuccinctBitVector {
        SuccinctBitVector::new(vec![0b0101_1101, 0b1000_1110, 0b0000_0110], 24)
    }

    #[test]
    fn rank_basic() {
        let bv = sample();
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.rank1(1), 1);
        assert_eq!(bv.rank1(2), 1);
        assert_eq!(bv.rank1(3), 2);
        assert_eq!(bv.rank1(8), 5);
        assert_eq!(bv.rank1(9), 5);
        assert_eq!(bv.rank1(10), 6);
        assert_eq!(bv.rank1(24), 11);
        assert_eq!(bv.rank0(24), 13);
        assert!(bv.access(0));
        assert!(!bv.access(1));
    }

    #[test]
    fn select_basic() {
        let bv = sample();
        assert_eq!(bv.select1(0), 0);
        assert_eq!(bv.select1(1), 1);
        assert_eq!(bv.select1(10), 18);
        assert_eq!(bv.select1(11), 19);
        assert_eq!(bv.select0(0), 0);
        assert_eq!(bv.select0(1), 2);
        assert_eq!(bv.select0(10), 21);
    }

    #[test]
    fn select_past_count_is_an_error() {
        let bv = sample();
        assert!(matches!(bv.try_select1(12), Err(Error::InvalidSelection(12))));
        assert!(matches!(bv.try_select0(14), Err(Error::InvalidSelection(14))));
    }

    #[test]
    #[should_panic(expected = "select1(12)")]
    fn select_past_count_panics() {
        sample().select1(12);
    }

    #[test]
    #[should_panic(expected = "rank1(25)")]
    fn rank_past_len_panics() {
        sample().rank1(25);
    }

    #[test]
    fn rank_across_super_blocks() {
        // Every third bit set across several super-blocks.
        let len: usize = 5000;
        let mut bytes = vec![0u8; len.div_ceil(8)];
        for i in (0..len).step_by(3) {
            bytes[i / 8] |= 1 << (i % 8);
        }
        let bv = SuccinctBitVector::new(bytes, len);
        for i in 0..=len {
            assert_eq!(bv.rank1(i), i.div_ceil(3), "rank1({i})");
        }
        for k in 1..=bv.count_ones() {
            assert_eq!(bv.select1(k), 3 * (k - 1) + 1, "select1({k})");
        }
    }

    #[test]
    fn padding_bits_are_cleared() {
        let bv = SuccinctBitVector::new(vec![0xff], 3);
        assert_eq!(bv.count_ones(), 3);
        assert_eq!(bv.as_bytes(), &[0b0000_0111]);
    }

    #[test]
    fn empty_vector() {
        let bv = SuccinctBitVector::new(Vec::new(), 0);
        assert!(bv.is_empty());
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.select1(0), 0);
        assert_eq!(bv.select0(0), 0);
    }

    #[test]
    fn blob_roundtrip_and_layout() {
        let bv = sample();
        let bytes = bv.to_bytes();
        // len + (4 + 3 data) + (4 + 1 chunk * 4) + (4 + 2 blocks * 2)
        assert_eq!(bytes.len(), 4 + 7 + 8 + 8);
        assert_eq!(&bytes[0..4], &24u32.to_le_bytes());
        let back = SuccinctBitVector::from_bytes(&bytes).unwrap();
        assert_eq!(back, bv);
    }

    #[test]
    fn blob_rejects_corruption() {
        let bv = sample();
        let mut bytes = bv.to_bytes();
        bytes.push(0);
        assert!(SuccinctBitVector::from_bytes(&bytes).is_err());

        let mut bytes = bv.to_bytes();
        // Flip a block entry so the index no longer matches the data.
        let n = bytes.len();
        bytes[n - 1] ^= 1;
        assert!(SuccinctBitVector::from_bytes(&bytes).is_err());

        let bytes = bv.to_bytes();
        assert!(SuccinctBitVector::from_bytes(&bytes[..bytes.len() - 3]).is_err());
    }
}
