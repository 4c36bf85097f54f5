//! The rank/select contract shared by every bit-vector backend.
//!
//! Conventions (all backends):
//! - `rank1(i)` counts set bits in `[0, i)`, so `i` ranges over `[0, len]`.
//! - `select1(k)` is the minimal `i` in `[0, len]` with `rank1(i) >= k`.
//!   Hence `select1(0) == 0` and the k-th set bit (1-based) sits at
//!   `select1(k) - 1`.
//! - Asking for more ones (or zeros) than exist is a contract violation.

use crate::codec::Blob;
use crate::error::{Error, Result};

/// Rank/select over an immutable bit sequence.
pub trait RankSelect: Blob {
    /// Build from packed LSB-first bytes holding `len` bits.
    ///
    /// Bits of `bytes` at or beyond `len` must be zero.
    fn from_packed(bytes: Vec<u8>, len: usize) -> Self;

    /// Number of bits.
    fn len(&self) -> usize;

    /// Return true if the sequence holds no bits.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Packed LSB-first bytes backing the sequence.
    fn as_bytes(&self) -> &[u8];

    /// Value of bit `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    fn access(&self, i: usize) -> bool;

    /// Number of set bits in `[0, i)`.
    ///
    /// # Panics
    ///
    /// Panics if `i > len()`.
    fn rank1(&self, i: usize) -> usize;

    /// Number of unset bits in `[0, i)`.
    fn rank0(&self, i: usize) -> usize {
        i - self.rank1(i)
    }

    /// Total number of set bits.
    fn count_ones(&self) -> usize {
        self.rank1(self.len())
    }

    /// Total number of unset bits.
    fn count_zeros(&self) -> usize {
        self.len() - self.count_ones()
    }

    /// Minimal `i` with `rank1(i) >= k`, or an error if fewer than `k` bits are set.
    fn try_select1(&self, k: usize) -> Result<usize> {
        if k > self.count_ones() {
            return Err(Error::InvalidSelection(k));
        }
        Ok(lower_bound(0, self.len(), k, |i| self.rank1(i)))
    }

    /// Minimal `i` with `rank0(i) >= k`, or an error if fewer than `k` bits are unset.
    fn try_select0(&self, k: usize) -> Result<usize> {
        if k > self.count_zeros() {
            return Err(Error::InvalidSelection(k));
        }
        Ok(lower_bound(0, self.len(), k, |i| self.rank0(i)))
    }

    /// Minimal `i` with `rank1(i) >= k`.
    ///
    /// # Panics
    ///
    /// Panics if `k > count_ones()`.
    fn select1(&self, k: usize) -> usize {
        match self.try_select1(k) {
            Ok(i) => i,
            Err(_) => panic!(
                "select1({k}) past the {} set bits of the sequence",
                self.count_ones()
            ),
        }
    }

    /// Minimal `i` with `rank0(i) >= k`.
    ///
    /// # Panics
    ///
    /// Panics if `k > count_zeros()`.
    fn select0(&self, k: usize) -> usize {
        match self.try_select0(k) {
            Ok(i) => i,
            Err(_) => panic!(
                "select0({k}) past the {} unset bits of the sequence",
                self.count_zeros()
            ),
        }
    }
}

/// Minimal `i` in `[lo, hi]` with `rank(i) >= k`, for a monotone `rank`.
///
/// Requires `rank(hi) >= k`; `k == 0` yields `lo` when `lo == 0`.
pub(crate) fn lower_bound(
    mut lo: usize,
    mut hi: usize,
    k: usize,
    rank: impl Fn(usize) -> usize,
) -> usize {
    if k == 0 || rank(lo) >= k {
        return lo;
    }
    // Invariant: rank(lo) < k <= rank(hi).
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if rank(mid) >= k {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

/// Append-only packer producing the LSB-first byte layout the backends expect.
#[derive(Debug, Default, Clone)]
pub struct BitBuilder {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// Append one bit.
    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[self.len / 8] |= 1 << (self.len % 8);
        }
        self.len += 1;
    }

    /// Number of bits pushed so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Freeze into a rank/select backend.
    pub fn finish<B: RankSelect>(self) -> B {
        B::from_packed(self.bytes, self.len)
    }
}

impl FromIterator<bool> for BitBuilder {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut b = BitBuilder::new();
        for bit in iter {
            b.push(bit);
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_packs_lsb_first() {
        let b: BitBuilder = [true, false, true, true, false, false, false, false, true]
            .into_iter()
            .collect();
        assert_eq!(b.len(), 9);
        assert_eq!(b.bytes, vec![0b0000_1101, 0b0000_0001]);
    }

    #[test]
    fn lower_bound_finds_minimal_index() {
        // rank over bits 0,1,1,0,1
        let ranks = [0, 0, 1, 2, 2, 3];
        let rank = |i: usize| ranks[i];
        assert_eq!(lower_bound(0, 5, 0, rank), 0);
        assert_eq!(lower_bound(0, 5, 1, rank), 2);
        assert_eq!(lower_bound(0, 5, 2, rank), 3);
        assert_eq!(lower_bound(0, 5, 3, rank), 5);
    }
}
