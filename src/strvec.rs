//! String vectors: many byte strings in one buffer with $O(1)$-ish access.
//!
//! The succinct variant stores no offsets. Two bit vectors take their place:
//! - `is_empty`: bit `i` set iff string `i` is empty.
//! - `delim`: one bit per data byte, set on the last byte of each non-empty
//!   string.
//!
//! String `i` (non-empty) is the `r`-th non-empty string with
//! `r = is_empty.rank0(i)`, so it spans `[delim.select1(r), delim.select1(r + 1))`.
//! Two rank/select calls replace a 32-bit offset per entry; trie tails are
//! mostly empty or short, which is where this pays off.

use crate::bitvec::SuccinctBitVector;
use crate::codec::{put_field, put_u32, Blob, Reader};
use crate::error::{Error, Result};
use crate::rank_select::{BitBuilder, RankSelect};

/// Random access to an immutable sequence of byte strings.
pub trait StringVector: Blob {
    /// Number of strings.
    fn len(&self) -> usize;

    /// Return true if there are no strings.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All string bytes, concatenated.
    fn data(&self) -> &[u8];

    /// String `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    fn at(&self, i: usize) -> &[u8];

    /// String `i`, or an error if out of bounds.
    fn get(&self, i: usize) -> Result<&[u8]> {
        if i >= self.len() {
            return Err(Error::IndexOutOfBounds(i));
        }
        Ok(self.at(i))
    }
}

/// Validate an `n + 1` entry offset table over a buffer of `buffer_len` bytes.
pub(crate) fn check_offsets(offsets: &[u32], buffer_len: usize) -> Result<()> {
    let Some(&last) = offsets.last() else {
        return Err(Error::InvalidOffsets(
            "offset table needs at least one entry".to_string(),
        ));
    };
    if let Some(w) = offsets.windows(2).position(|w| w[0] > w[1]) {
        return Err(Error::InvalidOffsets(format!(
            "offsets decrease at entry {}: {} > {}",
            w + 1,
            offsets[w],
            offsets[w + 1]
        )));
    }
    if last as usize > buffer_len {
        return Err(Error::InvalidOffsets(format!(
            "last offset {last} is past the {buffer_len}-byte buffer"
        )));
    }
    Ok(())
}

/// Offset-free string vector built on two rank/select bit vectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccinctStringVector<B = SuccinctBitVector> {
    data: Vec<u8>,
    is_empty: B,
    delim: B,
}

impl<B: RankSelect> SuccinctStringVector<B> {
    /// Concatenate `strings`, recording emptiness and end positions.
    pub fn from_strs<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut data = Vec::new();
        let mut is_empty = BitBuilder::new();
        let mut delim = BitBuilder::new();
        for s in strings {
            let s = s.as_ref();
            is_empty.push(s.is_empty());
            if let Some((_, head)) = s.split_last() {
                for _ in head {
                    delim.push(false);
                }
                delim.push(true);
            }
            data.extend_from_slice(s);
        }
        Self {
            data,
            is_empty: is_empty.finish(),
            delim: delim.finish(),
        }
    }

    /// Build from a shared buffer and its `n + 1` entry offset table.
    pub fn from_buffer_offsets(buffer: &[u8], offsets: &[u32]) -> Result<Self> {
        check_offsets(offsets, buffer.len())?;
        Ok(Self::from_strs(
            offsets
                .windows(2)
                .map(|w| &buffer[w[0] as usize..w[1] as usize]),
        ))
    }
}

impl<B: RankSelect> StringVector for SuccinctStringVector<B> {
    fn len(&self) -> usize {
        self.is_empty.len()
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn at(&self, i: usize) -> &[u8] {
        if self.is_empty.access(i) {
            return &[];
        }
        let r = self.is_empty.rank0(i);
        let begin = self.delim.select1(r);
        let end = self.delim.select1(r + 1);
        &self.data[begin..end]
    }
}

impl<B: RankSelect> Blob for SuccinctStringVector<B> {
    /// `n u32` + field(data) + is_empty blob + delim blob.
    fn dump_into(&self, out: &mut Vec<u8>) {
        put_u32(out, self.len());
        put_field(out, &self.data);
        self.is_empty.dump_into(out);
        self.delim.dump_into(out);
    }

    fn load(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut r = Reader::new(bytes, offset);
        let n = r.u32()? as usize;
        let data = r.field()?.to_vec();
        let (is_empty, off) = B::load(bytes, r.offset())?;
        let (delim, off) = B::load(bytes, off)?;

        if is_empty.len() != n {
            return Err(Error::InvalidEncoding(format!(
                "string vector of {n} strings has a {}-bit emptiness map",
                is_empty.len()
            )));
        }
        if delim.len() != data.len() {
            return Err(Error::InvalidEncoding(format!(
                "string vector data of {} bytes has a {}-bit delimiter map",
                data.len(),
                delim.len()
            )));
        }
        if delim.count_ones() != is_empty.count_zeros() {
            return Err(Error::InvalidEncoding(format!(
                "{} delimiters for {} non-empty strings",
                delim.count_ones(),
                is_empty.count_zeros()
            )));
        }
        if !data.is_empty() && !delim.access(data.len() - 1) {
            return Err(Error::InvalidEncoding(
                "string vector data does not end on a delimiter".to_string(),
            ));
        }
        Ok((
            Self {
                data,
                is_empty,
                delim,
            },
            off,
        ))
    }
}
