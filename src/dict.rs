//! String dictionary: a LOUDS trie that maps UTF-8 keys to their input index.
//!
//! ```
//! use sdict::Dictionary;
//!
//! let dict: Dictionary = Dictionary::from_keys(["an", "i", "of", "one", "our", "out"])?;
//! assert_eq!(dict.get_value("one"), Some(3));
//! assert!(!dict.contains("on"));
//!
//! let page = dict.get_words("o", 2)?;
//! assert_eq!(page.words.len(), 2);
//! let rest = dict.get_more_words(page.cursor.unwrap(), 10)?;
//! assert_eq!(rest.words.len(), 2);
//! # Ok::<(), sdict::Error>(())
//! ```

use std::path::Path;

use tracing::debug;

use crate::bitvec::SuccinctBitVector;
use crate::codec::{put_u32, Blob, Reader};
use crate::error::{Error, Result};
use crate::loader::KeyBuffer;
use crate::louds::LoudsTrie;
use crate::rank_select::RankSelect;
use crate::search::{self, Cursor, LengthFilter, RawPage};
use crate::strvec::check_offsets;

/// A stored key and the index it had in the build input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hit {
    /// The key.
    pub word: String,
    /// Input index of the key.
    pub value: u32,
}

/// One page of prefix results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordsPage {
    /// Hits in byte-wise lexicographic order.
    pub words: Vec<Hit>,
    /// Set when another page holds at least one hit.
    pub cursor: Option<Cursor>,
}

impl WordsPage {
    /// Return true if [`Dictionary::get_more_words`] would return hits.
    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    fn from_raw(page: RawPage) -> Result<Self> {
        let words = page
            .hits
            .into_iter()
            .map(|h| {
                let word = String::from_utf8(h.key).map_err(|e| {
                    Error::InvalidEncoding(format!("stored key is not UTF-8: {e}"))
                })?;
                Ok(Hit {
                    word,
                    value: h.value,
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self {
            words,
            cursor: page.cursor,
        })
    }
}

/// Immutable key set with exact lookup and paged prefix enumeration.
///
/// Values are input indices: the key at position `i` of the build input maps
/// to `i`. For a repeated key the first occurrence wins. Empty keys count
/// toward [`len`](Self::len) but are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary<B = SuccinctBitVector> {
    len: usize,
    trie: LoudsTrie<B>,
}

impl<B: RankSelect> Dictionary<B> {
    /// Build from keys in input order.
    pub fn from_keys<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<S> = keys.into_iter().collect();
        let trie = LoudsTrie::from_keys(keys.iter().map(|k| k.as_ref().as_bytes()))?;
        Ok(Self::with_trie(keys.len(), trie))
    }

    /// Build from a UTF-8 buffer and its `n + 1` entry offset table.
    pub fn from_buffer_offsets(buffer: &[u8], offsets: &[u32]) -> Result<Self> {
        check_offsets(offsets, buffer.len())?;
        let text = std::str::from_utf8(buffer)
            .map_err(|e| Error::InvalidKey(format!("key buffer is not UTF-8: {e}")))?;
        if let Some(&off) = offsets.iter().find(|&&o| !text.is_char_boundary(o as usize)) {
            return Err(Error::InvalidKey(format!(
                "offset {off} splits a UTF-8 sequence"
            )));
        }
        let trie = LoudsTrie::from_buffer_offsets(buffer, offsets)?;
        Ok(Self::with_trie(offsets.len() - 1, trie))
    }

    /// Build from keys read by [`KeyBuffer`].
    pub fn from_key_buffer(keys: &KeyBuffer) -> Result<Self> {
        Self::from_buffer_offsets(&keys.buffer, &keys.offsets)
    }

    fn with_trie(len: usize, trie: LoudsTrie<B>) -> Self {
        debug!(
            keys = len,
            stored = trie.num_keys(),
            nodes = trie.num_nodes(),
            "built dictionary"
        );
        Self { len, trie }
    }

    /// Number of input keys, empty and repeated ones included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if built from no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The underlying trie.
    pub fn trie(&self) -> &LoudsTrie<B> {
        &self.trie
    }

    /// Input index of `word`, if it is a key.
    pub fn get_value(&self, word: &str) -> Option<u32> {
        search::get_value(&self.trie, word.as_bytes())
    }

    /// Return true if `word` is a key.
    pub fn contains(&self, word: &str) -> bool {
        search::contains(&self.trie, word.as_bytes())
    }

    /// First page of up to `limit` keys starting with `prefix`.
    pub fn get_words(&self, prefix: &str, limit: usize) -> Result<WordsPage> {
        self.get_words_filtered(prefix, limit, LengthFilter::ANY)
    }

    /// Like [`get_words`](Self::get_words), keeping only keys whose char count
    /// is within `lengths`. The filter sticks to the returned cursor.
    pub fn get_words_filtered(
        &self,
        prefix: &str,
        limit: usize,
        lengths: LengthFilter,
    ) -> Result<WordsPage> {
        WordsPage::from_raw(search::get_words(
            &self.trie,
            prefix.as_bytes(),
            limit,
            lengths,
        )?)
    }

    /// Every key starting with `prefix`.
    pub fn get_all_words(&self, prefix: &str) -> Result<Vec<Hit>> {
        Ok(self.get_words(prefix, usize::MAX)?.words)
    }

    /// Next page of up to `limit` keys after `cursor`.
    pub fn get_more_words(&self, cursor: Cursor, limit: usize) -> Result<WordsPage> {
        WordsPage::from_raw(search::get_more_words(&self.trie, cursor, limit)?)
    }

    /// Encode into a fresh buffer.
    pub fn dump(&self) -> Vec<u8> {
        self.to_bytes()
    }

    /// Decode a buffer holding exactly one dictionary.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        <Self as Blob>::from_bytes(bytes)
    }

    /// Decode a dictionary embedded at `offset`, returning the offset just
    /// past it.
    pub fn load_at(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        <Self as Blob>::load(bytes, offset)
    }

    /// Write the encoded dictionary to `path`.
    pub fn dump_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.dump();
        std::fs::write(path.as_ref(), &bytes)?;
        debug!(path = %path.as_ref().display(), bytes = bytes.len(), "wrote dictionary");
        Ok(())
    }

    /// Read a dictionary written by [`dump_file`](Self::dump_file).
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let dict = Self::load(&bytes)?;
        debug!(path = %path.as_ref().display(), bytes = bytes.len(), keys = dict.len, "loaded dictionary");
        Ok(dict)
    }
}

impl<B: RankSelect> Blob for Dictionary<B> {
    /// `key_count u32` + trie blob.
    fn dump_into(&self, out: &mut Vec<u8>) {
        put_u32(out, self.len);
        self.trie.dump_into(out);
    }

    fn load(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut r = Reader::new(bytes, offset);
        let len = r.u32()? as usize;
        let (trie, off) = LoudsTrie::<B>::load(bytes, r.offset())?;
        if trie.num_keys() > len {
            return Err(Error::InvalidEncoding(format!(
                "{} stored keys for a {len}-key dictionary",
                trie.num_keys()
            )));
        }
        if let Some(v) = trie.values().iter().find(|&&v| v as usize >= len) {
            return Err(Error::InvalidEncoding(format!(
                "value {v} out of range for {len} keys"
            )));
        }
        Ok((Self { len, trie }, off))
    }
}
