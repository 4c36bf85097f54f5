//! Exact lookup and paged prefix enumeration over [`TrieNav`].
//!
//! Enumeration is a pre-order depth-first walk driven by an explicit frame
//! `(depth, node, prefix)` instead of recursion. LOUDS gives every node its
//! next sibling and its parent, so that single frame is the whole traversal
//! state: a page can stop anywhere and hand the frame back as a [`Cursor`].
//! Resuming from the cursor continues the same walk, so the concatenation of
//! all pages is exactly one unpaged enumeration.

use crate::error::{Error, Result};
use crate::louds::TrieNav;

/// Inclusive bounds on key length, counted in chars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LengthFilter {
    /// Shortest accepted key.
    pub min: Option<usize>,
    /// Longest accepted key.
    pub max: Option<usize>,
}

impl LengthFilter {
    /// Accept every key.
    pub const ANY: Self = Self {
        min: None,
        max: None,
    };

    /// Accept keys of `min..=max` chars.
    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Return true if a UTF-8 `key` is within bounds.
    pub fn accepts(&self, key: &[u8]) -> bool {
        if *self == Self::ANY {
            return true;
        }
        // Count lead bytes; continuation bytes are 0b10xx_xxxx.
        let chars = key.iter().filter(|&&b| b & 0xC0 != 0x80).count();
        self.min.is_none_or(|min| chars >= min) && self.max.is_none_or(|max| chars <= max)
    }
}

/// Where a paged enumeration stopped.
///
/// `node` has not been visited yet; `depth` counts edges below the node the
/// prefix led to, and `prefix` spells the path to `node`. A cursor is a plain
/// value: resuming it or dropping it has no side effects, and it stays valid
/// for as long as the dictionary it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cursor {
    depth: usize,
    node: usize,
    prefix: Vec<u8>,
    lengths: LengthFilter,
}

impl Cursor {
    /// Edges between the enumeration's start node and `node()`.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Next node to visit.
    pub fn node(&self) -> usize {
        self.node
    }

    /// Key bytes spelled by the path to `node()`.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Length filter carried over from the first page.
    pub fn lengths(&self) -> LengthFilter {
        self.lengths
    }
}

/// A key and its original index, as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    /// Full key bytes.
    pub key: Vec<u8>,
    /// Index of the key in the build input.
    pub value: u32,
}

/// One page of enumeration results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    /// Hits in enumeration order.
    pub hits: Vec<RawHit>,
    /// Set when more hits remain; resume with [`get_more_words`].
    pub cursor: Option<Cursor>,
}

impl RawPage {
    /// Return true if another page holds at least one hit.
    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }
}

/// Follow `word` from the root one byte per level.
///
/// Returns the landing node and how many bytes were consumed. Descent stops
/// early (with bytes left over) at a node without children; a byte with no
/// matching edge means no key can start with `word`.
pub fn descend<T: TrieNav + ?Sized>(trie: &T, word: &[u8]) -> Option<(usize, usize)> {
    let mut node = trie.root();
    let mut consumed = 0;
    while consumed < word.len() {
        let Some(first) = trie.first_child(node) else {
            break;
        };
        let want = word[consumed];
        let mut child = Some(first);
        while let Some(c) = child {
            if trie.edge(c) == want {
                break;
            }
            child = trie.next_sibling(c);
        }
        node = child?;
        consumed += 1;
    }
    Some((node, consumed))
}

/// Original index of `word`, if it is a key.
pub fn get_value<T: TrieNav + ?Sized>(trie: &T, word: &[u8]) -> Option<u32> {
    let (node, consumed) = descend(trie, word)?;
    let term = trie.terminal(node)?;
    // A compressed node can be reached before the word is used up.
    (term.tail == &word[consumed..]).then_some(term.value)
}

/// Return true if `word` is a key.
pub fn contains<T: TrieNav + ?Sized>(trie: &T, word: &[u8]) -> bool {
    get_value(trie, word).is_some()
}

/// First page of keys starting with `prefix`, at most `limit` hits.
pub fn get_words<T: TrieNav + ?Sized>(
    trie: &T,
    prefix: &[u8],
    limit: usize,
    lengths: LengthFilter,
) -> Result<RawPage> {
    let Some((node, consumed)) = descend(trie, prefix) else {
        return Ok(RawPage::default());
    };
    if consumed < prefix.len() {
        // Only the landing node's own key can still match.
        let rest = &prefix[consumed..];
        if !trie.terminal(node).is_some_and(|t| t.tail.starts_with(rest)) {
            return Ok(RawPage::default());
        }
    }
    let start = Cursor {
        depth: 0,
        node,
        prefix: prefix[..consumed].to_vec(),
        lengths,
    };
    collect(trie, start, limit)
}

/// Next page after `cursor`, at most `limit` hits.
pub fn get_more_words<T: TrieNav + ?Sized>(
    trie: &T,
    cursor: Cursor,
    limit: usize,
) -> Result<RawPage> {
    if !trie.is_node(cursor.node) {
        return Err(Error::InvalidCursor(format!(
            "{} is not a node of this trie",
            cursor.node
        )));
    }
    if cursor.depth > cursor.prefix.len() {
        return Err(Error::InvalidCursor(format!(
            "depth {} exceeds the {}-byte prefix",
            cursor.depth,
            cursor.prefix.len()
        )));
    }
    if cursor.depth > 0
        && (cursor.node == trie.root() || cursor.prefix.last() != Some(&trie.edge(cursor.node)))
    {
        return Err(Error::InvalidCursor(
            "prefix does not end with the node's edge".to_string(),
        ));
    }
    collect(trie, cursor, limit)
}

/// Pre-order walk from `frame` until it ends or a `limit + 1`-th hit shows up.
fn collect<T: TrieNav + ?Sized>(trie: &T, mut frame: Cursor, limit: usize) -> Result<RawPage> {
    let mut hits = Vec::new();
    loop {
        if let Some(term) = trie.terminal(frame.node) {
            let mut key = Vec::with_capacity(frame.prefix.len() + term.tail.len());
            key.extend_from_slice(&frame.prefix);
            key.extend_from_slice(term.tail);
            if frame.lengths.accepts(&key) {
                if hits.len() == limit {
                    return Ok(RawPage {
                        hits,
                        cursor: Some(frame),
                    });
                }
                hits.push(RawHit {
                    key,
                    value: term.value,
                });
            }
        }

        if let Some(child) = trie.first_child(frame.node) {
            frame.node = child;
            frame.depth += 1;
            frame.prefix.push(trie.edge(child));
            continue;
        }

        // Subtree done: move to the next sibling, popping finished levels.
        loop {
            if frame.depth == 0 {
                return Ok(RawPage { hits, cursor: None });
            }
            if let Some(sibling) = trie.next_sibling(frame.node) {
                frame.node = sibling;
                if let Some(last) = frame.prefix.last_mut() {
                    *last = trie.edge(sibling);
                }
                break;
            }
            frame.node = trie.parent(frame.node).ok_or_else(|| {
                Error::InvalidCursor("cursor depth runs past the root".to_string())
            })?;
            frame.depth -= 1;
            frame.prefix.pop();
        }
    }
}
