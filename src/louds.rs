//! LOUDS-encoded trie with path-compressed tails.
//!
//! # Encoding
//!
//! The trie shape is a Level-Order Unary Degree Sequence: visiting nodes
//! breadth-first, each node writes one `1` per child followed by a `0`. A
//! synthetic super-root pair `1 0` is written first, so position 0 stands for
//! the root and the root's children start at position 2. A node is identified
//! by the position of its `1` bit.
//!
//! Alongside the shape:
//! - `edges[rank1(p) - 1]` is the byte on the edge into node `p`;
//! - terminal bit `li = rank1(p) - 1` marks nodes that end a key; the terminal
//!   ordinal `terminals.rank1(li)` indexes `values` (original key index) and
//!   `tails` (the key bytes below this node that were never expanded).
//!
//! # Ordering
//!
//! Keys are byte strings compared ordinally (`[u8]::cmp`). For UTF-8 keys this
//! is Unicode scalar value order. The order fixes both the trie shape and the
//! order in which prefix enumeration yields keys.
//!
//! # Path compression
//!
//! A child reached by exactly one key is never expanded: it becomes a terminal
//! whose tail holds the rest of that key. Unbranching suffixes therefore cost
//! tail bytes only, not structural bits.

use tracing::debug;

use crate::bitvec::SuccinctBitVector;
use crate::codec::{put_field, put_u32_field, Blob, Reader};
use crate::error::{Error, Result};
use crate::rank_select::{BitBuilder, RankSelect};
use crate::strvec::{check_offsets, StringVector, SuccinctStringVector};

/// A key ending at a node: its original index and the unexpanded remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminal<'a> {
    /// Index of the key in the build input.
    pub value: u32,
    /// Key bytes below the node that were path-compressed away.
    pub tail: &'a [u8],
}

/// Navigation primitives over a trie whose nodes are addressed by integers.
///
/// Every lookup and enumeration in [`crate::search`] is written against this
/// trait only.
pub trait TrieNav {
    /// The root node.
    fn root(&self) -> usize {
        0
    }

    /// First child of `p`, if any.
    fn first_child(&self, p: usize) -> Option<usize>;

    /// Next sibling of `p`, if the sibling run continues.
    fn next_sibling(&self, p: usize) -> Option<usize>;

    /// Parent of `p`; `None` for the root.
    fn parent(&self, p: usize) -> Option<usize>;

    /// Byte on the edge into `p`.
    ///
    /// # Panics
    ///
    /// Panics for the root, which has no incoming edge.
    fn edge(&self, p: usize) -> u8;

    /// Terminal data if a key ends at `p`.
    fn terminal(&self, p: usize) -> Option<Terminal<'_>>;

    /// Return true if `p` addresses a node of this trie.
    fn is_node(&self, p: usize) -> bool;
}

/// Immutable LOUDS trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoudsTrie<B = SuccinctBitVector> {
    louds: B,
    edges: Vec<u8>,
    terminals: B,
    tails: SuccinctStringVector<B>,
    values: Vec<u32>,
}

/// Keys of `order[range]` share their first `depth` bytes.
struct Group {
    start: usize,
    end: usize,
    /// Compressed into a tail; never expanded.
    leaf: bool,
}

/// Most key bytes a single trie can hold.
///
/// A trie has at most one node per key byte, so its structural sequence stays
/// under `2 * key_bytes + 3` bits, and at most one stored key per key byte,
/// so the values field stays under `4 * key_bytes` bytes. Both then fit the
/// `u32` sizes of the wire format.
pub const MAX_KEY_BYTES: usize = (u32::MAX / 4) as usize;

const _: () = assert!(2 * MAX_KEY_BYTES + 3 <= u32::MAX as usize);

fn check_capacity(key_bytes: usize) -> Result<()> {
    if key_bytes > MAX_KEY_BYTES {
        return Err(Error::InvalidOffsets(format!(
            "{key_bytes} key bytes exceed the {MAX_KEY_BYTES}-byte trie capacity"
        )));
    }
    Ok(())
}

impl<B: RankSelect> LoudsTrie<B> {
    /// Build from a list of keys; key `i` gets value `i`.
    pub fn from_keys<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut buffer = Vec::new();
        let mut offsets = vec![0u32];
        for key in keys {
            buffer.extend_from_slice(key.as_ref());
            let end = u32::try_from(buffer.len()).map_err(|_| {
                Error::InvalidOffsets("key buffer exceeds the u32 offset range".to_string())
            })?;
            offsets.push(end);
        }
        Self::from_buffer_offsets(&buffer, &offsets)
    }

    /// Build from a shared buffer where key `i` is `buffer[offsets[i]..offsets[i + 1]]`.
    ///
    /// Empty keys cannot be stored (the root is never terminal) and are skipped.
    pub fn from_buffer_offsets(buffer: &[u8], offsets: &[u32]) -> Result<Self> {
        check_offsets(offsets, buffer.len())?;
        let n = offsets.len() - 1;
        check_capacity(offsets[n] as usize - offsets[0] as usize)?;
        let n32 = u32::try_from(n)
            .map_err(|_| Error::InvalidOffsets(format!("{n} keys exceed the u32 value range")))?;
        let key = |i: u32| &buffer[offsets[i as usize] as usize..offsets[i as usize + 1] as usize];

        let mut order: Vec<u32> = (0..n32).filter(|&i| !key(i).is_empty()).collect();
        order.sort_by(|&a, &b| key(a).cmp(key(b)));

        let mut louds = BitBuilder::with_capacity(2 * order.len() + 2);
        let mut edges = Vec::new();
        let mut terminals = BitBuilder::new();
        let mut tails: Vec<&[u8]> = Vec::new();
        let mut values = Vec::new();

        louds.push(true);
        louds.push(false);

        let mut frontier = vec![Group {
            start: 0,
            end: order.len(),
            leaf: false,
        }];
        let mut depth = 0;
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for group in &frontier {
                if !group.leaf {
                    let mut i = group.start;
                    // Keys ending here were recorded when this node was emitted.
                    while i < group.end && key(order[i]).len() == depth {
                        i += 1;
                    }
                    while i < group.end {
                        let label = key(order[i])[depth];
                        let start = i;
                        while i < group.end && key(order[i])[depth] == label {
                            i += 1;
                        }
                        louds.push(true);
                        edges.push(label);

                        let first = order[start];
                        let first_key = key(first);
                        let leaf = i - start == 1;
                        if leaf {
                            terminals.push(true);
                            values.push(first);
                            tails.push(&first_key[depth + 1..]);
                        } else if first_key.len() == depth + 1 {
                            // Sorted first, so the lowest-index duplicate wins.
                            terminals.push(true);
                            values.push(first);
                            tails.push(&[]);
                        } else {
                            terminals.push(false);
                        }
                        next.push(Group {
                            start,
                            end: i,
                            leaf,
                        });
                    }
                }
                louds.push(false);
            }
            frontier = next;
            depth += 1;
        }

        debug!(
            keys = n,
            stored = order.len(),
            levels = depth,
            louds_bits = louds.len(),
            nodes = edges.len(),
            terminals = values.len(),
            "built LOUDS trie"
        );

        Ok(Self {
            louds: louds.finish(),
            edges,
            terminals: terminals.finish(),
            tails: SuccinctStringVector::from_strs(tails),
            values,
        })
    }

    /// The structural LOUDS bit sequence.
    pub fn louds(&self) -> &B {
        &self.louds
    }

    /// Edge bytes in structural order.
    pub fn edges(&self) -> &[u8] {
        &self.edges
    }

    /// Terminal bitmap indexed by label index.
    pub fn terminals(&self) -> &B {
        &self.terminals
    }

    /// Tails in terminal-ordinal order.
    pub fn tails(&self) -> &SuccinctStringVector<B> {
        &self.tails
    }

    /// Original key index per terminal ordinal.
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Number of nodes, not counting the root.
    pub fn num_nodes(&self) -> usize {
        self.edges.len()
    }

    /// Number of stored (distinct, non-empty) keys.
    pub fn num_keys(&self) -> usize {
        self.values.len()
    }
}

impl<B: RankSelect> TrieNav for LoudsTrie<B> {
    fn first_child(&self, p: usize) -> Option<usize> {
        let c = self.louds.select0(self.louds.rank1(p) + 1);
        (c < self.louds.len() && self.louds.access(c)).then_some(c)
    }

    fn next_sibling(&self, p: usize) -> Option<usize> {
        let s = p + 1;
        (s < self.louds.len() && self.louds.access(s)).then_some(s)
    }

    fn parent(&self, p: usize) -> Option<usize> {
        if p == self.root() {
            return None;
        }
        // The group holding p belongs to the rank0(p)-th node.
        self.louds
            .try_select1(self.louds.rank0(p))
            .ok()
            .map(|after| after - 1)
    }

    fn edge(&self, p: usize) -> u8 {
        assert!(p != self.root(), "the root has no incoming edge");
        assert!(self.is_node(p), "edge({p}): not a node");
        self.edges[self.louds.rank1(p) - 1]
    }

    fn terminal(&self, p: usize) -> Option<Terminal<'_>> {
        assert!(self.is_node(p), "terminal({p}): not a node");
        if p == self.root() {
            return None;
        }
        let li = self.louds.rank1(p) - 1;
        if !self.terminals.access(li) {
            return None;
        }
        let ordinal = self.terminals.rank1(li);
        Some(Terminal {
            value: self.values[ordinal],
            tail: self.tails.at(ordinal),
        })
    }

    fn is_node(&self, p: usize) -> bool {
        p < self.louds.len() && self.louds.access(p)
    }
}

impl<B: RankSelect> Blob for LoudsTrie<B> {
    /// louds blob + field(edges) + terminals blob + tails blob + field(values as u32).
    fn dump_into(&self, out: &mut Vec<u8>) {
        self.louds.dump_into(out);
        put_field(out, &self.edges);
        self.terminals.dump_into(out);
        self.tails.dump_into(out);
        put_u32_field(out, &self.values);
    }

    fn load(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (louds, off) = B::load(bytes, offset)?;
        let mut r = Reader::new(bytes, off);
        let edges = r.field()?.to_vec();
        let (terminals, off) = B::load(bytes, r.offset())?;
        let (tails, off) = SuccinctStringVector::<B>::load(bytes, off)?;
        let mut r = Reader::new(bytes, off);
        let values = r.u32_field()?;

        let bad = |msg: String| Err(Error::InvalidEncoding(msg));
        if louds.len() < 3 || !louds.access(0) || louds.access(1) {
            return bad("LOUDS sequence lacks the super-root header".to_string());
        }
        if louds.count_zeros() != louds.count_ones() + 1 {
            return bad(format!(
                "LOUDS sequence has {} ones but {} zeros",
                louds.count_ones(),
                louds.count_zeros()
            ));
        }
        // A node's group must start after the node itself, or navigation cycles.
        let (mut ones, mut zeros) = (1, 1);
        for p in 2..louds.len() {
            if louds.access(p) {
                if zeros > ones {
                    return bad(format!("LOUDS node at bit {p} precedes its parent"));
                }
                ones += 1;
            } else {
                zeros += 1;
            }
        }
        if edges.len() != louds.count_ones() - 1 || terminals.len() != edges.len() {
            return bad(format!(
                "{} nodes with {} edges and {} terminal bits",
                louds.count_ones() - 1,
                edges.len(),
                terminals.len()
            ));
        }
        if values.len() != terminals.count_ones() || tails.len() != values.len() {
            return bad(format!(
                "{} terminals with {} values and {} tails",
                terminals.count_ones(),
                values.len(),
                tails.len()
            ));
        }

        Ok((
            Self {
                louds,
                edges,
                terminals,
                tails,
                values,
            },
            r.offset(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naive::NaiveBitVector;

    fn build<B: RankSelect>(keys: &[&str], via_buffer: bool, via_dump: bool) -> LoudsTrie<B> {
        let trie = if via_buffer {
            let mut offsets = vec![0u32];
            for k in keys {
                offsets.push(offsets.last().unwrap() + k.len() as u32);
            }
            LoudsTrie::from_buffer_offsets(keys.concat().as_bytes(), &offsets).unwrap()
        } else {
            LoudsTrie::from_keys(keys).unwrap()
        };
        if via_dump {
            LoudsTrie::from_bytes(&trie.to_bytes()).unwrap()
        } else {
            trie
        }
    }

    /// Every backend / construction path / dump combination of one key set.
    fn variants(keys: &[&str]) -> Vec<Box<dyn TrieCheck>> {
        let mut out: Vec<Box<dyn TrieCheck>> = Vec::new();
        for via_buffer in [false, true] {
            for via_dump in [false, true] {
                out.push(Box::new(build::<SuccinctBitVector>(keys, via_buffer, via_dump)));
                out.push(Box::new(build::<NaiveBitVector>(keys, via_buffer, via_dump)));
            }
        }
        out
    }

    /// Backend-erased view for the shared scenario checks.
    trait TrieCheck: TrieNav {
        fn louds_bytes(&self) -> &[u8];
        fn terminal_bytes(&self) -> &[u8];
        fn edge_bytes(&self) -> &[u8];
        fn tail_bytes(&self) -> &[u8];
        fn value_list(&self) -> &[u32];
    }

    impl<B: RankSelect> TrieCheck for LoudsTrie<B> {
        fn louds_bytes(&self) -> &[u8] {
            self.louds.as_bytes()
        }
        fn terminal_bytes(&self) -> &[u8] {
            self.terminals.as_bytes()
        }
        fn edge_bytes(&self) -> &[u8] {
            &self.edges
        }
        fn tail_bytes(&self) -> &[u8] {
            self.tails.data()
        }
        fn value_list(&self) -> &[u32] {
            &self.values
        }
    }

    #[test]
    fn layout_of_small_vocabulary() {
        for trie in variants(&["an", "i", "of", "one", "out", "our"]) {
            assert_eq!(trie.edge_bytes(), b"aiofnurt");
            assert_eq!(trie.tail_bytes(), b"ne");
            assert_eq!(trie.louds_bytes(), &[0b0001_1101, 0b1100_0111, 0b0000_0000]);
            assert_eq!(trie.terminal_bytes(), &[0b1101_1011]);
            assert_eq!(trie.value_list(), &[0, 1, 2, 3, 5, 4]);

            let root = trie.root();
            let first = trie.first_child(root).unwrap();
            assert_eq!(trie.parent(first), Some(root));
            assert_eq!(trie.edge(first), b'a');
            let term = trie.terminal(first).unwrap();
            assert_eq!(term.value, 0);
            assert_eq!(term.tail, b"n");
            assert_eq!(trie.first_child(first), None);

            let second = trie.next_sibling(first).unwrap();
            assert_eq!(trie.edge(second), b'i');
            assert_eq!(trie.parent(second), Some(root));

            let o = trie.next_sibling(second).unwrap();
            assert_eq!(trie.terminal(o), None);
            assert_eq!(trie.next_sibling(o), None);
            let u = trie.next_sibling(trie.next_sibling(trie.first_child(o).unwrap()).unwrap()).unwrap();
            assert_eq!(trie.edge(u), b'u');
            assert_eq!(trie.parent(u), Some(o));
            let r = trie.first_child(u).unwrap();
            assert_eq!(trie.edge(r), b'r');
            assert_eq!(trie.parent(r), Some(u));
            assert_eq!(trie.terminal(r).unwrap().value, 5);
        }
    }

    #[test]
    fn prefix_key_terminates_inner_node() {
        for trie in variants(&["an", "ans"]) {
            let a = trie.first_child(trie.root()).unwrap();
            assert_eq!(trie.edge(a), b'a');
            assert_eq!(trie.next_sibling(a), None);
            assert_eq!(trie.terminal(a), None);

            let an = trie.first_child(a).unwrap();
            assert_eq!(trie.parent(an), Some(a));
            assert_eq!(trie.edge(an), b'n');
            assert_eq!(trie.terminal(an).unwrap().tail, b"");
            assert_eq!(trie.next_sibling(an), None);

            let ans = trie.first_child(an).unwrap();
            assert_eq!(trie.parent(ans), Some(an));
            assert_eq!(trie.edge(ans), b's');
            assert_eq!(trie.first_child(ans), None);
            assert_eq!(trie.terminal(ans).unwrap().tail, b"");
        }
    }

    #[test]
    fn unbranching_suffix_becomes_tail() {
        for trie in variants(&["an", "answer"]) {
            let a = trie.first_child(trie.root()).unwrap();
            let an = trie.first_child(a).unwrap();
            assert_eq!(trie.terminal(an).unwrap().tail, b"");
            let ans = trie.first_child(an).unwrap();
            assert_eq!(trie.edge(ans), b's');
            assert_eq!(trie.first_child(ans), None);
            let term = trie.terminal(ans).unwrap();
            assert_eq!(term.tail, b"wer");
            assert_eq!(term.value, 1);
        }
    }

    #[test]
    fn empty_and_duplicate_keys() {
        let trie: LoudsTrie = LoudsTrie::from_keys(Vec::<&str>::new()).unwrap();
        assert_eq!(trie.first_child(trie.root()), None);
        assert_eq!(trie.num_nodes(), 0);

        let trie: LoudsTrie = LoudsTrie::from_keys(["", "an", "an"]).unwrap();
        assert_eq!(trie.num_keys(), 1);
        let a = trie.first_child(trie.root()).unwrap();
        let n = trie.first_child(a).unwrap();
        assert_eq!(trie.terminal(n).unwrap().value, 1);
        assert_eq!(trie.first_child(n), None);
    }

    #[test]
    fn rejects_bad_offsets_before_building() {
        let err = LoudsTrie::<SuccinctBitVector>::from_buffer_offsets(b"anione", &[0, 2, 1, 6]);
        assert!(matches!(err, Err(Error::InvalidOffsets(_))));
        let err = LoudsTrie::<SuccinctBitVector>::from_buffer_offsets(b"an", &[0, 2, 9]);
        assert!(matches!(err, Err(Error::InvalidOffsets(_))));
    }

    #[test]
    fn load_rejects_inconsistent_parts() {
        let trie: LoudsTrie = LoudsTrie::from_keys(["an", "i", "of"]).unwrap();
        let bytes = trie.to_bytes();
        assert!(LoudsTrie::<SuccinctBitVector>::from_bytes(&bytes[..bytes.len() - 1]).is_err());

        // Same parts, but one value dropped.
        let mut broken = trie.clone();
        broken.values.pop();
        assert!(matches!(
            LoudsTrie::<SuccinctBitVector>::from_bytes(&broken.to_bytes()),
            Err(Error::InvalidEncoding(_))
        ));

        // One edge too many.
        let mut broken = trie;
        broken.edges.push(b'x');
        assert!(LoudsTrie::<SuccinctBitVector>::from_bytes(&broken.to_bytes()).is_err());
    }

    #[test]
    fn capacity_bounds_wire_sizes() {
        assert!(check_capacity(0).is_ok());
        assert!(check_capacity(MAX_KEY_BYTES).is_ok());
        assert!(matches!(
            check_capacity(MAX_KEY_BYTES + 1),
            Err(Error::InvalidOffsets(_))
        ));
    }

    #[test]
    #[should_panic(expected = "not a node")]
    fn edge_rejects_non_node() {
        let trie: LoudsTrie = LoudsTrie::from_keys(["an", "i"]).unwrap();
        // Bit 1 is the super-root's closing zero.
        trie.edge(1);
    }

    #[test]
    #[should_panic(expected = "not a node")]
    fn terminal_rejects_non_node() {
        let trie: LoudsTrie = LoudsTrie::from_keys(["an", "i"]).unwrap();
        trie.terminal(1);
    }

    #[test]
    fn load_rejects_child_before_parent() {
        let mut broken: LoudsTrie = LoudsTrie::from_keys(["a"]).unwrap();
        assert_eq!(broken.louds.len(), 5);
        broken.louds = [true, false, false, true, false]
            .into_iter()
            .collect::<BitBuilder>()
            .finish();
        assert!(matches!(
            LoudsTrie::<SuccinctBitVector>::from_bytes(&broken.to_bytes()),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn load_returns_offset_past_trie() {
        let trie: LoudsTrie = LoudsTrie::from_keys(["she", "sells"]).unwrap();
        let mut bytes = vec![9, 9];
        trie.dump_into(&mut bytes);
        let end = bytes.len();
        bytes.extend_from_slice(&[1, 2, 3]);
        let (back, off) = LoudsTrie::<SuccinctBitVector>::load(&bytes, 2).unwrap();
        assert_eq!(off, end);
        assert_eq!(back, trie);
    }
}
