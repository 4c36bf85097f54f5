//! # Succinct String Dictionary
//!
//! *A static key set in a few bits per node, queried without decompression.*
//!
//! ## Intuition First
//!
//! A trie shares prefixes: "sell", "sells" and "seashore" all hang off the same
//! `s` and `e` nodes. The usual pointer-per-child trie pays 64 bits for every
//! edge, which dwarfs the one byte of label it stores.
//!
//! LOUDS (level-order unary degree sequence) writes the tree shape as a bit
//! string instead: visit nodes breadth-first and emit one `1` per child
//! followed by a `0`. With rank and select over that string, moving to a first
//! child, sibling or parent is a couple of constant-time queries. The shape
//! costs about two bits per node.
//!
//! ## The Problem
//!
//! - **Exact lookup**: map a key back to the index it had in the input list.
//! - **Prefix enumeration**: list keys under a prefix in sorted order, a page at
//!   a time, resuming later from a plain cursor value.
//! - **Space**: keep the whole thing a flat byte blob that loads by parsing.
//!
//! ## Layout
//!
//! ```text
//! rank_select   RankSelect trait, BitBuilder
//! bitvec        SuccinctBitVector: chunk/block rank index, O(1) rank
//! naive         linear-scan oracles: NaiveBitVector, NaiveStringVector
//! strvec        StringVector trait, SuccinctStringVector (offset-free)
//! louds         LoudsTrie build + TrieNav navigation
//! search        exact lookup and cursor-based paged enumeration
//! dict          Dictionary facade and file I/O
//! loader        newline-delimited key lists
//! codec         little-endian length-prefixed blob encoding
//! ```
//!
//! Every structure is generic over its bit vector (`B: RankSelect`), so the
//! naive backend can replay any scenario as a correctness oracle.
//!
//! ## Path Compression
//!
//! A prefix group holding a single key does not get a chain of one-child
//! nodes. Its node is marked terminal and the rest of the key is stored as a
//! *tail* string. Lookups that land on such a node compare the unmatched
//! remainder against the tail.
//!
//! ## What Could Go Wrong
//!
//! 1. **Static**: adding a key means rebuilding.
//! 2. **Byte edges**: keys are compared and split as UTF-8 bytes, so sort order
//!    is byte order, not collation order.
//! 3. **Select cost**: select is a binary search over the rank index, so
//!    `first_child` and `parent` are $O(\log n)$ where rank is $O(1)$.
//!
//! ## References
//!
//! - Jacobson, G. (1989). "Space-efficient Static Trees and Graphs."
//! - Delpratt, O., Rahman, N., & Raman, R. (2006). "Engineering the LOUDS
//!   Succinct Tree Representation."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitvec;
pub mod codec;
pub mod dict;
pub mod error;
pub mod loader;
pub mod louds;
pub mod naive;
pub mod rank_select;
pub mod search;
pub mod strvec;

pub use bitvec::SuccinctBitVector;
pub use codec::Blob;
pub use dict::{Dictionary, Hit, WordsPage};
pub use error::{Error, Result};
pub use loader::KeyBuffer;
pub use louds::{LoudsTrie, Terminal, TrieNav};
pub use naive::{NaiveBitVector, NaiveStringVector};
pub use rank_select::{BitBuilder, RankSelect};
pub use search::{Cursor, LengthFilter};
pub use strvec::{StringVector, SuccinctStringVector};
