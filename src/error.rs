//! Error types for the dictionary and its succinct building blocks.

use thiserror::Error;

/// Error variants for dictionary construction, decoding and paging.
#[derive(Debug, Error)]
pub enum Error {
    /// An index was provided that is out of the structure's bounds.
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// A selection query was performed for a rank that does not exist.
    #[error("invalid selection: rank {0} not found")]
    InvalidSelection(usize),

    /// Serialized input is truncated, has trailing bytes, or is inconsistent.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// A key offset table is not usable for building.
    #[error("invalid offsets: {0}")]
    InvalidOffsets(String),

    /// A key is not valid UTF-8 or does not start on a char boundary.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A paging cursor does not belong to this dictionary.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// An I/O error occurred during serialization or deserialization.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for dictionary operations.
pub type Result<T> = std::result::Result<T, Error>;
