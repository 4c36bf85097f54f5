//! Newline-delimited key lists, read into one shared buffer.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Keys packed back to back, addressed by an `n + 1` entry offset table.
///
/// Key `i` is `buffer[offsets[i]..offsets[i + 1]]`. The buffer is always
/// valid UTF-8 and every offset sits on a char boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuffer {
    /// Concatenated key bytes.
    pub buffer: Vec<u8>,
    /// Key boundaries, starting with 0.
    pub offsets: Vec<u32>,
}

impl Default for KeyBuffer {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            offsets: vec![0],
        }
    }
}

impl KeyBuffer {
    /// Read one key per line. Line endings are stripped and empty lines skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut keys = Self::default();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            keys.push(&line)?;
        }
        debug!(keys = keys.len(), bytes = keys.buffer.len(), "read key list");
        Ok(keys)
    }

    /// Read the key list stored at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Append one key.
    pub fn push(&mut self, key: &str) -> Result<()> {
        self.buffer.extend_from_slice(key.as_bytes());
        let end = u32::try_from(self.buffer.len()).map_err(|_| {
            Error::InvalidOffsets(format!(
                "key buffer of {} bytes exceeds the u32 offset range",
                self.buffer.len()
            ))
        })?;
        self.offsets.push(end);
        Ok(())
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Return true if no keys were read.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate keys in input order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.offsets
            .windows(2)
            .map(|w| &self.buffer[w[0] as usize..w[1] as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn skips_empty_lines_and_line_endings() {
        let keys = KeyBuffer::from_reader(Cursor::new("an\r\n\ni\nof\r\n\n\none")).unwrap();
        assert_eq!(keys.len(), 4);
        assert_eq!(keys.buffer, b"aniofone");
        assert_eq!(keys.offsets, vec![0, 2, 3, 5, 8]);
        let collected: Vec<&[u8]> = keys.iter().collect();
        let expected: [&[u8]; 4] = [b"an", b"i", b"of", b"one"];
        assert_eq!(collected, expected);
    }

    #[test]
    fn empty_input() {
        let keys = KeyBuffer::from_reader(Cursor::new("\n\n")).unwrap();
        assert!(keys.is_empty());
        assert_eq!(keys.offsets, vec![0]);
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = KeyBuffer::from_reader(Cursor::new(&b"ok\n\xff\xfe\n"[..])).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, "sell\nsells\nçava\n".as_bytes()).unwrap();
        let keys = KeyBuffer::from_file(file.path()).unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys.iter().last(), Some("çava".as_bytes()));

        let missing = file.path().with_extension("missing");
        assert!(matches!(KeyBuffer::from_file(missing), Err(Error::Io(_))));
    }
}
