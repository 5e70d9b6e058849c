//! Owned source bytes.
//!
//! A [`SourceBuffer`] holds the entire input in memory. Every [`Scanner`]
//! and every token derived from one borrows from it, so the buffer always
//! outlives the tokens that slice into it.
//!
//! The bytes are *not* validated as UTF-8 on construction: invalid sequences
//! are reported one at a time by [`Scanner::advance()`] so the lexer can turn
//! each into an in-band error and keep going.

use std::io::Read;

use crate::Scanner;

/// Error raised while obtaining the source bytes.
///
/// This is the only fatal error in the pipeline. Once a [`SourceBuffer`]
/// exists, all further problems are reported in-band by the lexer.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The reader failed before the whole source was consumed.
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),
    /// The source does not fit the `u32` offsets used by positions and spans.
    #[error("source is {len} bytes, which exceeds the {max} byte limit", max = u32::MAX)]
    TooLarge { len: usize },
}

/// 1-based line and column of a byte offset.
///
/// Columns count code points, not bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

/// The complete bytes of one source, read once up front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    buf: Vec<u8>,
}

impl SourceBuffer {
    /// Copy `bytes` into a new buffer.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is longer than `u32::MAX`. Input of unknown size
    /// goes through [`from_reader()`](Self::from_reader) or `try_from`.
    pub fn new(bytes: &[u8]) -> Self {
        assert!(fits(bytes.len()).is_ok(), "source exceeds {} bytes", u32::MAX);
        Self {
            buf: bytes.to_vec(),
        }
    }

    /// Read `reader` to the end and take ownership of its bytes.
    ///
    /// Fails if the reader errors out part-way or yields more than
    /// `u32::MAX` bytes. No partial buffer is ever returned.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, SourceError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::from_vec(buf)
    }

    /// Take ownership of already-loaded bytes.
    pub fn from_vec(buf: Vec<u8>) -> Result<Self, SourceError> {
        fits(buf.len())?;
        Ok(Self { buf })
    }

    /// Create a [`Scanner`] positioned at the start of the buffer.
    pub fn scanner(&self) -> Scanner<'_> {
        Scanner::new(self)
    }

    /// The source bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Length of the source in bytes.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "length is checked against u32::MAX on construction"
    )]
    pub fn len(&self) -> u32 {
        self.buf.len() as u32
    }

    /// Returns `true` if the source is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Line and column of `offset`, for rendering diagnostics.
    ///
    /// Offsets past the end are clamped to the end of the buffer.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "counts are bounded by the buffer length, which fits in u32"
    )]
    pub fn line_col(&self, offset: u32) -> LineCol {
        let end = (offset as usize).min(self.buf.len());
        let prefix = &self.buf[..end];
        let line_start = memchr::memrchr(b'\n', prefix).map_or(0, |nl| nl + 1);
        let line = memchr::memchr_iter(b'\n', prefix).count() + 1;
        // Continuation bytes (0b10xx_xxxx) do not start a code point.
        let column = prefix[line_start..]
            .iter()
            .filter(|&&b| b & 0xC0 != 0x80)
            .count()
            + 1;
        LineCol {
            line: line as u32,
            column: column as u32,
        }
    }
}

impl TryFrom<&[u8]> for SourceBuffer {
    type Error = SourceError;

    fn try_from(bytes: &[u8]) -> Result<Self, SourceError> {
        fits(bytes.len())?;
        Ok(Self {
            buf: bytes.to_vec(),
        })
    }
}

impl TryFrom<&str> for SourceBuffer {
    type Error = SourceError;

    fn try_from(source: &str) -> Result<Self, SourceError> {
        Self::try_from(source.as_bytes())
    }
}

/// Positions and spans are `u32`, so every offset must fit in one.
fn fits(len: usize) -> Result<(), SourceError> {
    match u32::try_from(len) {
        Ok(_) => Ok(()),
        Err(_) => Err(SourceError::TooLarge { len }),
    }
}
