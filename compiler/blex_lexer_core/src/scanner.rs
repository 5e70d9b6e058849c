//! Rune cursor over a [`SourceBuffer`].
//!
//! The scanner decodes one UTF-8 code point per [`advance()`](Scanner::advance)
//! and records where it came from as a [`Position`]. It never fails loudly:
//! running off the end of the buffer and hitting a malformed sequence both
//! surface as `false`, with the cursor left where it was so the caller can
//! look at the offending bytes itself.
//!
//! Positions are plain `Copy` values. Saving one and handing it back to
//! [`reposition()`](Scanner::reposition) is how the lexer looks ahead and
//! backtracks without rescanning from the start.

use std::fmt;

use crate::{SourceBuffer, Span};

/// A decoded rune and the byte range it was decoded from.
///
/// For every position produced by a successful [`Scanner::advance()`],
/// `end - start == rune.len_utf8()`. Boundary positions (the zero position
/// and the targets of the `skip_*` methods) carry `'\0'` with `start == end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub rune: char,
    pub start: u32,
    pub end: u32,
}

impl Position {
    /// The position of a freshly created or reset scanner.
    pub const ZERO: Position = Position::boundary(0);

    /// An empty position sitting just before `offset`.
    ///
    /// The next [`Scanner::advance()`] from here decodes the rune starting at
    /// `offset`.
    #[inline]
    pub const fn boundary(offset: u32) -> Self {
        Position {
            rune: '\0',
            start: offset,
            end: offset,
        }
    }

    /// Byte range of the rune.
    #[inline]
    pub const fn span(self) -> Span {
        Span::new(self.start, self.end)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}:{}]", self.rune, self.start, self.end)
    }
}

/// A [`Position`] together with the buffer it indexes into.
///
/// The buffer is borrowed, never owned: the [`SourceBuffer`] the scanner was
/// created from outlives every token.
#[derive(Clone, Copy, Debug)]
pub struct ScannerToken<'a> {
    pub position: Position,
    buf: &'a [u8],
}

impl<'a> ScannerToken<'a> {
    #[inline]
    pub fn rune(&self) -> char {
        self.position.rune
    }

    #[inline]
    pub fn start(&self) -> u32 {
        self.position.start
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.position.end
    }

    /// The encoded bytes of the rune.
    pub fn bytes(&self) -> &'a [u8] {
        &self.buf[self.position.start as usize..self.position.end as usize]
    }

    /// The whole buffer the token was scanned from.
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }
}

impl fmt::Display for ScannerToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.position, f)
    }
}

/// Returns the number of bytes in the UTF-8 character starting with `byte`.
///
/// - `0xC0..=0xDF`: 2 bytes
/// - `0xE0..=0xEF`: 3 bytes
/// - `0xF0..=0xF7`: 4 bytes
/// - Everything else (ASCII, continuation, invalid): 1 byte
#[inline]
fn utf8_char_width(byte: u8) -> u32 {
    match byte {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// Stateful rune cursor. Not meant to be shared between threads while
/// scanning; every mutating method takes `&mut self`.
#[derive(Clone, Debug)]
pub struct Scanner<'a> {
    buf: &'a [u8],
    pos: Position,
}

impl<'a> Scanner<'a> {
    /// Create a scanner at the zero position of `source`.
    pub fn new(source: &'a SourceBuffer) -> Self {
        Self {
            buf: source.as_bytes(),
            pos: Position::ZERO,
        }
    }

    /// Decode the next rune and move the cursor onto it.
    ///
    /// Returns `false` without moving when the buffer is exhausted or the
    /// bytes at the cursor are not valid UTF-8.
    #[inline]
    pub fn advance(&mut self) -> bool {
        match self.decode_at(self.pos.end) {
            Some(next) => {
                self.pos = next;
                true
            }
            None => false,
        }
    }

    /// Decode the next rune without moving the cursor.
    #[inline]
    pub fn peek(&self) -> Option<Position> {
        self.decode_at(self.pos.end)
    }

    /// The current position paired with the buffer.
    pub fn current(&self) -> ScannerToken<'a> {
        ScannerToken {
            position: self.pos,
            buf: self.buf,
        }
    }

    /// The current position.
    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Move the cursor to a previously observed position.
    pub fn reposition(&mut self, target: Position) {
        debug_assert!(
            target.end as usize <= self.buf.len(),
            "reposition target {target} is past the end of a {} byte buffer",
            self.buf.len()
        );
        self.pos = target;
    }

    /// Move the cursor back to the zero position.
    pub fn reset(&mut self) {
        self.pos = Position::ZERO;
    }

    /// Byte offset where the next rune will be decoded.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.pos.end
    }

    /// Length of the scanned buffer in bytes.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "SourceBuffer guarantees the length fits in u32"
    )]
    #[inline]
    pub fn source_len(&self) -> u32 {
        self.buf.len() as u32
    }

    /// Returns `true` once every byte has been consumed.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos.end as usize >= self.buf.len()
    }

    /// Bytes from the cursor to the end of the buffer.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos.end as usize..]
    }

    /// Raw bytes in `start..end`.
    pub fn slice(&self, start: u32, end: u32) -> &'a [u8] {
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        &self.buf[start as usize..end as usize]
    }

    /// Advance to just before the next occurrence of the ASCII `byte`, or to
    /// the end of the buffer. Returns `true` if the byte was found.
    ///
    /// An ASCII byte never occurs inside a multi-byte sequence, so the cursor
    /// always lands on a rune boundary.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offsets are bounded by the buffer length, which fits in u32"
    )]
    pub fn skip_to_byte(&mut self, byte: u8) -> bool {
        debug_assert!(byte.is_ascii(), "skip target must be ASCII");
        match memchr::memchr(byte, self.remaining()) {
            Some(found) => {
                self.pos = Position::boundary(self.pos.end + found as u32);
                true
            }
            None => {
                self.pos = Position::boundary(self.source_len());
                false
            }
        }
    }

    /// Advance to just before the next `\n`, or to the end of the buffer.
    pub fn skip_to_newline(&mut self) {
        self.skip_to_byte(b'\n');
    }

    /// Step over a malformed UTF-8 sequence at the cursor.
    ///
    /// Returns the span of the bytes skipped. When the cursor is not sitting
    /// on a malformed sequence the span is empty and nothing moves.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "an invalid sequence is at most 4 bytes"
    )]
    pub fn skip_invalid(&mut self) -> Span {
        let start = self.pos.end;
        let rest = self.remaining();
        let window = &rest[..rest.len().min(4)];
        let len = match std::str::from_utf8(window) {
            Err(err) if err.valid_up_to() == 0 => err.error_len().unwrap_or(window.len()),
            _ => 0,
        };
        let end = start + len as u32;
        if len > 0 {
            self.pos = Position::boundary(end);
        }
        Span::new(start, end)
    }

    fn decode_at(&self, offset: u32) -> Option<Position> {
        let at = offset as usize;
        let &lead = self.buf.get(at)?;
        if lead.is_ascii() {
            return Some(Position {
                rune: char::from(lead),
                start: offset,
                end: offset + 1,
            });
        }
        let width = utf8_char_width(lead);
        if width == 1 {
            // Stray continuation byte or a lead byte no valid sequence uses.
            return None;
        }
        let bytes = self.buf.get(at..at + width as usize)?;
        let rune = std::str::from_utf8(bytes).ok()?.chars().next()?;
        Some(Position {
            rune,
            start: offset,
            end: offset + width,
        })
    }
}

#[cfg(test)]
mod tests;
