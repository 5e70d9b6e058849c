//! Byte ranges into a [`SourceBuffer`](crate::SourceBuffer).
//!
//! Every token and every lexical error points back at the source through a
//! [`Span`]. Offsets are `u32`, which is why a buffer refuses sources longer
//! than `u32::MAX` bytes.

use std::fmt;
use std::ops::Range;

/// Half-open range `start..end` of byte offsets.
///
/// A zero-width span marks a place rather than text: `EOF` and
/// end-of-input errors use one at the buffer length.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Zero-width span at `offset`.
    #[inline]
    pub const fn point(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    /// Number of bytes covered.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the byte at `offset` lies inside. A zero-width span contains
    /// nothing.
    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Smallest span covering both `self` and `other`, including any gap
    /// between them.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The same range as `usize` indices, for slicing the buffer.
    #[inline]
    pub fn to_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

// Debug matches Display so token dumps stay one line per token.
impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests;
