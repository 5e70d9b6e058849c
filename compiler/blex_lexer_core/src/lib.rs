//! Rune-level scanner for BibTeX-style bibliography sources.
//!
//! This crate owns the bytes of one source and exposes a cursor that decodes
//! them one UTF-8 code point at a time, tracking the byte range of every
//! decoded rune. It knows nothing about tokens; the state-machine lexer in
//! `blex_lexer` drives it.
//!
//! # Layout
//!
//! - [`SourceBuffer`]: owns the source bytes. Construction (`from_reader`,
//!   `from_vec`, `try_from`) is the only fallible step in the whole pipeline.
//! - [`Scanner`]: cursor over a borrowed [`SourceBuffer`]. Supports
//!   repositioning to any previously observed [`Position`].
//! - [`ScannerToken`]: a [`Position`] paired with a borrow of the buffer for
//!   zero-copy slicing.
//! - [`Span`]: compact byte range used by the lexer for diagnostics.

mod scanner;
mod source_buffer;
mod span;

pub use scanner::{Position, Scanner, ScannerToken};
pub use source_buffer::{LineCol, SourceBuffer, SourceError};
pub use span::Span;
