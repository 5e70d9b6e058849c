//! State-machine lexer for BibTeX-style bibliographies.
//!
//! Runs over the rune scanner from `blex_lexer_core` and produces
//! [`Token`]s for a downstream parser. Tokenization is context-sensitive:
//! `{` opens an entry body after an entry type but an opaque, brace-nested
//! string after `=`, so the lexer tracks a [`LexState`] rather than matching
//! tokens in isolation.
//!
//! Lexical errors never abort the stream. Each one becomes an `ERR` token
//! plus a [`LexError`], and the lexer skips ahead to the next `@`.
//!
//! ```
//! use blex_lexer::{lex, LexerConfig, TokenKind};
//! use blex_lexer_core::SourceBuffer;
//!
//! let source = SourceBuffer::try_from("@ARTICLE(k, year = 1997)")?;
//! let output = lex(&source, LexerConfig::default());
//! assert!(output.errors.is_empty());
//! assert_eq!(output.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
//! # Ok::<(), blex_lexer_core::SourceError>(())
//! ```

mod config;
mod lex_error;
mod lexer;
mod state;
mod token;

use blex_lexer_core::SourceBuffer;
use tracing::debug;

pub use config::LexerConfig;
pub use lex_error::{LexError, LexErrorKind};
pub use lexer::Lexer;
pub use state::{Delimiter, EntryKind, LexState};
pub use token::{Token, TokenKind};

/// Everything produced by lexing one source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LexOutput<'a> {
    /// Tokens in source order, ending with exactly one `EOF`.
    pub tokens: Vec<Token<'a>>,
    /// Errors matching the `ERR` tokens, subject to
    /// [`LexerConfig::error_limit`].
    pub errors: Vec<LexError>,
}

impl LexOutput<'_> {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Token kinds only, for quick comparisons.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }
}

/// Lex a whole source in one go.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn lex(source: &SourceBuffer, config: LexerConfig) -> LexOutput<'_> {
    let mut lexer = Lexer::with_config(source.scanner(), config);
    let tokens: Vec<_> = lexer.by_ref().collect();
    let errors = lexer.into_errors();
    debug!(
        tokens = tokens.len(),
        errors = errors.len(),
        "lexing complete"
    );
    LexOutput { tokens, errors }
}
