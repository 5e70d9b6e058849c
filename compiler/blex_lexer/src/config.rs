//! Lexer configuration.

/// Configuration for the lexer.
///
/// Every field has a default matching plain BibTeX usage, so
/// `LexerConfig::default()` is the right choice for most callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LexerConfig {
    /// Emit a `PERC` token for each `%` line comment.
    ///
    /// The comment body is always discarded. With this off the marker is
    /// discarded too.
    pub emit_comment_marker: bool,

    /// Lex `@string`, `@preamble` and `@comment` with their keyless bodies.
    ///
    /// With this off they lex like any other entry and usually produce an
    /// `ERR` token, since none of them has a citation key.
    pub special_entries: bool,

    /// Maximum number of structured errors kept by the lexer (0 = unlimited).
    ///
    /// `ERR` tokens are emitted regardless.
    pub error_limit: usize,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            emit_comment_marker: true,
            special_entries: true,
            error_limit: 0,
        }
    }
}

impl LexerConfig {
    /// Config that treats every entry type alike and suppresses comment
    /// markers.
    pub fn minimal() -> Self {
        Self {
            emit_comment_marker: false,
            special_entries: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_comment_marker(self, emit_comment_marker: bool) -> Self {
        Self {
            emit_comment_marker,
            ..self
        }
    }

    #[must_use]
    pub fn with_special_entries(self, special_entries: bool) -> Self {
        Self {
            special_entries,
            ..self
        }
    }

    #[must_use]
    pub fn with_error_limit(self, error_limit: usize) -> Self {
        Self {
            error_limit,
            ..self
        }
    }

    /// Check whether one more error may be recorded after `recorded`.
    #[inline]
    pub fn keeps_error(&self, recorded: usize) -> bool {
        self.error_limit == 0 || recorded < self.error_limit
    }
}
