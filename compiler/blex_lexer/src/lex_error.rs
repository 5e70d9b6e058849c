//! Structured lexical errors.
//!
//! Every error the lexer hits mid-stream is reported twice: in-band as an
//! `ERR` token, and here as a [`LexError`] carrying the span, what went wrong,
//! the state the lexer was in, and an optional hint for fixing it.

use blex_lexer_core::Span;

use crate::LexState;

/// A lexical error with enough context for diagnostic rendering.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[error("{kind} at {span} while {context}")]
pub struct LexError {
    /// WHERE the error occurred.
    pub span: Span,
    /// WHAT went wrong.
    pub kind: LexErrorKind,
    /// WHY we were checking: the state being lexed.
    pub context: LexState,
    /// HOW to fix, when there is an obvious fix.
    pub help: Option<&'static str>,
}

/// What kind of lexical error occurred.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum LexErrorKind {
    /// Bytes that do not form a UTF-8 sequence.
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    /// A rune that does not fit the current state.
    #[error("unexpected `{found}`, expected {expected}")]
    UnexpectedChar { found: char, expected: &'static str },
    /// `)` closing a `{`-entry or `}` closing a `(`-entry.
    #[error("mismatched `{found}`, entry must be closed with `{expected}`")]
    MismatchedCloser { found: char, expected: char },
    /// Input ended inside a `"`-delimited value.
    #[error("unterminated quoted value")]
    UnterminatedString,
    /// Input ended before the braces of a value balanced out.
    #[error("unterminated braced value")]
    UnterminatedBrace,
    /// Input ended in the middle of an entry.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
}

impl LexError {
    /// Create an invalid UTF-8 error.
    #[cold]
    pub fn invalid_utf8(span: Span, context: LexState) -> Self {
        Self {
            span,
            kind: LexErrorKind::InvalidUtf8,
            context,
            help: Some("save the file as UTF-8"),
        }
    }

    /// Create an unexpected character error.
    #[cold]
    pub fn unexpected_char(
        span: Span,
        found: char,
        expected: &'static str,
        context: LexState,
    ) -> Self {
        Self {
            span,
            kind: LexErrorKind::UnexpectedChar { found, expected },
            context,
            help: None,
        }
    }

    /// Create a mismatched closer error.
    #[cold]
    pub fn mismatched_closer(span: Span, found: char, expected: char, context: LexState) -> Self {
        Self {
            span,
            kind: LexErrorKind::MismatchedCloser { found, expected },
            context,
            help: Some("entries opened with `{` close with `}`, and `(` with `)`"),
        }
    }

    /// Create an unterminated quoted value error. `span` covers the content
    /// after the opening quote.
    #[cold]
    pub fn unterminated_string(span: Span) -> Self {
        Self {
            span,
            kind: LexErrorKind::UnterminatedString,
            context: LexState::InsideQuoted,
            help: Some("add a closing `\"` outside any braces"),
        }
    }

    /// Create an unterminated braced value error. `span` covers the content
    /// after the opening brace.
    #[cold]
    pub fn unterminated_brace(span: Span, context: LexState) -> Self {
        Self {
            span,
            kind: LexErrorKind::UnterminatedBrace,
            context,
            help: Some("every `{` inside a value needs a matching `}`"),
        }
    }

    /// Create an unexpected end of input error.
    #[cold]
    pub fn unexpected_eof(offset: u32, expected: &'static str, context: LexState) -> Self {
        Self {
            span: Span::point(offset),
            kind: LexErrorKind::UnexpectedEof { expected },
            context,
            help: None,
        }
    }
}
