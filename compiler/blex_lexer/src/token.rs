//! Token vocabulary handed to the downstream parser.

use std::borrow::Cow;
use std::fmt;

use blex_lexer_core::Span;

/// Kind of a lexical token.
///
/// The set is closed: two control kinds, ten single-character punctuation
/// kinds and three literal kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    // === Control ===
    Err = 0,
    Eof = 1,

    // === Punctuation ===
    /// `@`
    At = 2,
    /// `%`
    Perc = 3,
    /// `{`
    LBrace = 4,
    /// `}`
    RBrace = 5,
    /// `(`
    LParen = 6,
    /// `)`
    RParen = 7,
    /// `=`
    Equals = 8,
    /// `,`
    Comma = 9,
    /// `#`
    Hash = 10,
    /// `"`
    Quote = 11,

    // === Literals ===
    Ident = 12,
    String = 13,
    Number = 14,
}

impl TokenKind {
    /// Upper-case name used in diagnostics and token dumps.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Err => "ERR",
            Self::Eof => "EOF",
            Self::At => "AT",
            Self::Perc => "PERC",
            Self::LBrace => "LBRACE",
            Self::RBrace => "RBRACE",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::Equals => "EQUALS",
            Self::Comma => "COMMA",
            Self::Hash => "HASH",
            Self::Quote => "QUOTE",
            Self::Ident => "IDENT",
            Self::String => "STRING",
            Self::Number => "NUMBER",
        }
    }

    /// Fixed source text of punctuation kinds; `None` for the rest.
    pub const fn lexeme(self) -> Option<&'static str> {
        match self {
            Self::At => Some("@"),
            Self::Perc => Some("%"),
            Self::LBrace => Some("{"),
            Self::RBrace => Some("}"),
            Self::LParen => Some("("),
            Self::RParen => Some(")"),
            Self::Equals => Some("="),
            Self::Comma => Some(","),
            Self::Hash => Some("#"),
            Self::Quote => Some("\""),
            Self::Err | Self::Eof | Self::Ident | Self::String | Self::Number => None,
        }
    }

    /// Punctuation kind spelled by `c`.
    pub const fn from_punct(c: char) -> Option<Self> {
        match c {
            '@' => Some(Self::At),
            '%' => Some(Self::Perc),
            '{' => Some(Self::LBrace),
            '}' => Some(Self::RBrace),
            '(' => Some(Self::LParen),
            ')' => Some(Self::RParen),
            '=' => Some(Self::Equals),
            ',' => Some(Self::Comma),
            '#' => Some(Self::Hash),
            '"' => Some(Self::Quote),
            _ => None,
        }
    }

    /// Returns `true` for kinds whose token carries text.
    pub const fn has_value(self) -> bool {
        matches!(
            self,
            Self::Err | Self::Ident | Self::String | Self::Number
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified run of source text.
///
/// `value` borrows from the source buffer whenever the covered bytes are
/// valid UTF-8, which is always the case except for `ERR` tokens reporting
/// a malformed sequence (those hold the lossy decoding).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub value: Cow<'a, str>,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, value: impl Into<Cow<'a, str>>, span: Span) -> Self {
        Self {
            kind,
            value: value.into(),
            span,
        }
    }

    /// Token with no value (punctuation, `EOF`).
    pub fn bare(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            value: Cow::Borrowed(""),
            span,
        }
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::Err
    }

    /// Detach the token from the source buffer.
    pub fn into_owned(self) -> Token<'static> {
        Token {
            kind: self.kind,
            value: Cow::Owned(self.value.into_owned()),
            span: self.span,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.has_value() {
            write!(f, "{}({:?})", self.kind, self.value)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}
