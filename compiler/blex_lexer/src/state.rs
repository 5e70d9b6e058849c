//! Lexical states and the per-entry bookkeeping the state machine carries.

use std::fmt;

use crate::TokenKind;

/// State of the lexer's finite-state machine.
///
/// Exactly one state is current at a time. [`EntrySearch`](Self::EntrySearch)
/// is initial and [`End`](Self::End) is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LexState {
    /// Between entries: skipping whitespace and `%` comments, looking for `@`.
    #[default]
    EntrySearch,
    /// After `@`: expecting the entry type.
    AfterAt,
    /// After the entry type: expecting `{` or `(`.
    EntryOpen,
    /// Expecting the citation key, or the closer of an empty entry.
    ExpectKey,
    /// After the citation key: expecting `,`.
    AfterKey,
    /// Expecting a field name or the entry closer.
    ExpectFieldName,
    /// After a field name: expecting `=`.
    AfterFieldName,
    /// Expecting one part of a field value.
    ExpectValue,
    /// Inside a `"`-delimited value.
    InsideQuoted,
    /// Inside a `{`-delimited value.
    InsideBraced,
    /// Inside the opaque body of a `@comment` entry.
    CommentBody,
    /// After a value part: expecting `#`, `,` or the entry closer.
    AfterValue,
    /// Discarding input up to the next `@`.
    Recover,
    /// Input exhausted; only `EOF` from here on.
    End,
}

impl LexState {
    /// Short human-readable description, used as error context.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::EntrySearch => "searching for an entry",
            Self::AfterAt => "reading an entry type",
            Self::EntryOpen => "opening an entry body",
            Self::ExpectKey => "reading a citation key",
            Self::AfterKey => "after a citation key",
            Self::ExpectFieldName => "reading a field name",
            Self::AfterFieldName => "after a field name",
            Self::ExpectValue => "reading a field value",
            Self::InsideQuoted => "inside a quoted value",
            Self::InsideBraced => "inside a braced value",
            Self::CommentBody => "inside a comment entry",
            Self::AfterValue => "after a field value",
            Self::Recover => "recovering from an error",
            Self::End => "at end of input",
        }
    }
}

impl fmt::Display for LexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Delimiter pair that opened the current entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Delimiter {
    #[default]
    Brace,
    Paren,
}

impl Delimiter {
    /// Delimiter opened by `c`, if any.
    pub const fn from_open(c: char) -> Option<Self> {
        match c {
            '{' => Some(Self::Brace),
            '(' => Some(Self::Paren),
            _ => None,
        }
    }

    pub const fn open(self) -> char {
        match self {
            Self::Brace => '{',
            Self::Paren => '(',
        }
    }

    pub const fn close(self) -> char {
        match self {
            Self::Brace => '}',
            Self::Paren => ')',
        }
    }

    /// [`close()`](Self::close) as a byte, for scanning raw input.
    pub const fn close_byte(self) -> u8 {
        match self {
            Self::Brace => b'}',
            Self::Paren => b')',
        }
    }

    pub const fn open_kind(self) -> TokenKind {
        match self {
            Self::Brace => TokenKind::LBrace,
            Self::Paren => TokenKind::LParen,
        }
    }

    pub const fn close_kind(self) -> TokenKind {
        match self {
            Self::Brace => TokenKind::RBrace,
            Self::Paren => TokenKind::RParen,
        }
    }
}

/// How the body of the current entry is laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// `key, field = value, ...`
    #[default]
    Regular,
    /// `@string`: `name = value` with no key.
    Macro,
    /// `@preamble`: a bare value.
    Preamble,
    /// `@comment`: one opaque run of text.
    Comment,
}

impl EntryKind {
    /// Classify an entry type. Matching is ASCII case-insensitive.
    pub fn classify(entry_type: &str) -> Self {
        if entry_type.eq_ignore_ascii_case("string") {
            Self::Macro
        } else if entry_type.eq_ignore_ascii_case("preamble") {
            Self::Preamble
        } else if entry_type.eq_ignore_ascii_case("comment") {
            Self::Comment
        } else {
            Self::Regular
        }
    }

    /// State that follows the entry opener.
    pub const fn body_state(self) -> LexState {
        match self {
            Self::Regular => LexState::ExpectKey,
            Self::Macro => LexState::ExpectFieldName,
            Self::Preamble => LexState::ExpectValue,
            Self::Comment => LexState::CommentBody,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_entry_search() {
        assert_eq!(LexState::default(), LexState::EntrySearch);
    }

    #[test]
    fn delimiters_pair_up() {
        for (open, close) in [('{', '}'), ('(', ')')] {
            let Some(delimiter) = Delimiter::from_open(open) else {
                panic!("`{open}` should open an entry");
            };
            assert_eq!(delimiter.open(), open);
            assert_eq!(delimiter.close(), close);
            assert_eq!(char::from(delimiter.close_byte()), close);
            assert_eq!(delimiter.open_kind().lexeme(), Some(open.to_string().as_str()));
            assert_eq!(
                delimiter.close_kind().lexeme(),
                Some(close.to_string().as_str())
            );
        }
        assert_eq!(Delimiter::from_open('['), None);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(EntryKind::classify("STRING"), EntryKind::Macro);
        assert_eq!(EntryKind::classify("Preamble"), EntryKind::Preamble);
        assert_eq!(EntryKind::classify("comment"), EntryKind::Comment);
        assert_eq!(EntryKind::classify("BOOK"), EntryKind::Regular);
        assert_eq!(EntryKind::classify("strings"), EntryKind::Regular);
    }

    #[test]
    fn body_states() {
        assert_eq!(EntryKind::Regular.body_state(), LexState::ExpectKey);
        assert_eq!(EntryKind::Macro.body_state(), LexState::ExpectFieldName);
        assert_eq!(EntryKind::Preamble.body_state(), LexState::ExpectValue);
        assert_eq!(EntryKind::Comment.body_state(), LexState::CommentBody);
    }
}
