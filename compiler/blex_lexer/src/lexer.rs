//! The token-level state machine.
//!
//! [`Lexer`] drives a [`Scanner`] rune by rune. Each call to
//! [`next_token()`](Lexer::next_token) runs the handler for the current
//! [`LexState`] until at least one token sits in the output queue, then pops
//! the oldest one. A single handler run may queue up to two tokens (for
//! instance `STRING` followed by the closing `QUOTE`).
//!
//! # Error recovery
//!
//! A handler that meets something it cannot accept queues one `ERR` token,
//! records a [`LexError`] and moves to [`LexState::Recover`], which discards
//! input up to the next top-level `@` and hands control back to
//! [`LexState::EntrySearch`]. When the error happened inside an entry body,
//! the rest of that body is skipped first: an `@` inside a later `{...}` or
//! `"..."` value does not start an entry, and once the entry closer is seen
//! any `@` does. Recovery always consumes input or reaches end of buffer, so
//! every source ends in `EOF`.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::iter::FusedIterator;

use blex_lexer_core::{Position, Scanner, Span};
use tracing::{debug, trace};

use crate::state::{Delimiter, EntryKind};
use crate::{LexError, LexState, LexerConfig, Token, TokenKind};

/// `[A-Za-z_]`
#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// `[A-Za-z0-9_-]`
#[inline]
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// What sits at the cursor, without consuming it.
#[derive(Clone, Copy, Debug)]
enum Next {
    Rune(Position),
    Eof,
    Invalid,
}

impl Next {
    /// Punctuation at the cursor, with its position.
    fn punct(self) -> Option<(TokenKind, Position)> {
        match self {
            Next::Rune(p) => TokenKind::from_punct(p.rune).map(|kind| (kind, p)),
            Next::Eof | Next::Invalid => None,
        }
    }
}

/// Value nesting inside an entry body, relative to the body itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Nesting {
    /// Open `{` not yet closed.
    depth: u32,
    /// Inside a `"`-delimited value.
    quoted: bool,
}

impl Nesting {
    /// Nesting implied by the state an error was raised in. `None` when the
    /// lexer was not inside an entry body.
    fn of_state(state: LexState) -> Option<Self> {
        match state {
            LexState::EntrySearch
            | LexState::AfterAt
            | LexState::EntryOpen
            | LexState::Recover
            | LexState::End => None,
            LexState::ExpectKey
            | LexState::AfterKey
            | LexState::ExpectFieldName
            | LexState::AfterFieldName
            | LexState::ExpectValue
            | LexState::AfterValue
            | LexState::CommentBody => Some(Self::default()),
            LexState::InsideQuoted => Some(Self {
                depth: 0,
                quoted: true,
            }),
            LexState::InsideBraced => Some(Self {
                depth: 1,
                quoted: false,
            }),
        }
    }

    /// Length of the prefix of `rest` that still belongs to the current
    /// entry body: up to an `@` outside any value, or through `closer`.
    /// The whole of `rest` when the body never ends.
    ///
    /// Values nest the way the lexer reads them: braces count inside quotes
    /// too, and only a `"` at depth zero opens or closes a quoted value.
    fn body_len(self, rest: &[u8], closer: u8) -> usize {
        let Nesting {
            mut depth,
            mut quoted,
        } = self;
        for (i, &b) in rest.iter().enumerate() {
            match b {
                b'{' => depth += 1,
                b'}' if depth > 0 => depth -= 1,
                b'"' if depth == 0 => quoted = !quoted,
                b'@' if depth == 0 && !quoted => return i,
                _ if b == closer && depth == 0 && !quoted => return i + 1,
                _ => {}
            }
        }
        rest.len()
    }
}

/// Outcome of scanning a delimited run of text.
enum Body {
    /// The run closed. `content` excludes both delimiters.
    Closed { content: Span, closer: Position },
    /// The run failed; an `ERR` token has been queued.
    Failed(LexState),
}

/// Pull-based lexer over one source.
pub struct Lexer<'a> {
    scanner: Scanner<'a>,
    config: LexerConfig,
    state: LexState,
    entry: EntryKind,
    delimiter: Delimiter,
    /// Where recovery starts scanning the rest of a failed entry body, and
    /// how deep in a value that point is.
    resync: Option<(u32, Nesting)>,
    queue: VecDeque<Token<'a>>,
    errors: Vec<LexError>,
    /// Set once the iterator has yielded `EOF`.
    exhausted: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer with the default configuration.
    pub fn new(scanner: Scanner<'a>) -> Self {
        Self::with_config(scanner, LexerConfig::default())
    }

    pub fn with_config(scanner: Scanner<'a>, config: LexerConfig) -> Self {
        Self {
            scanner,
            config,
            state: LexState::EntrySearch,
            entry: EntryKind::Regular,
            delimiter: Delimiter::Brace,
            resync: None,
            queue: VecDeque::with_capacity(2),
            errors: Vec::new(),
            exhausted: false,
        }
    }

    /// Produce the next token.
    ///
    /// After `EOF` has been returned once, every further call returns `EOF`
    /// again.
    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                return token;
            }
            self.step();
        }
    }

    /// The current state.
    pub fn state(&self) -> LexState {
        self.state
    }

    pub fn config(&self) -> &LexerConfig {
        &self.config
    }

    /// Errors recorded so far, in source order.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Consume the lexer, keeping only its errors.
    pub fn into_errors(self) -> Vec<LexError> {
        self.errors
    }

    /// Run the handler for the current state once.
    fn step(&mut self) {
        let from = self.state;
        self.state = match from {
            LexState::EntrySearch => self.entry_search(),
            LexState::AfterAt => self.after_at(),
            LexState::EntryOpen => self.entry_open(),
            LexState::ExpectKey => self.expect_key(),
            LexState::AfterKey => self.after_key(),
            LexState::ExpectFieldName => self.expect_field_name(),
            LexState::AfterFieldName => self.after_field_name(),
            LexState::ExpectValue => self.expect_value(),
            LexState::InsideQuoted => self.inside_quoted(),
            LexState::InsideBraced => self.inside_braced(),
            LexState::CommentBody => self.comment_body(),
            LexState::AfterValue => self.after_value(),
            LexState::Recover => self.recover(),
            LexState::End => self.end(),
        };
        if from != self.state {
            trace!(from = ?from, to = ?self.state, offset = self.scanner.offset(), "transition");
        }
    }

    // ─── State handlers ───────────────────────────────────────────────────

    fn entry_search(&mut self) -> LexState {
        let next = self.skip_whitespace();
        if let Next::Eof = next {
            self.emit_eof();
            return LexState::End;
        }
        match next.punct() {
            Some((TokenKind::At, p)) => {
                self.bump();
                self.emit_bare(TokenKind::At, p);
                LexState::AfterAt
            }
            Some((TokenKind::Perc, p)) => {
                self.bump();
                if self.config.emit_comment_marker {
                    self.emit_bare(TokenKind::Perc, p);
                }
                self.scanner.skip_to_newline();
                LexState::EntrySearch
            }
            _ => self.unexpected(next, "`@` or `%`"),
        }
    }

    fn after_at(&mut self) -> LexState {
        let next = self.skip_whitespace();
        let Some(span) = self.eat_ident() else {
            return self.unexpected(next, "an entry type");
        };
        let entry_type = self.text(span);
        self.entry = if self.config.special_entries {
            EntryKind::classify(&entry_type)
        } else {
            EntryKind::Regular
        };
        self.emit(TokenKind::Ident, entry_type, span);
        LexState::EntryOpen
    }

    fn entry_open(&mut self) -> LexState {
        let next = self.skip_whitespace();
        if let Next::Rune(p) = next {
            if let Some(delimiter) = Delimiter::from_open(p.rune) {
                self.bump();
                self.delimiter = delimiter;
                self.emit_bare(delimiter.open_kind(), p);
                return self.entry.body_state();
            }
        }
        self.unexpected(next, "`{` or `(`")
    }

    fn expect_key(&mut self) -> LexState {
        let next = self.skip_whitespace();
        if let Some(state) = self.close_entry(next) {
            return state;
        }
        let Some(span) = self.eat_ident() else {
            return self.unexpected(next, "a citation key");
        };
        let key = self.text(span);
        self.emit(TokenKind::Ident, key, span);
        LexState::AfterKey
    }

    fn after_key(&mut self) -> LexState {
        let next = self.skip_whitespace();
        match next.punct() {
            Some((TokenKind::Comma, p)) => {
                self.bump();
                self.emit_bare(TokenKind::Comma, p);
                LexState::ExpectFieldName
            }
            _ => match self.close_entry(next) {
                Some(state) => state,
                None => self.unexpected(next, "`,`"),
            },
        }
    }

    fn expect_field_name(&mut self) -> LexState {
        let next = self.skip_whitespace();
        if let Some(state) = self.close_entry(next) {
            return state;
        }
        let Some(span) = self.eat_ident() else {
            return self.unexpected(next, "a field name");
        };
        let name = self.text(span);
        self.emit(TokenKind::Ident, name, span);
        LexState::AfterFieldName
    }

    fn after_field_name(&mut self) -> LexState {
        let next = self.skip_whitespace();
        match next.punct() {
            Some((TokenKind::Equals, p)) => {
                self.bump();
                self.emit_bare(TokenKind::Equals, p);
                LexState::ExpectValue
            }
            _ => self.unexpected(next, "`=`"),
        }
    }

    fn expect_value(&mut self) -> LexState {
        let next = self.skip_whitespace();
        let Next::Rune(p) = next else {
            return self.unexpected(next, "a field value");
        };
        match next.punct() {
            Some((TokenKind::Quote, _)) => {
                self.bump();
                self.emit_bare(TokenKind::Quote, p);
                LexState::InsideQuoted
            }
            Some((TokenKind::LBrace, _)) => {
                self.bump();
                self.emit_bare(TokenKind::LBrace, p);
                LexState::InsideBraced
            }
            _ if p.rune.is_ascii_digit() => {
                let span = self.eat_while(|c| c.is_ascii_digit());
                let number = self.text(span);
                self.emit(TokenKind::Number, number, span);
                LexState::AfterValue
            }
            _ if is_ident_start(p.rune) => {
                let span = self.eat_while(is_ident_continue);
                let name = self.text(span);
                self.emit(TokenKind::Ident, name, span);
                LexState::AfterValue
            }
            _ => self.unexpected(next, "a field value"),
        }
    }

    /// Body of a `"`-delimited value. Braces are counted but need not
    /// balance; only a `"` at depth zero ends the value.
    fn inside_quoted(&mut self) -> LexState {
        let start = self.scanner.offset();
        let mut depth: u32 = 0;
        loop {
            if !self.scanner.advance() {
                if self.scanner.is_at_end() {
                    let span = Span::new(start, self.scanner.offset());
                    let value = self.text(span);
                    return self.fail(LexError::unterminated_string(span), value);
                }
                let next = self.invalid_utf8();
                self.resync_in_value(Nesting {
                    depth,
                    quoted: true,
                });
                return next;
            }
            let p = self.scanner.position();
            match p.rune {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                '"' if depth == 0 => {
                    let content = Span::new(start, p.start);
                    let value = self.text(content);
                    self.emit(TokenKind::String, value, content);
                    self.emit_bare(TokenKind::Quote, p);
                    return LexState::AfterValue;
                }
                _ => {}
            }
        }
    }

    fn inside_braced(&mut self) -> LexState {
        match self.balanced_body('{', '}') {
            Body::Closed { content, closer } => {
                let value = self.text(content);
                self.emit(TokenKind::String, value, content);
                self.emit_bare(TokenKind::RBrace, closer);
                LexState::AfterValue
            }
            Body::Failed(state) => state,
        }
    }

    /// Opaque body of `@comment{...}` or `@comment(...)`.
    fn comment_body(&mut self) -> LexState {
        let delimiter = self.delimiter;
        match self.balanced_body(delimiter.open(), delimiter.close()) {
            Body::Closed { content, closer } => {
                let value = self.text(content);
                self.emit(TokenKind::String, value, content);
                self.emit_bare(delimiter.close_kind(), closer);
                LexState::EntrySearch
            }
            Body::Failed(state) => state,
        }
    }

    fn after_value(&mut self) -> LexState {
        let next = self.skip_whitespace();
        match next.punct() {
            Some((TokenKind::Hash, p)) => {
                self.bump();
                self.emit_bare(TokenKind::Hash, p);
                LexState::ExpectValue
            }
            Some((TokenKind::Comma, p)) => {
                self.bump();
                self.emit_bare(TokenKind::Comma, p);
                LexState::ExpectFieldName
            }
            _ => match self.close_entry(next) {
                Some(state) => state,
                None => self.unexpected(next, "`#`, `,` or the entry closer"),
            },
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "body length is bounded by the buffer length, which fits in u32"
    )]
    fn recover(&mut self) -> LexState {
        let from = self.scanner.offset();
        if let Some((start, nesting)) = self.resync.take() {
            let rest = self.scanner.slice(start, self.scanner.source_len());
            let len = nesting.body_len(rest, self.delimiter.close_byte());
            let end = (start + len as u32).max(from);
            self.scanner.reposition(Position::boundary(end));
        }
        let found = self.scanner.skip_to_byte(b'@');
        debug!(
            from,
            to = self.scanner.offset(),
            found_entry = found,
            "resynchronized"
        );
        LexState::EntrySearch
    }

    fn end(&mut self) -> LexState {
        self.emit_eof();
        LexState::End
    }

    // ─── Shared pieces ────────────────────────────────────────────────────

    /// Handle `}` or `)` at the cursor. Returns `None` when `next` is not a
    /// closer at all.
    fn close_entry(&mut self, next: Next) -> Option<LexState> {
        let (kind @ (TokenKind::RBrace | TokenKind::RParen), p) = next.punct()? else {
            return None;
        };
        self.bump();
        if kind == self.delimiter.close_kind() {
            self.emit_bare(kind, p);
            return Some(LexState::EntrySearch);
        }
        let expected = self.delimiter.close();
        let err = LexError::mismatched_closer(p.span(), p.rune, expected, self.state);
        let value = self.text(p.span());
        Some(self.fail(err, value))
    }

    /// Consume a run delimited by `open`/`close`, the opener already eaten.
    fn balanced_body(&mut self, open: char, close: char) -> Body {
        let start = self.scanner.offset();
        let mut depth: u32 = 1;
        loop {
            if !self.scanner.advance() {
                if self.scanner.is_at_end() {
                    let span = Span::new(start, self.scanner.offset());
                    let value = self.text(span);
                    let err = LexError::unterminated_brace(span, self.state);
                    return Body::Failed(self.fail(err, value));
                }
                let next = self.invalid_utf8();
                if self.state == LexState::InsideBraced {
                    self.resync_in_value(Nesting {
                        depth,
                        quoted: false,
                    });
                }
                return Body::Failed(next);
            }
            let p = self.scanner.position();
            if p.rune == open {
                depth += 1;
            } else if p.rune == close {
                depth -= 1;
                if depth == 0 {
                    return Body::Closed {
                        content: Span::new(start, p.start),
                        closer: p,
                    };
                }
            }
        }
    }

    /// Skip whitespace and report what follows, without consuming it.
    fn skip_whitespace(&mut self) -> Next {
        loop {
            match self.scanner.peek() {
                Some(p) if p.rune.is_whitespace() => self.scanner.reposition(p),
                Some(p) => return Next::Rune(p),
                None if self.scanner.is_at_end() => return Next::Eof,
                None => return Next::Invalid,
            }
        }
    }

    /// Consume the rune last reported by [`skip_whitespace`](Self::skip_whitespace).
    #[inline]
    fn bump(&mut self) {
        let advanced = self.scanner.advance();
        debug_assert!(advanced, "bump after a failed peek");
    }

    /// Consume an identifier run, if one starts at the cursor.
    fn eat_ident(&mut self) -> Option<Span> {
        match self.scanner.peek() {
            Some(p) if is_ident_start(p.rune) => Some(self.eat_while(is_ident_continue)),
            _ => None,
        }
    }

    /// Consume the longest run of runes matching `pred`.
    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> Span {
        let start = self.scanner.offset();
        while let Some(p) = self.scanner.peek() {
            if !pred(p.rune) {
                break;
            }
            self.scanner.reposition(p);
        }
        Span::new(start, self.scanner.offset())
    }

    /// Text under `span`, borrowed from the source when it is valid UTF-8.
    fn text(&self, span: Span) -> Cow<'a, str> {
        String::from_utf8_lossy(self.scanner.slice(span.start, span.end))
    }

    /// Report `next` as not matching `expected`.
    ///
    /// An offending `@` is left in place so recovery can restart at it.
    fn unexpected(&mut self, next: Next, expected: &'static str) -> LexState {
        match next {
            Next::Rune(p) => {
                if p.rune != '@' {
                    self.bump();
                }
                let err = LexError::unexpected_char(p.span(), p.rune, expected, self.state);
                let value = self.text(p.span());
                let state = self.fail(err, value);
                // The offending rune may itself open a value or close the entry.
                if let Some((from, _)) = &mut self.resync {
                    *from = p.start;
                }
                state
            }
            Next::Eof => {
                let err = LexError::unexpected_eof(self.scanner.offset(), expected, self.state);
                self.fail(err, Cow::Borrowed(""))
            }
            Next::Invalid => self.invalid_utf8(),
        }
    }

    fn invalid_utf8(&mut self) -> LexState {
        let span = self.scanner.skip_invalid();
        let value = self.text(span);
        self.fail(LexError::invalid_utf8(span, self.state), value)
    }

    /// Queue an `ERR` token, record `err` and enter recovery.
    fn fail(&mut self, err: LexError, value: Cow<'a, str>) -> LexState {
        debug!(
            state = ?self.state,
            span_start = err.span.start,
            span_end = err.span.end,
            error = %err.kind,
            "lexical error"
        );
        self.emit(TokenKind::Err, value, err.span);
        self.resync = Nesting::of_state(self.state).map(|n| (self.scanner.offset(), n));
        if self.config.keeps_error(self.errors.len()) {
            self.errors.push(err);
        }
        LexState::Recover
    }

    /// Resume recovery at the cursor, `nesting` deep inside a value.
    fn resync_in_value(&mut self, nesting: Nesting) {
        self.resync = Some((self.scanner.offset(), nesting));
    }

    fn emit(&mut self, kind: TokenKind, value: Cow<'a, str>, span: Span) {
        self.push(Token::new(kind, value, span));
    }

    fn emit_bare(&mut self, kind: TokenKind, at: Position) {
        self.push(Token::bare(kind, at.span()));
    }

    fn emit_eof(&mut self) {
        let end = Span::point(self.scanner.source_len());
        self.push(Token::bare(TokenKind::Eof, end));
    }

    fn push(&mut self, token: Token<'a>) {
        trace!(
            kind = token.kind.name(),
            span_start = token.span.start,
            span_end = token.span.end,
            "emit"
        );
        self.queue.push_back(token);
    }
}

/// Yields every token up to and including the first `EOF`.
impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        self.exhausted = token.is_eof();
        Some(token)
    }
}

impl FusedIterator for Lexer<'_> {}
