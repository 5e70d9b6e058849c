use pretty_assertions::assert_eq;

use super::*;

const BOOK: &str = r#"@BOOK{Knuth1997,
  title     = "The Art of Computer Programming",
  author    = "Knuth, Donald Ervin",
  publisher = "Addison Wesley",
  address   = "Boston, MA",
  edition   = "3.",
  year      = 1997
}"#;

const COLLECTION: &str = "@COLLECTION{yanagida1975,
  editor    = {柳田聖山},
  title     = {禪學叢書},
  location  = {京都},
  publisher = {中文出版社},
  date      = 1975
}";

fn collect_runes(source: &SourceBuffer) -> String {
    let mut scanner = source.scanner();
    let mut out = String::new();
    while scanner.advance() {
        out.push(scanner.current().rune());
    }
    out
}

// === Display ===

#[test]
fn token_display_format() {
    let cases = [
        (Position { rune: '\0', start: 0, end: 1 }, "[\0 0:1]"),
        (Position { rune: 'a', start: 23, end: 24 }, "[a 23:24]"),
        (Position { rune: '禪', start: 2, end: 5 }, "[禪 2:5]"),
        (Position { rune: '9', start: 37, end: 38 }, "[9 37:38]"),
        (Position { rune: '\u{ffff}', start: 0, end: 3 }, "[\u{ffff} 0:3]"),
    ];
    let buf = SourceBuffer::new("".as_bytes());
    for (position, want) in cases {
        let token = ScannerToken {
            position,
            buf: buf.as_bytes(),
        };
        assert_eq!(token.to_string(), want);
    }
}

// === Scanning ===

#[test]
fn scan_reconstructs_ascii_entry() {
    let buf = SourceBuffer::new(BOOK.as_bytes());
    assert_eq!(collect_runes(&buf), BOOK);
}

#[test]
fn scan_reconstructs_cjk_entry() {
    let buf = SourceBuffer::new(COLLECTION.as_bytes());
    assert_eq!(collect_runes(&buf), COLLECTION);
}

#[test]
fn multibyte_positions_track_byte_width() {
    let buf = SourceBuffer::new("aß禪😀".as_bytes());
    let mut scanner = buf.scanner();
    let mut seen = Vec::new();
    while scanner.advance() {
        let p = scanner.position();
        seen.push((p.rune, p.start, p.end));
    }
    assert_eq!(
        seen,
        vec![('a', 0, 1), ('ß', 1, 3), ('禪', 3, 6), ('😀', 6, 10)]
    );
}

#[test]
fn token_bytes_slice_the_buffer() {
    let buf = SourceBuffer::new("x禪".as_bytes());
    let mut scanner = buf.scanner();
    scanner.advance();
    scanner.advance();
    let token = scanner.current();
    assert_eq!(token.bytes(), "禪".as_bytes());
    assert_eq!(token.buffer(), buf.as_bytes());
    assert_eq!((token.start(), token.end()), (1, 4));
}

#[test]
fn replacement_char_is_valid_utf8() {
    let buf = SourceBuffer::new("\u{FFFD}".as_bytes());
    let mut scanner = buf.scanner();
    assert!(scanner.advance());
    assert_eq!(scanner.current().rune(), '\u{FFFD}');
}

// === Failure ===

#[test]
fn advance_fails_at_end_without_moving() {
    let buf = SourceBuffer::new("a".as_bytes());
    let mut scanner = buf.scanner();
    assert!(scanner.advance());
    let before = scanner.position();
    assert!(!scanner.advance());
    assert_eq!(scanner.position(), before);
    assert!(scanner.is_at_end());
}

#[test]
fn advance_fails_on_empty_buffer() {
    let buf = SourceBuffer::new("".as_bytes());
    let mut scanner = buf.scanner();
    assert!(!scanner.advance());
    assert_eq!(scanner.position(), Position::ZERO);
}

#[test]
fn advance_fails_on_invalid_bytes_without_moving() {
    let cases: [&[u8]; 5] = [
        &[0xFF],
        &[0x80, b'a'],
        &[0xC3],
        &[0xE2, 0x82, b'a'],
        &[0xC0, 0xAF],
    ];
    for bytes in cases {
        let buf = SourceBuffer::new(bytes);
        let mut scanner = buf.scanner();
        assert!(!scanner.advance(), "{bytes:?} should not decode");
        assert_eq!(scanner.position(), Position::ZERO);
        assert!(!scanner.is_at_end());
    }
}

#[test]
fn peek_does_not_move() {
    let buf = SourceBuffer::new("ab".as_bytes());
    let mut scanner = buf.scanner();
    scanner.advance();
    let before = scanner.position();
    let peeked = scanner.peek().map(|p| p.rune);
    assert_eq!(peeked, Some('b'));
    assert_eq!(scanner.position(), before);
}

// === Repositioning ===

#[test]
fn reposition_restores_state() {
    let cases = [
        Position { rune: 'ù', start: 5, end: 7 },
        Position { rune: 'ß', start: 0, end: 2 },
        Position { rune: '§', start: 14, end: 16 },
    ];
    let buf = SourceBuffer::new("x".repeat(32).as_bytes());
    let mut scanner = buf.scanner();
    for target in cases {
        scanner.reposition(target);
        assert_eq!(scanner.position(), target);
    }
}

#[test]
fn reposition_enables_backtracking() {
    let buf = SourceBuffer::new("@BOOK{".as_bytes());
    let mut scanner = buf.scanner();
    scanner.advance();
    let mark = scanner.position();
    while scanner.advance() {}
    scanner.reposition(mark);
    assert!(scanner.advance());
    assert_eq!(scanner.current().rune(), 'B');
}

#[test]
fn reset_returns_to_zero() {
    let buf = SourceBuffer::new("abc".as_bytes());
    let mut scanner = buf.scanner();
    scanner.advance();
    scanner.advance();
    scanner.reset();
    assert_eq!(scanner.position(), Position::ZERO);
    assert!(scanner.advance());
    assert_eq!(scanner.current().rune(), 'a');
}

// === Skipping ===

#[test]
fn skip_to_byte_stops_before_target() {
    let buf = SourceBuffer::new("junk 禪 @BOOK".as_bytes());
    let mut scanner = buf.scanner();
    assert!(scanner.skip_to_byte(b'@'));
    assert!(scanner.advance());
    assert_eq!(scanner.current().rune(), '@');
}

#[test]
fn skip_to_byte_missing_lands_at_end() {
    let buf = SourceBuffer::new("no entries here".as_bytes());
    let mut scanner = buf.scanner();
    assert!(!scanner.skip_to_byte(b'@'));
    assert!(scanner.is_at_end());
    assert!(!scanner.advance());
}

#[test]
fn skip_to_newline_keeps_newline() {
    let buf = SourceBuffer::new("% comment\n@".as_bytes());
    let mut scanner = buf.scanner();
    scanner.skip_to_newline();
    assert!(scanner.advance());
    assert_eq!(scanner.current().rune(), '\n');
}

#[test]
fn skip_invalid_steps_over_bad_sequence() {
    let buf = SourceBuffer::new(&[0xE2, 0x82, b'a']);
    let mut scanner = buf.scanner();
    assert_eq!(scanner.skip_invalid(), Span::new(0, 2));
    assert!(scanner.advance());
    assert_eq!(scanner.current().rune(), 'a');
}

#[test]
fn skip_invalid_truncated_tail() {
    let buf = SourceBuffer::new(&[b'a', 0xF0, 0x9F]);
    let mut scanner = buf.scanner();
    scanner.advance();
    assert_eq!(scanner.skip_invalid(), Span::new(1, 3));
    assert!(scanner.is_at_end());
}

#[test]
fn skip_invalid_on_valid_input_is_noop() {
    let buf = SourceBuffer::new("禪".as_bytes());
    let mut scanner = buf.scanner();
    assert!(scanner.skip_invalid().is_empty());
    assert_eq!(scanner.position(), Position::ZERO);
}

// === Properties ===

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_positions {
    use proptest::prelude::*;

    use crate::SourceBuffer;

    proptest! {
        #[test]
        fn positions_are_contiguous_and_sized(text in "\\PC{0,64}") {
            let buf = SourceBuffer::new(text.as_bytes());
            let mut scanner = buf.scanner();
            let mut prev_end = 0;
            while scanner.advance() {
                let p = scanner.position();
                prop_assert_eq!(p.start, prev_end);
                prop_assert_eq!((p.end - p.start) as usize, p.rune.len_utf8());
                prev_end = p.end;
            }
            prop_assert_eq!(prev_end as usize, text.len());
        }

        #[test]
        fn failure_never_moves(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let buf = SourceBuffer::new(&bytes);
            let mut scanner = buf.scanner();
            while scanner.advance() {}
            let stuck = scanner.position();
            prop_assert!(!scanner.advance());
            prop_assert_eq!(scanner.position(), stuck);
        }
    }
}
