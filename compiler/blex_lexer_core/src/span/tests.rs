use super::*;

#[test]
fn point_is_empty() {
    let span = Span::point(7);
    assert!(span.is_empty());
    assert_eq!(span.len(), 0);
    assert!(!span.contains(7));
}

#[test]
fn merge_covers_both() {
    let a = Span::new(2, 5);
    let b = Span::new(8, 12);
    assert_eq!(a.merge(b), Span::new(2, 12));
    assert_eq!(b.merge(a), Span::new(2, 12));
}

#[test]
fn contains_is_half_open() {
    let span = Span::new(3, 6);
    assert!(span.contains(3));
    assert!(span.contains(5));
    assert!(!span.contains(6));
}

#[test]
fn range_slices_source() {
    let source = "@BOOK{";
    assert_eq!(&source[Span::new(1, 5).to_range()], "BOOK");
}

#[test]
fn display_and_debug_match() {
    let span = Span::new(10, 14);
    assert_eq!(span.to_string(), "10..14");
    assert_eq!(format!("{span:?}"), "10..14");
}
