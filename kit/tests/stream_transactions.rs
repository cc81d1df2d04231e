//! Stream-level guarantees: transaction LIFO discipline, position
//! monotonicity, and code-point-oriented consumption.

use parskit::{ch, digit, eof, many, pure, Position, Stream};
use test_case::test_case;

#[test]
fn rollback_restores_offset_and_position_exactly() {
    let mut s = Stream::new("ab\ncd\nef");
    s.take_n(4).unwrap();
    let saved = s.position();

    s.begin();
    s.take_n(3).unwrap();
    s.rollback();

    assert_eq!(s.position(), saved);
    assert_eq!(s.position().line, 2);
    assert_eq!(s.position().column, 2);
    assert_eq!(s.rest(), "d\nef");
}

#[test]
fn nested_transactions_unwind_in_lifo_order() {
    let mut s = Stream::new("abcdef");
    s.begin();
    s.take_n(2).unwrap();
    s.begin();
    s.take_n(2).unwrap();
    s.begin();
    s.take_n(1).unwrap();

    assert_eq!(s.transaction_depth(), 3);
    s.rollback();
    assert_eq!(s.rest(), "ef");
    s.commit();
    assert_eq!(s.rest(), "ef");
    s.rollback();
    assert_eq!(s.rest(), "abcdef");
    assert_eq!(s.transaction_depth(), 0);
}

#[test_case("abc"; "plain input")]
#[test_case("日本語x"; "multibyte input")]
#[test_case(""; "empty input")]
fn successful_parses_never_move_position_backwards(input: &str) {
    let parsers = [
        many(&ch('a')).discard(),
        many(&parskit::any_char()).discard(),
        pure(()).discard(),
    ];
    for p in &parsers {
        let start = Stream::new(input);
        let before = start.position();
        let result = p.run(start);
        if result.is_success() {
            assert!(result.position().offset >= before.offset);
        }
    }
}

#[test]
fn position_strictly_increases_iff_input_was_consumed() {
    let consumed = ch('a').run(Stream::new("abc"));
    assert!(consumed.position().offset > 0);

    let unconsumed = pure('x').run(Stream::new("abc"));
    assert_eq!(unconsumed.position().offset, 0);

    let at_end = eof().run(Stream::new(""));
    assert_eq!(at_end.position().offset, 0);
}

#[test_case("abc", 0, ""; "zero take consumes nothing")]
#[test_case("abc", 2, "ab"; "partial take")]
#[test_case("abc", 3, "abc"; "exact take")]
#[test_case("abc", 9, "abc"; "oversized take clamps")]
fn take_n_consumes_up_to_n(input: &str, n: usize, expected: &str) {
    let mut s = Stream::new(input);
    assert_eq!(s.take_n(n).unwrap(), expected);
}

#[test]
fn take_n_counts_code_points_not_bytes() {
    let mut s = Stream::new("héllo");
    let chunk = s.take_n(2).unwrap();
    assert_eq!(chunk, "hé");
    assert_eq!(s.position().offset, 2);
    assert_eq!(s.position().column, 3);
}

#[test]
fn peek_back_reads_previous_code_point() {
    let mut s = Stream::new("日本");
    assert_eq!(s.peek_back(), None);
    s.take1().unwrap();
    assert_eq!(s.peek_back(), Some('日'));
}

#[test]
fn filename_travels_into_failures() {
    let p = digit();
    let err = p
        .try_run_stream(Stream::with_filename("x", "config.toml"))
        .unwrap_err();
    assert_eq!(err.filename, "config.toml");
    assert_eq!(err.position, Position::at(0, 1, 1));
}

#[test]
fn positions_in_failures_point_at_the_offending_line() {
    let p = ch('{').then(&digit());
    let err = p.try_run("{\n{x").unwrap_err();
    // Consumed '{', failed on '\n'
    assert_eq!(err.position.line, 1);
    assert_eq!(err.position.column, 2);
}

#[test]
fn report_renders_excerpt_and_caret() {
    let p = ch('a').then(&ch('b'));
    let err = p.try_run_stream(Stream::with_filename("axc", "demo.txt")).unwrap_err();

    let report = err.to_string();
    assert!(report.contains("expected 'b'"), "{report}");
    assert!(report.contains("found 'x'"), "{report}");
    assert!(report.contains("--> demo.txt:1:2"), "{report}");
    assert!(report.contains("1 | axc"), "{report}");
    assert!(report.lines().last().unwrap().trim_end().ends_with('^'), "{report}");
}
