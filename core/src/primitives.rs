//! Primitive parsers: the leaves every grammar is built from.
//!
//! Each constructor here matches a single character, a literal string, or
//! nothing at all. Every fallible primitive is *atomic*: it wraps its match
//! attempt in a stream transaction and rolls back on failure, so the stream
//! a failure carries sits exactly where the primitive started. Composite
//! parsers built by [`combinators`](crate::combinators) are deliberately
//! not atomic by default; wrap them in
//! [`attempt`](crate::combinators::attempt) to opt in.

use crate::{ParseResult, Parser, Stream};

/// Matches exactly the character `expected`.
pub fn ch(expected: char) -> Parser<char> {
    let label = format!("'{}'", expected);
    Parser::make(label.clone(), move |mut input: Stream| {
        input.begin();
        match input.take1() {
            Ok(c) if c == expected => {
                input.commit();
                ParseResult::Success { value: c, rest: input }
            }
            _ => {
                input.rollback();
                ParseResult::Failure {
                    expected: label.clone(),
                    got: input,
                }
            }
        }
    })
}

/// Matches `expected` case-insensitively, yielding the character actually
/// consumed (case preserved).
///
/// Comparison folds both sides with Unicode lowercase mapping.
pub fn ch_no_case(expected: char) -> Parser<char> {
    let folded: String = expected.to_lowercase().collect();
    let label = format!("'{}'", expected);
    Parser::make(label.clone(), move |mut input: Stream| {
        input.begin();
        match input.take1() {
            Ok(c) if c.to_lowercase().collect::<String>() == folded => {
                input.commit();
                ParseResult::Success { value: c, rest: input }
            }
            _ => {
                input.rollback();
                ParseResult::Failure {
                    expected: label.clone(),
                    got: input,
                }
            }
        }
    })
}

/// Matches any single character; fails only at end of input.
pub fn any_char() -> Parser<char> {
    satisfy(|_| true).labelled("any character")
}

/// Matches any single character except `excluded`.
pub fn any_char_but(excluded: char) -> Parser<char> {
    satisfy(move |c| c != excluded).labelled(format!("any character but '{}'", excluded))
}

/// Matches any character for which `pred` holds.
///
/// The default label is generic; relabel with
/// [`labelled`](crate::Parser::labelled) for readable errors.
pub fn satisfy(pred: impl Fn(char) -> bool + Send + Sync + 'static) -> Parser<char> {
    let label = "matching character";
    Parser::make(label, move |mut input: Stream| {
        input.begin();
        match input.take1() {
            Ok(c) if pred(c) => {
                input.commit();
                ParseResult::Success { value: c, rest: input }
            }
            _ => {
                input.rollback();
                ParseResult::Failure {
                    expected: label.to_string(),
                    got: input,
                }
            }
        }
    })
}

/// Matches the literal `expected`, atomically: on failure the stream is
/// left untouched.
///
/// # Panics
///
/// Panics on an empty literal, since a grammar matching "" is malformed.
pub fn string(expected: &str) -> Parser<String> {
    assert!(!expected.is_empty(), "string() requires a non-empty literal");
    let expected = expected.to_string();
    let count = expected.chars().count();
    let label = format!("'{}'", expected);
    Parser::make(label.clone(), move |mut input: Stream| {
        input.begin();
        match input.take_n(count) {
            Ok(chunk) if chunk == expected => {
                input.commit();
                ParseResult::Success {
                    value: chunk,
                    rest: input,
                }
            }
            _ => {
                input.rollback();
                ParseResult::Failure {
                    expected: label.clone(),
                    got: input,
                }
            }
        }
    })
}

/// Matches the literal `expected` case-insensitively, yielding the text
/// actually consumed (case preserved). Atomic, like [`string`].
///
/// # Panics
///
/// Panics on an empty literal.
pub fn string_no_case(expected: &str) -> Parser<String> {
    assert!(
        !expected.is_empty(),
        "string_no_case() requires a non-empty literal"
    );
    let folded = expected.to_lowercase();
    let count = expected.chars().count();
    let label = format!("'{}'", expected);
    Parser::make(label.clone(), move |mut input: Stream| {
        input.begin();
        match input.take_n(count) {
            Ok(chunk) if chunk.to_lowercase() == folded => {
                input.commit();
                ParseResult::Success {
                    value: chunk,
                    rest: input,
                }
            }
            _ => {
                input.rollback();
                ParseResult::Failure {
                    expected: label.clone(),
                    got: input,
                }
            }
        }
    })
}

/// Matches an ASCII decimal digit.
pub fn digit() -> Parser<char> {
    satisfy(|c| c.is_ascii_digit()).labelled("digit")
}

/// Matches an ASCII hexadecimal digit.
pub fn hex_digit() -> Parser<char> {
    satisfy(|c| c.is_ascii_hexdigit()).labelled("hex digit")
}

/// Matches an alphabetic character.
pub fn alpha() -> Parser<char> {
    satisfy(char::is_alphabetic).labelled("letter")
}

/// Matches an alphanumeric character.
pub fn alphanumeric() -> Parser<char> {
    satisfy(char::is_alphanumeric).labelled("letter or digit")
}

/// Matches a single space character.
pub fn space() -> Parser<char> {
    ch(' ').labelled("space")
}

/// Matches a tab character.
pub fn tab() -> Parser<char> {
    ch('\t').labelled("tab")
}

/// Matches a line-feed character.
pub fn newline() -> Parser<char> {
    ch('\n').labelled("newline")
}

/// Matches any Unicode whitespace character.
pub fn whitespace() -> Parser<char> {
    satisfy(char::is_whitespace).labelled("whitespace")
}

/// Matches an end of line: `\r\n` or `\n`, yielding the consumed text.
pub fn eol() -> Parser<String> {
    string("\r\n").or(&string("\n")).labelled("end of line")
}

/// Succeeds only at the end of input, consuming nothing.
pub fn eof() -> Parser<()> {
    Parser::make("end of input", |input: Stream| {
        if input.is_eof() {
            ParseResult::Success {
                value: (),
                rest: input,
            }
        } else {
            ParseResult::Failure {
                expected: "end of input".to_string(),
                got: input,
            }
        }
    })
}

/// Matches any character contained in `set`.
pub fn one_of(set: &str) -> Parser<char> {
    let chars: Vec<char> = set.chars().collect();
    let label = format!("one of \"{}\"", set);
    satisfy(move |c| chars.contains(&c)).labelled(label)
}

/// Matches any character *not* contained in `set`.
pub fn none_of(set: &str) -> Parser<char> {
    let chars: Vec<char> = set.chars().collect();
    let label = format!("none of \"{}\"", set);
    satisfy(move |c| !chars.contains(&c)).labelled(label)
}

/// Always succeeds with `value`, consuming nothing.
pub fn pure<T: Clone + Send + Sync + 'static>(value: T) -> Parser<T> {
    Parser::make("pure", move |input: Stream| ParseResult::Success {
        value: value.clone(),
        rest: input,
    })
}

/// Always succeeds with the empty string, consuming nothing.
pub fn succeed() -> Parser<String> {
    pure(String::new()).with_label("success")
}

/// Always fails with the given label, consuming nothing.
pub fn fail<T: 'static>(label: impl Into<String>) -> Parser<T> {
    let label = label.into();
    Parser::make(label.clone(), move |input: Stream| ParseResult::Failure {
        expected: label.clone(),
        got: input,
    })
}
