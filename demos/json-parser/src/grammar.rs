//! The JSON grammar, written purely over the public combinator API.
//!
//! Every token parser consumes its own trailing whitespace (the classic
//! lexeme convention), and [`document`] skips leading whitespace once, so
//! whitespace never needs special handling inside the grammar rules.

use parskit::{
    alphanumeric, assemble, between, ch, choice, digit, eof, exactly, fail, hex_digit, many, many1,
    none_of, not, one_of, pure, sep_by, string, Parser,
};

use crate::ast::JsonValue;

/// JSON insignificant whitespace.
fn ws() -> Parser<()> {
    many(&one_of(" \t\r\n")).discard()
}

/// A structural character, with trailing whitespace consumed.
fn sym(c: char) -> Parser<char> {
    ch(c).then_ignore(&ws())
}

/// A keyword literal (`null`, `true`, `false`), rejecting longer words like
/// `nullable`.
fn keyword(word: &str) -> Parser<String> {
    string(word)
        .then_ignore(&not(&alphanumeric()))
        .then_ignore(&ws())
}

fn digits1() -> Parser<String> {
    many1(&digit()).collect_string()
}

/// A JSON number, producing `f64`.
///
/// Grammar: `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
pub fn number() -> Parser<f64> {
    let sign = ch('-').as_string().optional().map(Option::unwrap_or_default);
    let int_part = string("0")
        .or(&assemble(vec![
            one_of("123456789").as_string(),
            many(&digit()).collect_string(),
        ]))
        .labelled("digit");
    let frac = assemble(vec![ch('.').as_string(), digits1()])
        .optional()
        .map(Option::unwrap_or_default);
    let exp_sign = one_of("+-").as_string().optional().map(Option::unwrap_or_default);
    let exp = assemble(vec![one_of("eE").as_string(), exp_sign, digits1()])
        .optional()
        .map(Option::unwrap_or_default);

    assemble(vec![sign, int_part, frac, exp])
        .bind(|text| match text.parse::<f64>() {
            // Reject overflow to infinity so every accepted number is finite
            Ok(value) if value.is_finite() => pure(value),
            _ => fail("number"),
        })
        .labelled("number")
}

/// One escape sequence after the backslash has been consumed.
fn escape() -> Parser<char> {
    let unicode = ch('u')
        .then(&exactly(4, &hex_digit()).collect_string())
        .bind(|hex| {
            match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                Some(c) => pure(c),
                None => fail("unicode escape"),
            }
        });
    ch('\\').then(&choice(vec![
        ch('"').to('"'),
        ch('\\').to('\\'),
        ch('/').to('/'),
        ch('b').to('\u{0008}'),
        ch('f').to('\u{000C}'),
        ch('n').to('\n'),
        ch('r').to('\r'),
        ch('t').to('\t'),
        unicode,
    ]))
    .labelled("escape sequence")
}

/// A JSON string literal, producing the unescaped text.
pub fn string_literal() -> Parser<String> {
    between(
        &ch('"'),
        &many(&escape().or(&none_of("\"\\"))).collect_string(),
        &ch('"'),
    )
    .labelled("string")
}

/// A complete JSON value parser, built once per call.
///
/// The grammar is recursive (arrays and objects contain values), so it is
/// declared as a forward reference first and bound after every rule that
/// mentions it has been composed.
pub fn value() -> Parser<JsonValue> {
    let value_ref: Parser<JsonValue> = Parser::recursive();

    let element = value_ref.clone();
    let array = between(&sym('['), &sep_by(&element, &sym(',')), &sym(']'))
        .map(JsonValue::Array)
        .labelled("array");

    let key = string_literal().then_ignore(&ws());
    let member = key.then_ignore(&sym(':')).and(&value_ref);
    let object = between(&sym('{'), &sep_by(&member, &sym(',')), &sym('}'))
        .map(JsonValue::Object)
        .labelled("object");

    value_ref.recurse(
        choice(vec![
            keyword("null").to(JsonValue::Null),
            keyword("true").to(JsonValue::Bool(true)),
            keyword("false").to(JsonValue::Bool(false)),
            number().then_ignore(&ws()).map(JsonValue::Number),
            string_literal().then_ignore(&ws()).map(JsonValue::String),
            array,
            object,
        ])
        .labelled("JSON value"),
    );

    value_ref
}

/// A whole JSON document: one value, with surrounding whitespace, to the
/// end of input.
pub fn document() -> Parser<JsonValue> {
    ws().then(&value()).then_ignore(&eof())
}
