#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Calculator Example
//!
//! An integer calculator built with the parskit expression builder,
//! exercising every precedence-level kind:
//!
//! | Level (loosest first) | Operators | Kind |
//! |-----------------------|-----------|------|
//! | comparison | `<` `>` | non-associative |
//! | additive | `+` `-` | left-associative |
//! | multiplicative | `*` `/` `%` | left-associative |
//! | power | `^` | right-associative |
//! | sign | `-` | prefix |
//! | factorial | `!` | postfix |
//!
//! Arithmetic is total (wrapping, with division by zero and oversized
//! factorials clamped) so no input can panic the evaluator.
//!
//! # Example
//!
//! ```ignore
//! assert_eq!(calc_parser::eval("2 + 3 * 4"), Ok(14));
//! assert_eq!(calc_parser::eval("-(1 + 2) ^ 2"), Ok(9));
//! ```

use parskit::{
    between, ch, digit, expression, fail, many, many1, one_of, pure, InfixOp, Level, Parser,
    ParserFailure, UnaryOp,
};
use thiserror::Error;

/// Errors produced when evaluating an expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// The input is not a valid expression.
    #[error("{0}")]
    Syntax(#[from] ParserFailure),
}

fn ws() -> Parser<()> {
    many(&one_of(" \t")).discard()
}

fn sym(c: char) -> Parser<()> {
    ch(c).then_ignore(&ws()).discard()
}

fn integer() -> Parser<i64> {
    many1(&digit())
        .collect_string()
        .bind(|text| match text.parse::<i64>() {
            Ok(value) => pure(value),
            Err(_) => fail("integer"),
        })
        .then_ignore(&ws())
        .labelled("integer")
}

fn clamped_factorial(n: i64) -> i64 {
    if n < 0 {
        return 0;
    }
    // 21! overflows i64; wrap rather than panic on hostile input
    (1..=n.min(20)).fold(1i64, i64::wrapping_mul)
}

fn safe_div(a: i64, b: i64) -> i64 {
    if b == 0 { 0 } else { a.wrapping_div(b) }
}

fn safe_rem(a: i64, b: i64) -> i64 {
    if b == 0 { 0 } else { a.wrapping_rem(b) }
}

/// The expression parser: term, then the precedence table from loosest to
/// tightest binding.
pub fn parser() -> Parser<i64> {
    let expr_ref: Parser<i64> = Parser::recursive();

    let parens = between(&sym('('), &expr_ref, &sym(')'));
    let term = integer().or(&parens).labelled("expression");

    let table = vec![
        Level::InfixNone(vec![
            InfixOp::new(sym('<'), |a, b| i64::from(a < b)),
            InfixOp::new(sym('>'), |a, b| i64::from(a > b)),
        ]),
        Level::InfixLeft(vec![
            InfixOp::new(sym('+'), |a: i64, b| a.wrapping_add(b)),
            InfixOp::new(sym('-'), |a: i64, b| a.wrapping_sub(b)),
        ]),
        Level::InfixLeft(vec![
            InfixOp::new(sym('*'), |a: i64, b| a.wrapping_mul(b)),
            InfixOp::new(sym('/'), safe_div),
            InfixOp::new(sym('%'), safe_rem),
        ]),
        Level::InfixRight(vec![InfixOp::new(sym('^'), |a: i64, b| {
            a.wrapping_pow(b.clamp(0, u32::MAX as i64) as u32)
        })]),
        Level::Prefix(vec![UnaryOp::new(sym('-'), |a: i64| a.wrapping_neg())]),
        Level::Postfix(vec![UnaryOp::new(sym('!'), clamped_factorial)]),
    ];

    let expr = expression(&term, table);
    expr_ref.recurse(expr.clone());
    expr
}

/// Parses and evaluates an expression.
pub fn eval(input: &str) -> Result<i64, CalcError> {
    let full = ws().then(&parser()).then_ignore(&parskit::eof());
    Ok(full.try_run(input)?)
}
