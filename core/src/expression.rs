//! Precedence-table expression parsing.
//!
//! [`expression`] turns a parser for *terms* (literals, identifiers,
//! parenthesized sub-expressions) and an ordered table of operator
//! [`Level`]s into a single parser for full expressions. The table reads
//! from loosest-binding to tightest-binding; within one level every
//! operator shares the same precedence and associativity.
//!
//! The builder is a pure higher-order constructor: each level wraps the
//! level below it using the ordinary combinators, tightest level first, so
//! the parser it returns is the loosest, outermost level.
//!
//! # Example
//!
//! ```ignore
//! let expr = expression(
//!     &number,
//!     vec![
//!         Level::InfixLeft(vec![
//!             InfixOp::new(ch('+').discard(), |a, b| a + b),
//!             InfixOp::new(ch('-').discard(), |a, b| a - b),
//!         ]),
//!         Level::InfixLeft(vec![InfixOp::new(ch('*').discard(), |a, b| a * b)]),
//!     ],
//! );
//! assert_eq!(expr.try_run("1+2*3"), Ok(7));
//! ```

use std::sync::Arc;

use crate::combinators::{choice, many, not};
use crate::primitives::pure;
use crate::Parser;

/// Transform applied by a unary (prefix or postfix) operator.
pub type UnaryFn<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Transform applied by a binary (infix) operator.
pub type BinaryFn<T> = Arc<dyn Fn(T, T) -> T + Send + Sync>;

/// A binary operator: the parser that matches its symbol, and the transform
/// that combines its operands.
pub struct InfixOp<T> {
    symbol: Parser<()>,
    apply: BinaryFn<T>,
}

impl<T> InfixOp<T> {
    /// Pairs an operator symbol with its transform.
    pub fn new(symbol: Parser<()>, apply: impl Fn(T, T) -> T + Send + Sync + 'static) -> Self {
        Self {
            symbol,
            apply: Arc::new(apply),
        }
    }
}

impl<T> Clone for InfixOp<T> {
    fn clone(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            apply: Arc::clone(&self.apply),
        }
    }
}

/// A unary operator: symbol parser plus transform.
pub struct UnaryOp<T> {
    symbol: Parser<()>,
    apply: UnaryFn<T>,
}

impl<T> UnaryOp<T> {
    /// Pairs an operator symbol with its transform.
    pub fn new(symbol: Parser<()>, apply: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        Self {
            symbol,
            apply: Arc::new(apply),
        }
    }
}

impl<T> Clone for UnaryOp<T> {
    fn clone(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            apply: Arc::clone(&self.apply),
        }
    }
}

/// One precedence level: operators of equal binding power sharing one
/// associativity.
pub enum Level<T> {
    /// Left-associative infix operators: `a op b op c` = `(a op b) op c`.
    InfixLeft(Vec<InfixOp<T>>),
    /// Right-associative infix operators: `a op b op c` = `a op (b op c)`.
    InfixRight(Vec<InfixOp<T>>),
    /// Non-associative infix operators: at most one application; chaining
    /// two at the same level is a parse failure.
    InfixNone(Vec<InfixOp<T>>),
    /// Prefix operators, folded right-to-left: `- - a` = `-(-a)`.
    Prefix(Vec<UnaryOp<T>>),
    /// Postfix operators, folded left-to-right: `a ! !` = `(a!)!`.
    Postfix(Vec<UnaryOp<T>>),
}

/// Failure label produced when two non-associative operators of the same
/// level are chained.
pub const NON_ASSOC_CHAIN: &str = "non-associative operator used associatively";

/// Builds an expression parser from a term parser and a precedence table.
///
/// `levels` is ordered from lowest (loosest-binding) to highest
/// (tightest-binding) precedence. Each level wraps the one below it; the
/// term parser sits at the bottom.
pub fn expression<T>(term: &Parser<T>, levels: Vec<Level<T>>) -> Parser<T>
where
    T: Clone + Send + Sync + 'static,
{
    levels
        .into_iter()
        .rev()
        .fold(term.clone(), |below, level| wrap_level(below, level))
}

/// A parser matching any operator symbol of a level, yielding its transform.
fn infix_operator<T: 'static>(ops: Vec<InfixOp<T>>) -> Parser<BinaryFn<T>> {
    choice(ops.into_iter().map(|op| op.symbol.to(op.apply)).collect())
}

fn unary_operator<T: 'static>(ops: Vec<UnaryOp<T>>) -> Parser<UnaryFn<T>> {
    choice(ops.into_iter().map(|op| op.symbol.to(op.apply)).collect())
}

fn wrap_level<T>(below: Parser<T>, level: Level<T>) -> Parser<T>
where
    T: Clone + Send + Sync + 'static,
{
    let wrapped = match level {
        Level::InfixLeft(ops) => {
            let op = infix_operator(ops);
            below.and(&many(&op.and(&below))).map(|(first, tail)| {
                tail.into_iter()
                    .fold(first, |acc, (apply, operand)| apply(acc, operand))
            })
        }
        Level::InfixRight(ops) => {
            let op = infix_operator(ops);
            below.and(&many(&op.and(&below))).map(|(first, tail)| {
                let mut reversed = tail.into_iter().rev();
                match reversed.next() {
                    None => first,
                    Some((apply, operand)) => {
                        // Walk the chain right-to-left; each transform waits
                        // for its left operand.
                        let mut acc = operand;
                        let mut pending = apply;
                        for (apply, operand) in reversed {
                            acc = pending(operand, acc);
                            pending = apply;
                        }
                        pending(first, acc)
                    }
                }
            })
        }
        Level::InfixNone(ops) => {
            let op = infix_operator(ops.clone());
            let chained = infix_operator(ops);
            below
                .and(&op.and(&below).optional())
                .bind(move |(first, application)| match application {
                    None => pure(first),
                    Some((apply, second)) => {
                        let value = apply(first, second);
                        not(&chained).labelled(NON_ASSOC_CHAIN).to(value)
                    }
                })
        }
        Level::Prefix(ops) => {
            let op = unary_operator(ops);
            many(&op).and(&below).map(|(prefixes, operand)| {
                prefixes
                    .into_iter()
                    .rev()
                    .fold(operand, |acc, apply| apply(acc))
            })
        }
        Level::Postfix(ops) => {
            let op = unary_operator(ops);
            below.and(&many(&op)).map(|(operand, postfixes)| {
                postfixes.into_iter().fold(operand, |acc, apply| apply(acc))
            })
        }
    };
    wrapped.with_label("expression")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::many1;
    use crate::primitives::{ch, digit};

    fn int() -> Parser<i64> {
        many1(&digit())
            .collect_string()
            .map(|s| s.parse().unwrap_or(0))
            .labelled("integer")
    }

    fn plus() -> InfixOp<i64> {
        InfixOp::new(ch('+').discard(), |a, b| a + b)
    }

    fn minus() -> InfixOp<i64> {
        InfixOp::new(ch('-').discard(), |a, b| a - b)
    }

    #[test]
    fn test_infix_left_folds_left() {
        let expr = expression(&int(), vec![Level::InfixLeft(vec![minus()])]);
        // (10 - 3) - 4
        assert_eq!(expr.try_run("10-3-4"), Ok(3));
    }

    #[test]
    fn test_infix_right_folds_right() {
        let expr = expression(&int(), vec![Level::InfixRight(vec![minus()])]);
        // 1 - (2 - 3)
        assert_eq!(expr.try_run("1-2-3"), Ok(2));
    }

    #[test]
    fn test_mixed_precedence() {
        let times = InfixOp::new(ch('*').discard(), |a, b| a * b);
        let expr = expression(
            &int(),
            vec![
                Level::InfixLeft(vec![plus(), minus()]),
                Level::InfixLeft(vec![times]),
            ],
        );
        assert_eq!(expr.try_run("1+2*3"), Ok(7));
        assert_eq!(expr.try_run("2*3+1"), Ok(7));
    }

    #[test]
    fn test_prefix_folds_outside_in() {
        let neg = UnaryOp::new(ch('-').discard(), |a: i64| -a);
        let expr = expression(&int(), vec![Level::Prefix(vec![neg])]);
        assert_eq!(expr.try_run("--5"), Ok(5));
        assert_eq!(expr.try_run("-5"), Ok(-5));
    }

    #[test]
    fn test_postfix_folds_left_to_right() {
        let incr = UnaryOp::new(ch('+').discard(), |a: i64| a + 1);
        let expr = expression(&int(), vec![Level::Postfix(vec![incr])]);
        assert_eq!(expr.try_run("5++"), Ok(7));
    }

    #[test]
    fn test_non_assoc_single_application() {
        let less = InfixOp::new(ch('<').discard(), |a, b| i64::from(a < b));
        let expr = expression(&int(), vec![Level::InfixNone(vec![less])]);
        assert_eq!(expr.try_run("1<2"), Ok(1));
    }

    #[test]
    fn test_non_assoc_chain_fails() {
        let less = InfixOp::new(ch('<').discard(), |a, b| i64::from(a < b));
        let expr = expression(&int(), vec![Level::InfixNone(vec![less])]);
        let err = expr.try_run("1<2<3").unwrap_err();
        assert_eq!(err.expected, NON_ASSOC_CHAIN);
        // Reported at the second operator site
        assert_eq!(err.position.column, 4);
    }
}
