//! Combinators: everything that builds bigger parsers out of smaller ones.
//!
//! Sequencing, choice, repetition, mapping, and binding live here, as
//! methods on [`Parser`] where chaining reads naturally and as free
//! functions where a combinator is n-ary or stands alone.
//!
//! # Backtracking discipline
//!
//! The library commits the way an LL(1) parser does: [`Parser::or`] and
//! [`choice`] try the next alternative only when the failed branch consumed
//! *no input*. A branch that consumes and then fails has committed, and its
//! failure is the overall failure; that keeps error positions sharp and
//! grammars predictable. Wrap a branch in [`attempt`] to opt into full
//! backtracking: `attempt` restores the stream on any failure, making the
//! branch look unconsuming to the enclosing choice.

use crate::{ParseResult, Parser, Stream};

use ParseResult::{Failure, Success};

/// Strips the outer parentheses from a combined alternative label so that
/// chained choices flatten to `(a or b or c)` instead of nesting.
fn strip_alternatives(label: &str) -> &str {
    if label.starts_with('(') && label.ends_with(')') && label.contains(" or ") {
        &label[1..label.len() - 1]
    } else {
        label
    }
}

impl<T: 'static> Parser<T> {
    /// Replaces the expected-label reported when this parser fails.
    ///
    /// Successes pass through unchanged. Use this to surface grammar-level
    /// names (`"JSON value"`) instead of character-level internals.
    pub fn labelled(&self, label: impl Into<String>) -> Parser<T> {
        let label = label.into();
        let inner = self.clone();
        Parser::make(label.clone(), move |input| match inner.run(input) {
            success @ Success { .. } => success,
            Failure { got, .. } => Failure {
                expected: label.clone(),
                got,
            },
        })
    }

    /// Transforms the parsed value through `f`.
    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Parser<U> {
        let inner = self.clone();
        Parser::make(self.label().to_string(), move |input| {
            inner.run(input).map(&f)
        })
    }

    /// [`map`](Parser::map) under a name that reads well for AST node
    /// construction: `digits.construct(Literal::new)`.
    pub fn construct<U: 'static>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Parser<U> {
        self.map(f)
    }

    /// Monadic bind: feeds the parsed value to `f`, then runs the parser it
    /// returns on the remaining input.
    ///
    /// The continuation parser depends on a runtime value, so this is the
    /// one place dynamic dispatch is unavoidable.
    pub fn bind<U: 'static>(
        &self,
        f: impl Fn(T) -> Parser<U> + Send + Sync + 'static,
    ) -> Parser<U> {
        let inner = self.clone();
        Parser::make(self.label().to_string(), move |input| {
            match inner.run(input) {
                Success { value, rest } => f(value).run(rest),
                Failure { expected, got } => Failure { expected, got },
            }
        })
    }

    /// Runs `self` then `next`, yielding `next`'s value.
    pub fn then<U: 'static>(&self, next: &Parser<U>) -> Parser<U> {
        let a = self.clone();
        let b = next.clone();
        let label = format!("({} then {})", self.label(), next.label());
        Parser::make(label, move |input| a.run(input).continue_with(&b))
    }

    /// Runs `self` then `next`, yielding `self`'s value.
    pub fn then_ignore<U: 'static>(&self, next: &Parser<U>) -> Parser<T> {
        let a = self.clone();
        let b = next.clone();
        let label = format!("({} then {})", self.label(), next.label());
        Parser::make(label, move |input| match a.run(input) {
            Success { value, rest } => match b.run(rest) {
                Success { rest, .. } => Success { value, rest },
                Failure { expected, got } => Failure { expected, got },
            },
            Failure { expected, got } => Failure { expected, got },
        })
    }

    /// Runs `self` then `next`, yielding both values as a pair.
    pub fn and<U: 'static>(&self, next: &Parser<U>) -> Parser<(T, U)> {
        let a = self.clone();
        let b = next.clone();
        let label = format!("({} then {})", self.label(), next.label());
        Parser::make(label, move |input| match a.run(input) {
            Success { value: first, rest } => match b.run(rest) {
                Success { value: second, rest } => Success {
                    value: (first, second),
                    rest,
                },
                Failure { expected, got } => Failure { expected, got },
            },
            Failure { expected, got } => Failure { expected, got },
        })
    }

    /// Tries `self`; if it fails *without consuming input*, tries `other`
    /// on the restored stream.
    ///
    /// When both alternatives fail without consuming, the failure combines
    /// their labels as `(a or b)` at the original position. A branch that
    /// consumed input has committed: its failure is returned as-is.
    pub fn or(&self, other: &Parser<T>) -> Parser<T> {
        let label = format!(
            "({} or {})",
            strip_alternatives(self.label()),
            strip_alternatives(other.label())
        );
        let a = self.clone();
        let b = other.clone();
        Parser::make(label.clone(), move |input: Stream| {
            let start = input.clone();
            match a.run(input) {
                success @ Success { .. } => success,
                Failure { expected, got } => {
                    if got.position().offset > start.position().offset {
                        return Failure { expected, got };
                    }
                    match b.run(start.clone()) {
                        success @ Success { .. } => success,
                        Failure { expected, got } => {
                            if got.position().offset > start.position().offset {
                                Failure { expected, got }
                            } else {
                                Failure {
                                    expected: label.clone(),
                                    got: start.clone(),
                                }
                            }
                        }
                    }
                }
            }
        })
    }

    /// Makes the parser optional: `Some(value)` on success, `None` (and no
    /// consumption) when it fails without consuming. A consuming failure
    /// has committed and propagates.
    pub fn optional(&self) -> Parser<Option<T>> {
        let inner = self.clone();
        let label = format!("optional {}", self.label());
        Parser::make(label, move |input: Stream| {
            let start = input.clone();
            match inner.run(input) {
                Success { value, rest } => Success {
                    value: Some(value),
                    rest,
                },
                Failure { expected, got } => {
                    if got.position().offset > start.position().offset {
                        Failure { expected, got }
                    } else {
                        Success {
                            value: None,
                            rest: start,
                        }
                    }
                }
            }
        })
    }

    /// Replaces the parsed value with a constant.
    pub fn to<U: Clone + Send + Sync + 'static>(&self, value: U) -> Parser<U> {
        self.map(move |_| value.clone())
    }

    /// Drops the parsed value.
    pub fn discard(&self) -> Parser<()> {
        self.map(|_| ())
    }

    /// Calls `sink` with every successfully parsed value, passing the value
    /// through unchanged. An observation hook for tracing and testing.
    pub fn inspect(&self, sink: impl Fn(&T) + Send + Sync + 'static) -> Parser<T> {
        let inner = self.clone();
        Parser::make(self.label().to_string(), move |input| {
            match inner.run(input) {
                Success { value, rest } => {
                    sink(&value);
                    Success { value, rest }
                }
                failure => failure,
            }
        })
    }
}

impl Parser<String> {
    /// Concatenates this parser's string with `next`'s.
    pub fn append(&self, next: &Parser<String>) -> Parser<String> {
        let label = format!("({} then {})", self.label(), next.label());
        let a = self.clone();
        let b = next.clone();
        Parser::make(label, move |input| match a.run(input) {
            Success { value, rest } => b.run(rest).map(move |v| value + &v),
            Failure { expected, got } => Failure { expected, got },
        })
    }
}

impl Parser<char> {
    /// Adapts a character parser to a string parser.
    pub fn as_string(&self) -> Parser<String> {
        self.map(String::from)
    }
}

impl Parser<Vec<char>> {
    /// Collects a parsed character sequence into a `String`.
    pub fn collect_string(&self) -> Parser<String> {
        self.map(|chars| chars.into_iter().collect())
    }
}

/// Applicative application: runs `pf` to obtain a function, then `px` to
/// obtain its argument.
pub fn apply<T: 'static, U: 'static, F>(pf: &Parser<F>, px: &Parser<T>) -> Parser<U>
where
    F: Fn(T) -> U + Send + Sync + 'static,
{
    let px = px.clone();
    pf.bind(move |f| px.map(move |x| f(x)))
}

/// Tries each alternative in order, returning the first success.
///
/// Follows the same commitment rule as [`Parser::or`]: a branch that fails
/// after consuming input ends the search. When every branch fails without
/// consuming, the failure combines all labels at the original position.
///
/// # Panics
///
/// Panics on an empty alternative list: that grammar is malformed.
pub fn choice<T: 'static>(parsers: Vec<Parser<T>>) -> Parser<T> {
    assert!(
        !parsers.is_empty(),
        "choice() requires at least one alternative"
    );
    let label = format!(
        "({})",
        parsers
            .iter()
            .map(|p| strip_alternatives(p.label()).to_string())
            .collect::<Vec<_>>()
            .join(" or ")
    );
    Parser::make(label.clone(), move |input: Stream| {
        let start = input.clone();
        for p in &parsers {
            match p.run(start.clone()) {
                success @ Success { .. } => return success,
                Failure { expected, got } => {
                    if got.position().offset > start.position().offset {
                        return Failure { expected, got };
                    }
                }
            }
        }
        Failure {
            expected: label.clone(),
            got: start,
        }
    })
}

/// Runs the parsers in order, collecting their values.
///
/// Atomic: any failure rolls the stream back to where the first parser
/// started, so an enclosing choice can still try alternatives.
pub fn collect<T: 'static>(parsers: Vec<Parser<T>>) -> Parser<Vec<T>> {
    Parser::make("sequence", move |mut input: Stream| {
        input.begin();
        let mut values = Vec::with_capacity(parsers.len());
        let mut rest = input;
        for p in &parsers {
            match p.run(rest) {
                Success { value, rest: after } => {
                    values.push(value);
                    rest = after;
                }
                Failure { expected, mut got } => {
                    got.rollback();
                    return Failure { expected, got };
                }
            }
        }
        rest.commit();
        Success { value: values, rest }
    })
}

/// Zero or more successive matches of `p`.
///
/// Stops at the first failure that consumed nothing. A failure that
/// consumed input is a hard failure and propagates. A zero-width success
/// also stops the loop, so `many(pure(x))` terminates.
pub fn many<T: 'static>(p: &Parser<T>) -> Parser<Vec<T>> {
    let inner = p.clone();
    let label = format!("many {}", p.label());
    Parser::make(label, move |input: Stream| {
        let mut values = Vec::new();
        let mut rest = input;
        loop {
            let mark = rest.clone();
            match inner.run(rest) {
                Success { value, rest: after } => {
                    let stalled = after.position().offset == mark.position().offset;
                    values.push(value);
                    rest = after;
                    if stalled {
                        break;
                    }
                }
                Failure { expected, got } => {
                    if got.position().offset > mark.position().offset {
                        return Failure { expected, got };
                    }
                    rest = mark;
                    break;
                }
            }
        }
        Success { value: values, rest }
    })
}

/// One or more successive matches of `p`.
pub fn many1<T: 'static>(p: &Parser<T>) -> Parser<Vec<T>> {
    let label = format!("at least one {}", p.label());
    p.and(&many(p))
        .map(|(first, mut tail)| {
            tail.insert(0, first);
            tail
        })
        .with_label(label)
}

/// Runs `open`, then `inner`, then `close`, yielding `inner`'s value.
pub fn between<A: 'static, T: 'static, B: 'static>(
    open: &Parser<A>,
    inner: &Parser<T>,
    close: &Parser<B>,
) -> Parser<T> {
    open.then(inner).then_ignore(close)
}

/// Exactly `n` successive matches of `p`.
pub fn exactly<T: 'static>(n: usize, p: &Parser<T>) -> Parser<Vec<T>> {
    let inner = p.clone();
    let label = format!("{} times {}", n, p.label());
    Parser::make(label, move |input: Stream| {
        let mut values = Vec::with_capacity(n);
        let mut rest = input;
        for _ in 0..n {
            match inner.run(rest) {
                Success { value, rest: after } => {
                    values.push(value);
                    rest = after;
                }
                Failure { expected, got } => return Failure { expected, got },
            }
        }
        Success { value: values, rest }
    })
}

/// Zero or more `p`, separated by `sep`. Yields the `p` values.
pub fn sep_by<T: 'static, S: 'static>(p: &Parser<T>, sep: &Parser<S>) -> Parser<Vec<T>> {
    let first = p.clone();
    let tail = many(&sep.then(p));
    let label = format!("{} separated by {}", p.label(), sep.label());
    Parser::make(label, move |input: Stream| {
        let start = input.clone();
        match first.run(input) {
            Failure { expected, got } => {
                if got.position().offset > start.position().offset {
                    Failure { expected, got }
                } else {
                    Success {
                        value: Vec::new(),
                        rest: start,
                    }
                }
            }
            Success { value, rest } => match tail.run(rest) {
                Success {
                    value: mut values,
                    rest,
                } => {
                    values.insert(0, value);
                    Success { value: values, rest }
                }
                Failure { expected, got } => Failure { expected, got },
            },
        }
    })
}

/// One or more `p`, separated by `sep`.
pub fn sep_by1<T: 'static, S: 'static>(p: &Parser<T>, sep: &Parser<S>) -> Parser<Vec<T>> {
    let tail = many(&sep.then(p));
    p.and(&tail).map(|(first, mut values)| {
        values.insert(0, first);
        values
    })
}

/// Succeeds, consuming nothing, exactly when `p` would fail.
pub fn not<T: 'static>(p: &Parser<T>) -> Parser<()> {
    let inner = p.clone();
    let label = format!("not {}", p.label());
    Parser::make(label.clone(), move |input: Stream| {
        match inner.run(input.clone()) {
            Success { .. } => Failure {
                expected: label.clone(),
                got: input,
            },
            Failure { .. } => Success {
                value: (),
                rest: input,
            },
        }
    })
}

/// Runs `p` for its value but restores the stream on success, consuming
/// nothing. Failures propagate.
pub fn look_ahead<T: 'static>(p: &Parser<T>) -> Parser<T> {
    let inner = p.clone();
    let label = format!("lookahead {}", p.label());
    Parser::make(label, move |input: Stream| {
        match inner.run(input.clone()) {
            Success { value, .. } => Success { value, rest: input },
            failure => failure,
        }
    })
}

/// Opts `p` into full backtracking: on any failure the stream is restored
/// to where `p` started, so an enclosing choice treats the branch as
/// unconsuming.
pub fn attempt<T: 'static>(p: &Parser<T>) -> Parser<T> {
    let inner = p.clone();
    Parser::make(p.label().to_string(), move |mut input: Stream| {
        input.begin();
        match inner.run(input) {
            Success { value, mut rest } => {
                rest.commit();
                Success { value, rest }
            }
            Failure { expected, mut got } => {
                got.rollback();
                Failure { expected, got }
            }
        }
    })
}

/// N-ary string concatenation: runs each parser in order and joins their
/// strings. Any failure short-circuits.
pub fn assemble(parsers: Vec<Parser<String>>) -> Parser<String> {
    let label = format!(
        "({})",
        parsers
            .iter()
            .map(|p| p.label().to_string())
            .collect::<Vec<_>>()
            .join(" then ")
    );
    Parser::make(label, move |input: Stream| {
        let mut assembled = String::new();
        let mut rest = input;
        for p in &parsers {
            match p.run(rest) {
                Success { value, rest: after } => {
                    assembled.push_str(&value);
                    rest = after;
                }
                Failure { expected, got } => return Failure { expected, got },
            }
        }
        Success {
            value: assembled,
            rest,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{ch, digit, pure, string};

    #[test]
    fn test_then_keeps_second_value() {
        let p = ch('a').then(&ch('b'));
        let result = p.run(Stream::new("abc"));
        assert_eq!(result.value(), Some(&'b'));
        assert_eq!(result.remaining().unwrap().rest(), "c");
    }

    #[test]
    fn test_then_ignore_keeps_first_value() {
        let p = ch('a').then_ignore(&ch('b'));
        assert_eq!(p.try_run("ab"), Ok('a'));
    }

    #[test]
    fn test_or_combines_labels_on_total_failure() {
        let p = ch('a').or(&ch('b'));
        let result = p.run(Stream::new("cd"));
        assert_eq!(result.expected(), Some("('a' or 'b')"));
        assert_eq!(result.got().unwrap().position().offset, 0);
    }

    #[test]
    fn test_or_chain_flattens_labels() {
        let p = ch('a').or(&ch('b')).or(&ch('c'));
        let result = p.run(Stream::new("z"));
        assert_eq!(result.expected(), Some("('a' or 'b' or 'c')"));
    }

    #[test]
    fn test_or_commits_after_consumption() {
        // First branch consumes 'a' then fails on 'b'; second branch must
        // not be tried.
        let p = ch('a').then(&ch('b')).or(&ch('a').then(&ch('c')));
        let result = p.run(Stream::new("ac"));
        assert!(result.is_failure());
        assert_eq!(result.expected(), Some("'b'"));
    }

    #[test]
    fn test_attempt_restores_consumed_input() {
        let p = attempt(&ch('a').then(&ch('b'))).or(&ch('a').then(&ch('c')));
        assert_eq!(p.try_run("ac"), Ok('c'));
    }

    #[test]
    fn test_choice_first_success_wins() {
        let p = choice(vec![string("let"), string("letrec"), string("in")]);
        assert_eq!(p.try_run("let x"), Ok("let".to_string()));
    }

    #[test]
    fn test_many_collects_until_mismatch() {
        let p = many(&ch('a')).collect_string();
        let result = p.run(Stream::new("aaab"));
        assert_eq!(result.value().map(String::as_str), Some("aaa"));
        assert_eq!(result.remaining().unwrap().rest(), "b");
    }

    #[test]
    fn test_many_accepts_zero_matches() {
        let p = many(&ch('a'));
        let result = p.run(Stream::new("bbb"));
        assert_eq!(result.value().map(Vec::len), Some(0));
    }

    #[test]
    fn test_many1_requires_one() {
        let p = many1(&ch('a')).collect_string();
        assert_eq!(p.try_run("aaab"), Ok("aaa".to_string()));
        assert!(many1(&ch('a')).try_run("b").is_err());
    }

    #[test]
    fn test_between_returns_inner() {
        let p = between(&ch('('), &digit(), &ch(')'));
        assert_eq!(p.try_run("(7)"), Ok('7'));
    }

    #[test]
    fn test_collect_is_atomic() {
        let p = collect(vec![ch('a'), ch('b'), ch('c')]);
        let result = p.run(Stream::new("abX"));
        assert!(result.is_failure());
        // Rolled back to the start, so an enclosing or can still fire
        assert_eq!(result.got().unwrap().position().offset, 0);

        let recovered = collect(vec![ch('a'), ch('b'), ch('c')]).or(&collect(vec![ch('a'), ch('b')]));
        assert_eq!(recovered.try_run("abX"), Ok(vec!['a', 'b']));
    }

    #[test]
    fn test_exactly() {
        let p = exactly(3, &digit()).collect_string();
        assert_eq!(p.try_run("12345"), Ok("123".to_string()));
        assert!(exactly(3, &digit()).try_run("12").is_err());
    }

    #[test]
    fn test_sep_by_variants() {
        let p = sep_by(&digit(), &ch(','));
        assert_eq!(p.try_run("1,2,3"), Ok(vec!['1', '2', '3']));
        assert_eq!(p.try_run(""), Ok(vec![]));
        assert!(sep_by1(&digit(), &ch(',')).try_run("x").is_err());
    }

    #[test]
    fn test_optional_returns_none_without_consuming() {
        let p = ch('-').optional().and(&digit());
        assert_eq!(p.try_run("-5"), Ok((Some('-'), '5')));
        assert_eq!(p.try_run("5"), Ok((None, '5')));
    }

    #[test]
    fn test_not_consumes_nothing() {
        let keyword = string("let").then_ignore(&not(&crate::primitives::alphanumeric()));
        assert!(keyword.try_run("letter").is_err());
        assert_eq!(keyword.try_run("let x"), Ok("let".to_string()));
    }

    #[test]
    fn test_look_ahead_restores_stream() {
        let p = look_ahead(&string("ab")).and(&string("abc"));
        assert_eq!(
            p.try_run("abc"),
            Ok(("ab".to_string(), "abc".to_string()))
        );
    }

    #[test]
    fn test_bind_selects_next_parser() {
        // A length-prefixed field: digit n, then exactly n letters
        let p = digit().bind(|d| {
            let n = d.to_digit(10).unwrap_or(0) as usize;
            exactly(n, &crate::primitives::alpha()).collect_string()
        });
        assert_eq!(p.try_run("3abcde"), Ok("abc".to_string()));
        assert!(p.try_run("3ab").is_err());
    }

    #[test]
    fn test_apply() {
        let doubler = pure(|n: char| n.to_digit(10).unwrap_or(0) * 2);
        let p = apply(&doubler, &digit());
        assert_eq!(p.try_run("4"), Ok(8));
    }

    #[test]
    fn test_append_and_assemble() {
        let p = ch('a').as_string().append(&ch('b').as_string());
        assert_eq!(p.try_run("ab"), Ok("ab".to_string()));

        let q = assemble(vec![
            string("foo"),
            string("-"),
            string("bar"),
        ]);
        assert_eq!(q.try_run("foo-bar"), Ok("foo-bar".to_string()));
    }

    #[test]
    fn test_to_and_inspect() {
        let p = string("true").to(true);
        assert_eq!(p.try_run("true"), Ok(true));

        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&seen);
        let observed = digit().inspect(move |c| sink.lock().unwrap().push(*c));
        let _ = many(&observed).try_run("123");
        assert_eq!(*seen.lock().unwrap(), vec!['1', '2', '3']);
    }

    #[test]
    fn test_labelled_rewrites_failure() {
        let p = digit().labelled("a number");
        let result = p.run(Stream::new("x"));
        assert_eq!(result.expected(), Some("a number"));
    }
}
