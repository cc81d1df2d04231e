//! The outcome of running a parser.
//!
//! [`ParseResult`] is a two-variant sum: a success carries the parsed value
//! and the stream positioned after it; a failure carries the label of the
//! production that failed and a snapshot of the stream at the point of
//! failure. Failures are ordinary values: `or`/`choice` consume them while
//! trying alternatives, and only [`Parser::try_run`](crate::Parser::try_run)
//! turns one into a Rust error.

use crate::{Parser, Position, Stream};

/// Result of applying a parser to a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult<T> {
    /// The parser matched; `rest` is the stream after the match.
    Success {
        /// The parsed value.
        value: T,
        /// The remaining input.
        rest: Stream,
    },
    /// The parser did not match.
    Failure {
        /// Label of the failed production, shown to end users.
        expected: String,
        /// Stream snapshot at the point of failure.
        got: Stream,
    },
}

use ParseResult::{Failure, Success};

impl<T> ParseResult<T> {
    /// Whether this is a `Success`.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Success { .. })
    }

    /// Whether this is a `Failure`.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Failure { .. })
    }

    /// The success value, if any.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        match self {
            Success { value, .. } => Some(value),
            Failure { .. } => None,
        }
    }

    /// Consumes the result, returning the success value if any.
    #[inline]
    pub fn into_value(self) -> Option<T> {
        match self {
            Success { value, .. } => Some(value),
            Failure { .. } => None,
        }
    }

    /// The remaining stream after a success.
    #[inline]
    pub fn remaining(&self) -> Option<&Stream> {
        match self {
            Success { rest, .. } => Some(rest),
            Failure { .. } => None,
        }
    }

    /// The expected-label of a failure.
    #[inline]
    pub fn expected(&self) -> Option<&str> {
        match self {
            Success { .. } => None,
            Failure { expected, .. } => Some(expected),
        }
    }

    /// The stream snapshot of a failure.
    #[inline]
    pub fn got(&self) -> Option<&Stream> {
        match self {
            Success { .. } => None,
            Failure { got, .. } => Some(got),
        }
    }

    /// The position the result points at: after the match on success, at the
    /// point of failure otherwise.
    #[inline]
    pub fn position(&self) -> Position {
        match self {
            Success { rest, .. } => rest.position(),
            Failure { got, .. } => got.position(),
        }
    }

    /// Applies `f` to the success value; failures pass through unchanged.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<U> {
        match self {
            Success { value, rest } => Success {
                value: f(value),
                rest,
            },
            Failure { expected, got } => Failure { expected, got },
        }
    }

    /// Drops the success value; failures pass through unchanged.
    pub fn discard(self) -> ParseResult<()> {
        self.map(|_| ())
    }

    /// On success, runs `p` on the remaining stream and returns its result;
    /// a failure passes through unchanged.
    pub fn continue_with<U: 'static>(self, p: &Parser<U>) -> ParseResult<U> {
        match self {
            Success { rest, .. } => p.run(rest),
            Failure { expected, got } => Failure { expected, got },
        }
    }

}

impl ParseResult<String> {
    /// Concatenates two string-valued results.
    ///
    /// Both must be successes; the concatenated value is paired with the
    /// later remaining stream. Either failure short-circuits.
    pub fn append(self, other: ParseResult<String>) -> ParseResult<String> {
        match (self, other) {
            (Success { value: a, .. }, Success { value: b, rest }) => Success {
                value: a + &b,
                rest,
            },
            (failure @ Failure { .. }, _) => failure,
            (_, failure @ Failure { .. }) => failure,
        }
    }
}
