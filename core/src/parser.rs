//! First-class parser values.
//!
//! A [`Parser<T>`] owns a parsing function `Stream -> ParseResult<T>` plus a
//! human-readable label for error messages. Parsers are built by the
//! constructors in [`primitives`](crate::primitives) and composed with the
//! methods and free functions in [`combinators`](crate::combinators); this
//! module provides the wrapper itself, the runner entry points, and the
//! two-phase binding that makes recursive grammars possible.
//!
//! # Recursive grammars
//!
//! A grammar that refers to itself (a JSON value containing arrays of JSON
//! values, say) is built in two phases: declare a forward reference with
//! [`Parser::recursive`], compose the grammar against it, then bind the body
//! once with [`Parser::recurse`]. Running a parser whose body was never
//! bound is a configuration error and panics: the grammar is malformed, and
//! no combinator will catch that.
//!
//! ```ignore
//! let value = Parser::recursive();
//! let array = between(ch('['), sep_by(value.clone(), ch(',')), ch(']'));
//! value.recurse(array.or(&number));
//! ```
//!
//! # Sharing
//!
//! Once every recursive reference is bound, parser values are immutable.
//! They are `Clone + Send + Sync`, so one grammar can serve concurrent
//! *independent* parses, each with its own [`Stream`].

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::{ParseResult, ParserFailure, Stream};

/// The boxed parsing function inside every parser.
pub(crate) type ParseFn<T> = Arc<dyn Fn(Stream) -> ParseResult<T> + Send + Sync>;

/// The body of a parser: either bound at construction, or a late-bound cell
/// filled exactly once by [`Parser::recurse`].
enum Body<T> {
    Bound(ParseFn<T>),
    Deferred(Arc<OnceLock<ParseFn<T>>>),
}

impl<T> Clone for Body<T> {
    fn clone(&self) -> Self {
        match self {
            Body::Bound(f) => Body::Bound(Arc::clone(f)),
            Body::Deferred(cell) => Body::Deferred(Arc::clone(cell)),
        }
    }
}

/// A composable parser producing values of type `T`.
pub struct Parser<T> {
    label: Arc<str>,
    body: Body<T>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            body: self.body.clone(),
        }
    }
}

impl<T: 'static> Parser<T> {
    /// Wraps a parsing function with a label.
    ///
    /// The label names the production in error messages, so write it for end
    /// users: `"digit"`, `"'{'"`, `"JSON value"`.
    pub fn make(
        label: impl Into<String>,
        f: impl Fn(Stream) -> ParseResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: Arc::from(label.into()),
            body: Body::Bound(Arc::new(f)),
        }
    }

    /// Declares a forward reference for a recursive grammar.
    ///
    /// The returned parser has no body yet; compose the grammar against
    /// clones of it, then bind the body once with [`Parser::recurse`].
    /// Running it before binding panics.
    pub fn recursive() -> Self {
        Self {
            label: Arc::from("recursive"),
            body: Body::Deferred(Arc::new(OnceLock::new())),
        }
    }

    /// Binds the body of a forward reference declared with
    /// [`Parser::recursive`].
    ///
    /// The bound body enforces the stream's recursion-depth limit on every
    /// re-entry, so hostile nesting fails cleanly instead of overflowing the
    /// stack.
    ///
    /// # Panics
    ///
    /// Panics when called on a parser not created by [`Parser::recursive`],
    /// or when called a second time; both are configuration errors.
    pub fn recurse(&self, inner: Parser<T>) {
        let cell = match &self.body {
            Body::Deferred(cell) => Arc::clone(cell),
            Body::Bound(_) => panic!("recurse() called on a non-recursive parser"),
        };
        let f: ParseFn<T> = Arc::new(move |mut input: Stream| {
            if input.enter_nested().is_err() {
                return ParseResult::Failure {
                    expected: "recursion limit".to_string(),
                    got: input,
                };
            }
            match inner.run(input) {
                ParseResult::Success { value, mut rest } => {
                    rest.exit_nested();
                    ParseResult::Success { value, rest }
                }
                ParseResult::Failure { expected, mut got } => {
                    got.exit_nested();
                    ParseResult::Failure { expected, got }
                }
            }
        });
        if cell.set(f).is_err() {
            panic!("recurse() called twice on the same recursive parser");
        }
    }

    /// Whether this parser is a forward reference still awaiting its body.
    pub fn is_pending(&self) -> bool {
        matches!(&self.body, Body::Deferred(cell) if cell.get().is_none())
    }

    /// Runs the parser on a stream.
    ///
    /// # Panics
    ///
    /// Panics if this parser is an unbound forward reference (see
    /// [`Parser::recursive`]).
    pub fn run(&self, input: Stream) -> ParseResult<T> {
        match &self.body {
            Body::Bound(f) => f(input),
            Body::Deferred(cell) => match cell.get() {
                Some(f) => f(input),
                None => panic!(
                    "recursive parser '{}' was run before recurse() bound its body",
                    self.label
                ),
            },
        }
    }

    /// Runs the parser on a string, surfacing failure as a
    /// [`ParserFailure`] error.
    ///
    /// Convenience boundary for callers who prefer `Result` plumbing over
    /// matching on [`ParseResult`].
    pub fn try_run(&self, input: &str) -> Result<T, ParserFailure> {
        self.try_run_stream(Stream::new(input))
    }

    /// As [`Parser::try_run`], but on a caller-built stream (named input,
    /// custom limits).
    pub fn try_run_stream(&self, input: Stream) -> Result<T, ParserFailure> {
        match self.run(input) {
            ParseResult::Success { value, .. } => Ok(value),
            ParseResult::Failure { expected, got } => Err(ParserFailure::new(expected, &got)),
        }
    }

    /// The label shown for this parser in error messages.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the same parser under a new label. Cheap; used by the
    /// relabeling combinator and by constructors that refine labels.
    pub(crate) fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Arc::from(label.into());
        self
    }
}

impl<T> fmt::Debug for Parser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.body {
            Body::Bound(_) => "bound",
            Body::Deferred(cell) if cell.get().is_some() => "recursive",
            Body::Deferred(_) => "pending",
        };
        f.debug_struct("Parser")
            .field("label", &self.label)
            .field("state", &state)
            .finish()
    }
}
