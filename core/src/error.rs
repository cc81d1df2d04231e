//! Error types for parskit.
//!
//! Two kinds of errors leave this library, and they travel differently:
//!
//! - **Parse failures** flow as values: the [`Failure`](crate::ParseResult)
//!   variant of a parse result, which `or`/`choice` may consume while trying
//!   alternatives. [`Error`] covers the low-level stream conditions that
//!   become such failures (end of input, recursion limit).
//! - **[`ParserFailure`]** is the user-facing boundary: raised by
//!   [`Parser::try_run`](crate::Parser::try_run) when the root parser fails,
//!   carrying the expected label, the offending position, and a rendered
//!   report with a line excerpt and caret.
//!
//! Configuration errors (running an unbound recursive parser, unbalanced
//! transaction calls, an empty `string` literal) are bugs in the grammar,
//! not in the input. They panic and are never caught by combinators.

use core::fmt;

use crate::{Position, Stream};

/// Low-level stream and resource errors.
///
/// These are internal conditions that surface as ordinary parse failures;
/// they are exposed so stream-level callers can discriminate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A `take` that requires input ran off the end of the stream.
    EndOfStream,

    /// Recursion limit exceeded while running a recursive parser.
    ///
    /// Deeply nested input like `[[[[[[...]]]]]]` triggers this once nesting
    /// passes [`ParseConfig::max_recursion_depth`](crate::ParseConfig).
    RecursionLimitExceeded {
        /// Depth reached when the limit was exceeded.
        depth: usize,
        /// The configured maximum depth.
        limit: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EndOfStream => write!(f, "end of input"),
            Error::RecursionLimitExceeded { depth, limit } => {
                write!(f, "recursion limit exceeded: depth {} > limit {}", depth, limit)
            }
        }
    }
}

impl std::error::Error for Error {}

/// A parse failure surfaced as a Rust error.
///
/// Produced by [`Parser::try_run`](crate::Parser::try_run) for callers who
/// prefer `Result` plumbing over matching on
/// [`ParseResult`](crate::ParseResult). The `Display` implementation renders
/// a full report:
///
/// ```text
/// parse error: expected one of: 'a', 'b', found 'c'
///  --> input.txt:1:3
///   |
/// 1 | ccab
///   |   ^
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserFailure {
    /// Label of the failed production, as carried by the failure.
    pub expected: String,
    /// Description of what was found instead (a character, or end of input).
    pub found: String,
    /// Name of the input, as given to the stream factory.
    pub filename: String,
    /// Where the failure occurred.
    pub position: Position,
    /// The full text of the offending line, for the excerpt.
    line: String,
}

impl ParserFailure {
    /// Builds a failure report from a failed production's label and the
    /// stream snapshot at the point of failure.
    pub fn new(expected: impl Into<String>, got: &Stream) -> Self {
        let position = got.position();
        let found = match got.peek1() {
            Some(c) => format!("'{}'", c.escape_debug()),
            None => "end of input".to_string(),
        };
        let line = got
            .source()
            .lines()
            .nth(position.line.saturating_sub(1))
            .unwrap_or("")
            .to_string();
        Self {
            expected: expected.into(),
            found,
            filename: got.filename().to_string(),
            position,
            line,
        }
    }

    /// The one-line summary, without the source excerpt.
    ///
    /// A combined alternative label of the form `(a or b or c)` is unpacked
    /// into `expected one of: a, b, c`; every other label renders as
    /// `expected <label>`.
    pub fn summary(&self) -> String {
        let expected = render_expected(&self.expected);
        format!("{}, found {}", expected, self.found)
    }
}

/// Renders an expected-label for presentation.
///
/// Labels are combined by `or`/`choice` into `(a or b or ...)`; this unpacks
/// them for the error message. Labels written by grammar authors pass
/// through untouched.
fn render_expected(label: &str) -> String {
    if label.starts_with('(') && label.ends_with(')') && label.contains(" or ") {
        let inner = &label[1..label.len() - 1];
        let alternatives: Vec<&str> = inner.split(" or ").collect();
        format!("expected one of: {}", alternatives.join(", "))
    } else {
        format!("expected {}", label)
    }
}

impl fmt::Display for ParserFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "parse error: {}", self.summary())?;
        writeln!(f, " --> {}:{}", self.filename, self.position)?;

        let line_no = self.position.line.to_string();
        let gutter = " ".repeat(line_no.len());
        writeln!(f, "{} |", gutter)?;
        writeln!(f, "{} | {}", line_no, self.line)?;
        let caret_pad = " ".repeat(self.position.column.saturating_sub(1));
        write!(f, "{} | {}^", gutter, caret_pad)
    }
}

impl std::error::Error for ParserFailure {}
