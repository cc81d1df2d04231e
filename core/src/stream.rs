//! The transactional character stream parsers consume.
//!
//! A [`Stream`] is a cursor over a shared, immutable source text. It is a
//! cheap-to-clone *value*: the source lives behind an `Arc<str>`, so parsers
//! thread streams along by value and results can carry stream snapshots
//! without copying the input. Consumption is strictly code-point oriented:
//! one "character" is one Unicode code point, and all counts in the public
//! API are code-point counts.
//!
//! # Transactions
//!
//! Primitive parsers that can fail follow one convention: [`Stream::begin`],
//! attempt the match, then [`Stream::rollback`] on failure or
//! [`Stream::commit`] on success. The transaction stack is LIFO; a `commit`
//! or `rollback` without a matching `begin` is a configuration error and
//! panics, because the grammar itself is malformed.
//!
//! # Example
//!
//! ```ignore
//! let mut stream = Stream::with_filename("abc", "demo.txt");
//! stream.begin();
//! assert_eq!(stream.take1().unwrap(), 'a');
//! stream.rollback();
//! assert_eq!(stream.peek1(), Some('a'));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::{ParseConfig, RecursionGuard};
use crate::{Error, Position};

/// Name used when a stream is built without an explicit filename.
const ANONYMOUS_INPUT: &str = "<input>";

/// A cursor over immutable source text, with checkpoint/rollback support.
///
/// Each parse owns its streams exclusively; sharing happens only through the
/// `Arc`'d source text. Cloning a stream clones the cursor, the transaction
/// stack, and the resource-limit state, so a clone is an independent
/// continuation point.
#[derive(Clone)]
pub struct Stream {
    source: Arc<str>,
    filename: Arc<str>,
    /// Byte offset of the cursor into `source`. Internal only; the public
    /// `Position` counts code points.
    byte_offset: usize,
    position: Position,
    transactions: Vec<(usize, Position)>,
    config: ParseConfig,
    depth: RecursionGuard,
}

impl Stream {
    /// Creates a stream over `source` with the anonymous filename.
    pub fn new(source: &str) -> Self {
        Self::with_filename(source, ANONYMOUS_INPUT)
    }

    /// Creates a stream over `source`, naming the input for error reports.
    pub fn with_filename(source: &str, filename: &str) -> Self {
        Self {
            source: Arc::from(source),
            filename: Arc::from(filename),
            byte_offset: 0,
            position: Position::START,
            transactions: Vec::new(),
            config: ParseConfig::DEFAULT,
            depth: RecursionGuard::new(),
        }
    }

    /// Replaces the resource-limit configuration.
    #[must_use]
    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    /// The complete source text.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The input name shown in error reports.
    #[inline]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The current position of the cursor.
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// The unconsumed tail of the source.
    #[inline]
    pub fn rest(&self) -> &str {
        &self.source[self.byte_offset..]
    }

    /// Whether the cursor has reached the end of the source.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.byte_offset >= self.source.len()
    }

    fn consume(&mut self, chunk_bytes: usize) -> String {
        let chunk = self.source[self.byte_offset..self.byte_offset + chunk_bytes].to_string();
        self.byte_offset += chunk_bytes;
        self.position = self.position.advance(&chunk);
        chunk
    }

    /// Consumes and returns the next character.
    ///
    /// Fails with [`Error::EndOfStream`] when the stream is exhausted.
    pub fn take1(&mut self) -> Result<char, Error> {
        match self.rest().chars().next() {
            Some(c) => {
                self.byte_offset += c.len_utf8();
                self.position = self.position.advance(c.encode_utf8(&mut [0u8; 4]));
                Ok(c)
            }
            None => Err(Error::EndOfStream),
        }
    }

    /// Consumes up to `n` characters.
    ///
    /// `n == 0` returns the empty string without touching the cursor. For
    /// `n > 0` the stream must be non-empty (otherwise
    /// [`Error::EndOfStream`]); fewer than `n` characters are returned when
    /// fewer remain.
    pub fn take_n(&mut self, n: usize) -> Result<String, Error> {
        if n == 0 {
            return Ok(String::new());
        }
        if self.is_eof() {
            return Err(Error::EndOfStream);
        }
        let bytes = prefix_bytes_upto(self.rest(), n);
        Ok(self.consume(bytes))
    }

    /// Consumes the maximal prefix for which `pred` holds.
    ///
    /// Never fails; the prefix may be empty.
    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let bytes = matching_prefix_bytes(self.rest(), pred);
        self.consume(bytes)
    }

    /// The next character, without consuming it.
    #[inline]
    pub fn peek1(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Up to `n` characters ahead of the cursor, without consuming.
    pub fn peek_n(&self, n: usize) -> &str {
        let bytes = prefix_bytes_upto(self.rest(), n);
        &self.rest()[..bytes]
    }

    /// The maximal prefix for which `pred` holds, without consuming.
    pub fn peek_while(&self, pred: impl Fn(char) -> bool) -> &str {
        let bytes = matching_prefix_bytes(self.rest(), pred);
        &self.rest()[..bytes]
    }

    /// The character immediately before the cursor, or `None` at offset 0.
    pub fn peek_back(&self) -> Option<char> {
        self.source[..self.byte_offset].chars().next_back()
    }

    /// Pushes a checkpoint onto the transaction stack.
    pub fn begin(&mut self) {
        self.transactions.push((self.byte_offset, self.position));
    }

    /// Discards the most recent checkpoint, keeping the cursor where it is.
    ///
    /// # Panics
    ///
    /// Panics if no transaction is open; an unbalanced commit means the
    /// grammar's transaction discipline is broken.
    pub fn commit(&mut self) {
        if self.transactions.pop().is_none() {
            panic!("commit() without a matching begin(): transaction stack is empty");
        }
    }

    /// Restores the cursor to the most recent checkpoint and discards it.
    ///
    /// # Panics
    ///
    /// Panics if no transaction is open; an unbalanced rollback means the
    /// grammar's transaction discipline is broken.
    pub fn rollback(&mut self) {
        match self.transactions.pop() {
            Some((byte_offset, position)) => {
                self.byte_offset = byte_offset;
                self.position = position;
            }
            None => panic!("rollback() without a matching begin(): transaction stack is empty"),
        }
    }

    /// Number of open transactions. Exposed for tests of the LIFO discipline.
    #[inline]
    pub fn transaction_depth(&self) -> usize {
        self.transactions.len()
    }

    /// Enters a recursive-parser frame, enforcing the configured depth limit.
    pub(crate) fn enter_nested(&mut self) -> Result<(), Error> {
        self.depth.enter(self.config.max_recursion_depth)
    }

    /// Leaves a recursive-parser frame.
    pub(crate) fn exit_nested(&mut self) {
        self.depth.exit();
    }
}

/// Byte length of the first `n` code points of `s` (all of `s` if shorter).
fn prefix_bytes_upto(s: &str, n: usize) -> usize {
    s.char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Byte length of the maximal prefix of `s` matching `pred`.
fn matching_prefix_bytes(s: &str, pred: impl Fn(char) -> bool) -> usize {
    for (i, c) in s.char_indices() {
        if !pred(c) {
            return i;
        }
    }
    s.len()
}

impl From<&str> for Stream {
    fn from(source: &str) -> Self {
        Stream::new(source)
    }
}

/// Structural equality for testability: two streams are equal when they read
/// the same input, from the same place, under the same name. Open
/// transactions and resource-limit state are cursors' private business and
/// do not participate.
impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.filename == other.filename
            && self.byte_offset == other.byte_offset
            && self.position == other.position
    }
}

impl Eq for Stream {}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let excerpt: String = self.rest().chars().take(16).collect();
        f.debug_struct("Stream")
            .field("filename", &self.filename)
            .field("position", &self.position)
            .field("rest", &format_args!("{:?}…", excerpt))
            .finish()
    }
}
