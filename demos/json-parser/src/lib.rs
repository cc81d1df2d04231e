#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! JSON Parser Example
//!
//! This crate demonstrates building a complete JSON parser on top of the
//! parskit combinator API: the grammar is a pure composition of primitives
//! and combinators, with a two-phase recursive binding for nested values.
//!
//! # Features
//!
//! - Full JSON value parsing (objects, arrays, strings, numbers, booleans,
//!   null)
//! - String escapes including `\uXXXX`
//! - Labelled, position-carrying errors rendered with a caret excerpt
//! - Compact re-serialization via `Display`
//!
//! # Example
//!
//! ```ignore
//! let value = json_parser::parse(r#"{"name": "Alice", "age": 30}"#)?;
//! assert_eq!(value.get("age").and_then(JsonValue::as_f64), Some(30.0));
//! ```

use parskit::{ParserFailure, Stream};
use thiserror::Error;

pub mod ast;
pub mod grammar;

pub use ast::JsonValue;

/// Errors produced when parsing JSON text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonError {
    /// The input is not valid JSON.
    #[error("{0}")]
    Syntax(#[from] ParserFailure),
}

/// Parses a complete JSON document.
pub fn parse(input: &str) -> Result<JsonValue, JsonError> {
    Ok(grammar::document().try_run(input)?)
}

/// Parses a complete JSON document, naming the input for error reports.
pub fn parse_named(input: &str, filename: &str) -> Result<JsonValue, JsonError> {
    Ok(grammar::document().try_run_stream(Stream::with_filename(input, filename))?)
}
