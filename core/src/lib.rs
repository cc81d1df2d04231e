pub mod combinators;
pub mod config;
mod error;
pub mod expression;
mod parser;
mod position;
pub mod primitives;
mod result;
mod stream;

pub use combinators::{
    apply, assemble, attempt, between, choice, collect, exactly, look_ahead, many, many1, not,
    sep_by, sep_by1,
};
pub use config::{ParseConfig, RecursionGuard};
pub use error::{Error, ParserFailure};
pub use expression::{expression, BinaryFn, InfixOp, Level, UnaryFn, UnaryOp, NON_ASSOC_CHAIN};
pub use parser::Parser;
pub use position::Position;
pub use primitives::{
    alpha, alphanumeric, any_char, any_char_but, ch, ch_no_case, digit, eof, eol, fail, hex_digit,
    newline, none_of, one_of, pure, satisfy, space, string, string_no_case, succeed, tab,
    whitespace,
};
pub use result::ParseResult;
pub use stream::Stream;
