//! tabula-feel: the FEEL subset spoken by tabula decision tables.
//!
//! Covers literals (strings, numbers, booleans, `null`), variable
//! references with property paths, builtin calls such as `date(...)` and
//! `date and time(...)`, comparisons, `and`/`or`/`not(...)` and the unary
//! test forms used in input entries (`-`, comparison prefixes, intervals,
//! disjunctions, `not(...)` and `?`-expressions).
//!
//! This crate only parses. Evaluation, including every decision about
//! which syntax a backend accepts, lives in `tabula-eval`.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{CompareOp, Expr, Literal, Quote, UnaryTest, UnaryTests};
pub use error::ParseError;
pub use parser::{parse_expression, parse_unary_tests};

/// Function name the parser records for `date and time(...)`.
pub const DATE_AND_TIME: &str = "date and time";
/// Function name of the date-only builtin.
pub const DATE: &str = "date";
