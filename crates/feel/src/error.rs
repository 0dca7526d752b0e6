use std::fmt;

use serde::{Deserialize, Serialize};

/// A lexing or parsing error. `column` is the 1-based character offset of
/// the token the parser was looking at when it gave up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseError {
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(column: usize, message: impl Into<String>) -> Self {
        ParseError {
            column,
            message: message.into(),
        }
    }

    pub fn lex(column: usize, message: impl Into<String>) -> Self {
        ParseError::new(column, message)
    }

    pub fn parse(column: usize, message: impl Into<String>) -> Self {
        ParseError::new(column, message)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}: {}", self.column, self.message)
    }
}

impl std::error::Error for ParseError {}
