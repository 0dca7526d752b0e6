/// Recursive-descent parser for FEEL expressions and unary tests.
/// Produces the raw AST; no name resolution or type checking happens here.
use crate::ast::{Expr, UnaryTests};
use crate::error::ParseError;
use crate::lexer::{lex, Spanned, Token};

mod expressions;
mod unary;

// ──────────────────────────────────────────────
// Entry points
// ──────────────────────────────────────────────

/// Parse a complete expression (output entries, input expressions).
pub fn parse_expression(src: &str) -> Result<Expr, ParseError> {
    let tokens = lex(src)?;
    let mut p = Parser::new(&tokens);
    let expr = p.parse_expr()?;
    p.expect_eof()?;
    Ok(expr)
}

/// Parse the content of an input entry.
pub fn parse_unary_tests(src: &str) -> Result<UnaryTests, ParseError> {
    let tokens = lex(src)?;
    let mut p = Parser::new(&tokens);
    let tests = p.parse_unary_tests()?;
    p.expect_eof()?;
    Ok(tests)
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    /// Look `n` tokens past the current one, clamped to Eof.
    fn peek_at(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].token
    }

    fn cur_column(&self) -> usize {
        self.cur().column
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ParseError> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {}, got {:?}", what, self.peek())))
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        if self.peek() == &Token::Eof {
            Ok(())
        } else {
            Err(self.err(format!("unexpected trailing input {:?}", self.peek())))
        }
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::parse(self.cur_column(), msg)
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(x) if x == w)
    }

    fn is_word_at(&self, n: usize, w: &str) -> bool {
        matches!(self.peek_at(n), Token::Word(x) if x == w)
    }

    fn take_word(&mut self) -> Result<String, ParseError> {
        if let Token::Word(w) = self.peek().clone() {
            self.advance();
            Ok(w)
        } else {
            Err(self.err(format!("expected identifier, got {:?}", self.peek())))
        }
    }
}
