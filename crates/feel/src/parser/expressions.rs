use super::Parser;
use crate::ast::{CompareOp, Expr, Literal, Quote};
use crate::error::ParseError;
use crate::lexer::Token;
use crate::DATE_AND_TIME;

impl<'a> Parser<'a> {
    // -- Expression parsing --------------------------------------

    pub(super) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and_expr()?;
        while self.is_word("or") {
            self.advance();
            let right = self.parse_and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        while self.is_word("and") {
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_path()?;
        if let Some(op) = self.peek_compare_op() {
            self.advance();
            let right = self.parse_path()?;
            return Ok(Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    pub(super) fn peek_compare_op(&self) -> Option<CompareOp> {
        match self.peek() {
            Token::Eq => Some(CompareOp::Eq),
            Token::Neq => Some(CompareOp::Neq),
            Token::Lt => Some(CompareOp::Lt),
            Token::Lte => Some(CompareOp::Lte),
            Token::Gt => Some(CompareOp::Gt),
            Token::Gte => Some(CompareOp::Gte),
            _ => None,
        }
    }

    /// A primary followed by any number of `.property` accesses. This is
    /// also the operand grammar of comparison unary tests and interval
    /// endpoints.
    pub(super) fn parse_path(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.peek() == &Token::Dot {
            self.advance();
            let property = self.take_word()?;
            expr = Expr::Path {
                base: Box::new(expr),
                property,
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::Int(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Int(n)))
            }
            Token::Float(f) => {
                self.advance();
                Ok(Expr::Literal(Literal::Float(f)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str {
                    value: s,
                    quote: Quote::Double,
                }))
            }
            Token::SingleQuotedStr(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str {
                    value: s,
                    quote: Quote::Single,
                }))
            }
            Token::Question => {
                self.advance();
                Ok(Expr::Input)
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::Word(w) => self.parse_word(w),
            other => Err(self.err(format!("expected expression, got {:?}", other))),
        }
    }

    fn parse_word(&mut self, word: String) -> Result<Expr, ParseError> {
        match word.as_str() {
            "true" => {
                self.advance();
                return Ok(Expr::Literal(Literal::Bool(true)));
            }
            "false" => {
                self.advance();
                return Ok(Expr::Literal(Literal::Bool(false)));
            }
            "null" => {
                self.advance();
                return Ok(Expr::Literal(Literal::Null));
            }
            "not" if self.peek_at(1) == &Token::LParen => {
                self.advance();
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                return Ok(Expr::Not(Box::new(inner)));
            }
            _ => {}
        }

        // `date and time(` is the only multi-word name in the subset
        if word == "date"
            && self.is_word_at(1, "and")
            && self.is_word_at(2, "time")
            && self.peek_at(3) == &Token::LParen
        {
            self.advance();
            self.advance();
            self.advance();
            let args = self.parse_args()?;
            return Ok(Expr::Call {
                function: DATE_AND_TIME.to_string(),
                args,
            });
        }

        self.advance();
        if self.peek() == &Token::LParen {
            let args = self.parse_args()?;
            return Ok(Expr::Call {
                function: word,
                args,
            });
        }
        Ok(Expr::Name(word))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(Token::LParen, "'('")?;
        let mut args = Vec::new();
        if self.peek() == &Token::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RParen => {
                    self.advance();
                    return Ok(args);
                }
                other => {
                    return Err(self.err(format!("expected ',' or ')', got {:?}", other)));
                }
            }
        }
    }
}
