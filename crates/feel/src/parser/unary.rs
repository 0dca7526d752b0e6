use super::Parser;
use crate::ast::{UnaryTest, UnaryTests};
use crate::error::ParseError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Unary test parsing --------------------------------------

    pub(super) fn parse_unary_tests(&mut self) -> Result<UnaryTests, ParseError> {
        if self.peek() == &Token::Minus && self.peek_at(1) == &Token::Eof {
            self.advance();
            return Ok(UnaryTests::Any);
        }
        if self.is_word("not") && self.peek_at(1) == &Token::LParen {
            self.advance();
            self.advance();
            let tests = self.parse_test_list()?;
            self.expect(Token::RParen, "')' closing not(")?;
            return Ok(UnaryTests::Negated(tests));
        }
        Ok(UnaryTests::Positive(self.parse_test_list()?))
    }

    fn parse_test_list(&mut self) -> Result<Vec<UnaryTest>, ParseError> {
        let mut tests = vec![self.parse_test()?];
        while self.peek() == &Token::Comma {
            self.advance();
            tests.push(self.parse_test()?);
        }
        Ok(tests)
    }

    fn parse_test(&mut self) -> Result<UnaryTest, ParseError> {
        if let Some(op) = self.peek_compare_op() {
            self.advance();
            let operand = self.parse_path()?;
            return Ok(UnaryTest::Compare { op, operand });
        }

        match self.peek() {
            Token::LBracket | Token::RBracket => self.parse_interval(),
            Token::LParen => {
                // `(1..5)` or a parenthesized expression
                let start = self.pos;
                if let Ok(interval) = self.parse_interval() {
                    return Ok(interval);
                }
                self.pos = start;
                Ok(UnaryTest::Expr(self.parse_expr()?))
            }
            _ => Ok(UnaryTest::Expr(self.parse_expr()?)),
        }
    }

    fn parse_interval(&mut self) -> Result<UnaryTest, ParseError> {
        let low_closed = match self.peek() {
            Token::LBracket => true,
            Token::LParen | Token::RBracket => false,
            other => return Err(self.err(format!("expected interval start, got {:?}", other))),
        };
        self.advance();
        let low = self.parse_path()?;
        self.expect(Token::DotDot, "'..'")?;
        let high = self.parse_path()?;
        let high_closed = match self.peek() {
            Token::RBracket => true,
            Token::RParen | Token::LBracket => false,
            other => return Err(self.err(format!("expected interval end, got {:?}", other))),
        };
        self.advance();
        Ok(UnaryTest::Interval {
            low,
            high,
            low_closed,
            high_closed,
        })
    }
}
