use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords, told apart by the parser
    Word(String),
    /// Double-quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Single-quoted string literal; whether it is accepted is a backend decision
    SingleQuotedStr(String),
    /// Integer literal
    Int(i64),
    /// Decimal literal, kept as written
    Float(String),
    // Punctuation
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    DotDot,
    /// `?`, the implicit input value of a unary test
    Question,
    /// A lone `-`, the "any value" unary test
    Minus,
    // Comparison operators
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub column: usize,
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let column = pos + 1;

        // String literal, either quoting style
        if c == '"' || c == '\'' {
            let quote = c;
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(ParseError::lex(column, "unterminated string literal"));
                }
                let sc = chars[pos];
                if sc == quote {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(ParseError::lex(column, "unterminated escape in string"));
                    }
                    match chars[pos] {
                        '"' => s.push('"'),
                        '\'' => s.push('\''),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    pos += 1;
                    continue;
                }
                s.push(sc);
                pos += 1;
            }
            let token = if quote == '"' {
                Token::Str(s)
            } else {
                Token::SingleQuotedStr(s)
            };
            tokens.push(Spanned { token, column });
            continue;
        }

        // Number
        if c.is_ascii_digit()
            || (c == '-' && pos + 1 < chars.len() && chars[pos + 1].is_ascii_digit())
        {
            let start = pos;
            if c == '-' {
                pos += 1;
            }
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            // "1..5" is an interval, not a decimal
            if pos < chars.len()
                && chars[pos] == '.'
                && pos + 1 < chars.len()
                && chars[pos + 1].is_ascii_digit()
            {
                pos += 1;
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
                let s: String = chars[start..pos].iter().collect();
                tokens.push(Spanned {
                    token: Token::Float(s),
                    column,
                });
            } else {
                let s: String = chars[start..pos].iter().collect();
                // Digit runs beyond i64 stay textual and become decimals.
                let token = match s.parse::<i64>() {
                    Ok(n) => Token::Int(n),
                    Err(_) => Token::Float(s),
                };
                tokens.push(Spanned { token, column });
            }
            continue;
        }

        let next = chars.get(pos + 1).copied();
        let (token, width) = match (c, next) {
            ('<', Some('=')) => (Some(Token::Lte), 2),
            ('<', _) => (Some(Token::Lt), 1),
            ('>', Some('=')) => (Some(Token::Gte), 2),
            ('>', _) => (Some(Token::Gt), 1),
            ('!', Some('=')) => (Some(Token::Neq), 2),
            ('=', _) => (Some(Token::Eq), 1),
            ('.', Some('.')) => (Some(Token::DotDot), 2),
            ('.', _) => (Some(Token::Dot), 1),
            ('[', _) => (Some(Token::LBracket), 1),
            (']', _) => (Some(Token::RBracket), 1),
            ('(', _) => (Some(Token::LParen), 1),
            (')', _) => (Some(Token::RParen), 1),
            (',', _) => (Some(Token::Comma), 1),
            ('?', _) => (Some(Token::Question), 1),
            ('-', _) => (Some(Token::Minus), 1),
            _ => (None, 0),
        };
        if let Some(token) = token {
            tokens.push(Spanned { token, column });
            pos += width;
            continue;
        }

        // Identifier / keyword
        if c.is_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Word(word),
                column,
            });
            continue;
        }

        return Err(ParseError::lex(
            column,
            format!("unexpected character '{}'", c),
        ));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        column: chars.len() + 1,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn lexes_comparison_against_call() {
        assert_eq!(
            kinds("<=date(\"2019-01-01\")"),
            vec![
                Token::Lte,
                Token::Word("date".to_string()),
                Token::LParen,
                Token::Str("2019-01-01".to_string()),
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn interval_bounds_are_not_decimals() {
        assert_eq!(
            kinds("[1..5]"),
            vec![
                Token::LBracket,
                Token::Int(1),
                Token::DotDot,
                Token::Int(5),
                Token::RBracket,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn negative_numbers_and_lone_dash() {
        assert_eq!(kinds("-"), vec![Token::Minus, Token::Eof]);
        assert_eq!(kinds("< -2.5"), vec![Token::Lt, Token::Float("-2.5".to_string()), Token::Eof]);
    }

    #[test]
    fn integers_beyond_i64_lex_as_decimals() {
        assert_eq!(
            kinds("> 12345678901234567890"),
            vec![
                Token::Gt,
                Token::Float("12345678901234567890".to_string()),
                Token::Eof
            ]
        );
        assert_eq!(
            kinds("-9223372036854775808"),
            vec![Token::Int(i64::MIN), Token::Eof]
        );
    }

    #[test]
    fn single_quotes_are_a_distinct_token() {
        assert_eq!(
            kinds("'camunda'"),
            vec![Token::SingleQuotedStr("camunda".to_string()), Token::Eof]
        );
    }

    #[test]
    fn unterminated_string_reports_its_column() {
        let err = lex("= \"abc").unwrap_err();
        assert_eq!(err.column, 3);
    }

    #[test]
    fn unexpected_character() {
        let err = lex("a # b").unwrap_err();
        assert!(err.message.contains("'#'"));
    }
}
