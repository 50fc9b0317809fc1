//! Expression lexer
//!
//! Converts expression strings into a stream of tokens. The dialect decides
//! which lexical rules are active: the legacy dialect has `@`-prefixed
//! variables and the `#` concatenation operator; the jexl dialect has bare
//! identifiers, member/index access and comparison/logical operators.

use cuprum_models::ExpressionDialect;

use crate::error::{Error, Result};
use crate::token::{Token, TokenType};

/// The expression lexer
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    current_char: Option<char>,
    dialect: ExpressionDialect,
}

impl Lexer {
    pub fn new(input: &str, dialect: ExpressionDialect) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            chars,
            position: 0,
            current_char,
            dialect,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.chars.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char {
            if c.is_ascii_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Read a numeric literal: digits with an optional fractional part.
    fn read_number(&mut self) -> String {
        let mut number = String::new();
        while let Some(c) = self.current_char {
            if c.is_ascii_digit() {
                number.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.current_char == Some('.') && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            number.push('.');
            self.advance();
            while let Some(c) = self.current_char {
                if c.is_ascii_digit() {
                    number.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        number
    }

    /// Read a string literal delimited by single or double quotes.
    fn read_string(&mut self, quote: char) -> Result<String> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.current_char {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(value);
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => {
                    return Err(Error::InvalidExpression(format!(
                        "unterminated string literal starting with {quote}"
                    )))
                }
            }
        }
    }

    fn is_jexl(&self) -> bool {
        self.dialect == ExpressionDialect::Jexl
    }

    /// Produce the next token, or an error for input the dialect does not
    /// recognize.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let position = self.position;
        let c = match self.current_char {
            Some(c) => c,
            None => return Ok(Token::eof(position)),
        };

        if c.is_ascii_digit() {
            let value = self.read_number();
            return Ok(Token::new(TokenType::Number, value, position));
        }

        if c == '\'' || c == '"' {
            let value = self.read_string(c)?;
            return Ok(Token::new(TokenType::StringLiteral, value, position));
        }

        if c == '@' && !self.is_jexl() {
            self.advance();
            let name = self.read_identifier();
            if name.is_empty() {
                return Err(Error::InvalidExpression(
                    "expected variable name after '@'".into(),
                ));
            }
            return Ok(Token::new(TokenType::Variable, name, position));
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let ident = self.read_identifier();
            let token_type = match (self.is_jexl(), ident.as_str()) {
                (true, "true") => TokenType::True,
                (true, "false") => TokenType::False,
                (true, "null") => TokenType::Null,
                _ => TokenType::Identifier,
            };
            return Ok(Token::new(token_type, ident, position));
        }

        // Single- and double-character operators
        let simple = |lexer: &mut Self, token_type| {
            lexer.advance();
            Ok(Token::new(token_type, c.to_string(), position))
        };

        match c {
            '+' => simple(self, TokenType::Plus),
            '-' => simple(self, TokenType::Minus),
            '*' => simple(self, TokenType::Star),
            '/' => simple(self, TokenType::Slash),
            '^' => simple(self, TokenType::Caret),
            '(' => simple(self, TokenType::OpenParen),
            ')' => simple(self, TokenType::CloseParen),
            ',' => simple(self, TokenType::Comma),
            '#' if !self.is_jexl() => simple(self, TokenType::Hash),
            '%' if self.is_jexl() => simple(self, TokenType::Percent),
            '.' if self.is_jexl() => simple(self, TokenType::Dot),
            '[' if self.is_jexl() => simple(self, TokenType::OpenBracket),
            ']' if self.is_jexl() => simple(self, TokenType::CloseBracket),
            '=' if self.is_jexl() && self.peek() == Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenType::EqualEqual, "==".into(), position))
            }
            '!' if self.is_jexl() && self.peek() == Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenType::NotEqual, "!=".into(), position))
            }
            '!' if self.is_jexl() => simple(self, TokenType::Bang),
            '<' if self.is_jexl() && self.peek() == Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenType::LessThanOrEqual, "<=".into(), position))
            }
            '<' if self.is_jexl() => simple(self, TokenType::LessThan),
            '>' if self.is_jexl() && self.peek() == Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::new(
                    TokenType::GreaterThanOrEqual,
                    ">=".into(),
                    position,
                ))
            }
            '>' if self.is_jexl() => simple(self, TokenType::GreaterThan),
            '&' if self.is_jexl() && self.peek() == Some('&') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenType::AndAnd, "&&".into(), position))
            }
            '|' if self.is_jexl() && self.peek() == Some('|') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenType::OrOr, "||".into(), position))
            }
            other => Err(Error::InvalidExpression(format!(
                "unexpected character '{other}' at position {position}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str, dialect: ExpressionDialect) -> Result<Vec<(TokenType, String)>> {
        let mut lexer = Lexer::new(input, dialect);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token()?;
            if token.token_type == TokenType::Eof {
                return Ok(out);
            }
            out.push((token.token_type, token.value));
        }
    }

    #[test]
    fn lexes_legacy_arithmetic() {
        let got = tokens("5 * @value", ExpressionDialect::Legacy).unwrap();
        assert_eq!(
            got,
            vec![
                (TokenType::Number, "5".to_string()),
                (TokenType::Star, "*".to_string()),
                (TokenType::Variable, "value".to_string()),
            ]
        );
    }

    #[test]
    fn lexes_concat_and_strings() {
        let got = tokens("\"Pruebas\" # 'DeStrings'", ExpressionDialect::Legacy).unwrap();
        assert_eq!(
            got,
            vec![
                (TokenType::StringLiteral, "Pruebas".to_string()),
                (TokenType::Hash, "#".to_string()),
                (TokenType::StringLiteral, "DeStrings".to_string()),
            ]
        );
    }

    #[test]
    fn legacy_rejects_jexl_operators() {
        assert!(tokens("a == b", ExpressionDialect::Legacy).is_err());
        assert!(tokens("a.b", ExpressionDialect::Legacy).is_err());
    }

    #[test]
    fn lexes_jexl_member_access_and_comparison() {
        let got = tokens("location.lat >= 40", ExpressionDialect::Jexl).unwrap();
        assert_eq!(
            got,
            vec![
                (TokenType::Identifier, "location".to_string()),
                (TokenType::Dot, ".".to_string()),
                (TokenType::Identifier, "lat".to_string()),
                (TokenType::GreaterThanOrEqual, ">=".to_string()),
                (TokenType::Number, "40".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokens("\"numb+sd ((", ExpressionDialect::Legacy).is_err());
    }

    #[test]
    fn decimal_requires_trailing_digits() {
        let got = tokens("3.14", ExpressionDialect::Legacy).unwrap();
        assert_eq!(got, vec![(TokenType::Number, "3.14".to_string())]);
    }
}
