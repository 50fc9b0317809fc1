//! Token types for the expression lexer

/// Token types produced by the lexer
///
/// The two dialects share one token set; the lexer only emits the subset a
/// dialect actually has (the legacy dialect never produces `Dot` or the
/// comparison tokens, the jexl dialect never produces `Variable` or `Hash`).
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub enum TokenType {
    // Literals
    Number,
    StringLiteral,

    // Names
    Variable,   // @identifier (legacy)
    Identifier, // function names, constants, jexl context references

    // Keywords (jexl)
    True,
    False,
    Null,

    // Operators
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /
    Caret,    // ^
    Hash,     // # (legacy string concatenation)
    Percent,  // % (jexl)
    Bang,     // ! (jexl)
    Dot,      // . (jexl)
    EqualEqual,         // ==
    NotEqual,           // !=
    LessThan,           // <
    LessThanOrEqual,    // <=
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    AndAnd,             // &&
    OrOr,               // ||

    // Delimiters
    OpenParen,    // (
    CloseParen,   // )
    OpenBracket,  // [ (jexl)
    CloseBracket, // ] (jexl)
    Comma,        // ,

    // End of input
    Eof,
}

/// A token in an expression
#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub position: usize,
}

impl Token {
    pub fn new(token_type: TokenType, value: String, position: usize) -> Self {
        Self {
            token_type,
            value,
            position,
        }
    }

    pub fn eof(position: usize) -> Self {
        Self {
            token_type: TokenType::Eof,
            value: String::new(),
            position,
        }
    }
}
