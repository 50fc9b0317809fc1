//! Recursive-descent parser for expressions
//!
//! Precedence, lowest to highest (all binary operators left-associative):
//! 1. `||` (jexl)
//! 2. `&&` (jexl)
//! 3. equality `==` `!=` (jexl)
//! 4. relational `<` `<=` `>` `>=` (jexl)
//! 5. additive `+` `-` and legacy concatenation `#`
//! 6. multiplicative `*` `/` `%`
//! 7. power `^`
//! 8. unary `-` `!` (unary minus binds tighter than `^`)
//! 9. postfix `.member` `[index]` (jexl)
//! 10. term: literal, variable, function call, parenthesized expression

use cuprum_models::ExpressionDialect;

use crate::ast::{BinaryOp, Expr, NamedConstant, UnaryOp};
use crate::error::{Error, Result};
use crate::functions::Function;
use crate::lexer::Lexer;
use crate::token::{Token, TokenType};

const MAX_RECURSION_DEPTH: usize = 100;

/// Parser for expressions of either dialect
pub struct Parser {
    lexer: Lexer,
    current: Token,
    dialect: ExpressionDialect,
    recursion_depth: usize,
}

impl Parser {
    pub fn new(input: &str, dialect: ExpressionDialect) -> Result<Self> {
        let mut lexer = Lexer::new(input, dialect);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            dialect,
            recursion_depth: 0,
        })
    }

    /// Parse the entire input as one expression.
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.parse_expression()?;
        if self.current.token_type != TokenType::Eof {
            return Err(Error::InvalidExpression(format!(
                "unexpected token '{}' at position {}",
                self.current.value, self.current.position
            )));
        }
        Ok(expr)
    }

    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn current_is(&self, token_type: TokenType) -> bool {
        self.current.token_type == token_type
    }

    fn expect(&mut self, token_type: TokenType) -> Result<Token> {
        if self.current_is(token_type) {
            self.advance()
        } else {
            Err(Error::InvalidExpression(format!(
                "expected {:?}, got '{}' at position {}",
                token_type, self.current.value, self.current.position
            )))
        }
    }

    fn is_jexl(&self) -> bool {
        self.dialect == ExpressionDialect::Jexl
    }

    fn enter(&mut self) -> Result<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(Error::InvalidExpression(
                "expression too deeply nested".into(),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.recursion_depth -= 1;
    }

    fn parse_expression(&mut self) -> Result<Expr> {
        self.enter()?;
        let expr = if self.is_jexl() {
            self.parse_or()
        } else {
            self.parse_additive()
        };
        self.leave();
        expr
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.current_is(TokenType::OrOr) {
            self.advance()?;
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_equality()?;
        while self.current_is(TokenType::AndAnd) {
            self.advance()?;
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.current.token_type {
                TokenType::EqualEqual => BinaryOp::Eq,
                TokenType::NotEqual => BinaryOp::Ne,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current.token_type {
                TokenType::LessThan => BinaryOp::Lt,
                TokenType::LessThanOrEqual => BinaryOp::Le,
                TokenType::GreaterThan => BinaryOp::Gt,
                TokenType::GreaterThanOrEqual => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    /// `+`, `-` and the legacy `#` share one precedence level, as in the
    /// original grammar's operator table.
    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current.token_type {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Sub,
                TokenType::Hash => BinaryOp::Concat,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_power()?;
        loop {
            let op = match self.current.token_type {
                TokenType::Star => BinaryOp::Mul,
                TokenType::Slash => BinaryOp::Div,
                TokenType::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.parse_power()?;
            left = binary(op, left, right);
        }
    }

    /// Left-associative power; operands at unary level so `-2 ^ 2 == 4`.
    fn parse_power(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        while self.current_is(TokenType::Caret) {
            self.advance()?;
            let right = self.parse_unary()?;
            left = binary(BinaryOp::Pow, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        self.enter()?;
        let expr = match self.current.token_type {
            TokenType::Minus => {
                self.advance()?;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Minus,
                    operand: Box::new(operand),
                })
            }
            TokenType::Bang => {
                self.advance()?;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                })
            }
            _ => self.parse_postfix(),
        };
        self.leave();
        expr
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_term()?;
        if !self.is_jexl() {
            return Ok(expr);
        }
        loop {
            match self.current.token_type {
                TokenType::Dot => {
                    self.advance()?;
                    let name = self.expect(TokenType::Identifier)?;
                    expr = Expr::Member {
                        target: Box::new(expr),
                        name: name.value,
                    };
                }
                TokenType::OpenBracket => {
                    self.advance()?;
                    let index = self.parse_expression()?;
                    self.expect(TokenType::CloseBracket)?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_term(&mut self) -> Result<Expr> {
        match self.current.token_type {
            TokenType::Number => {
                let token = self.advance()?;
                parse_number(&token.value)
            }
            TokenType::StringLiteral => {
                let token = self.advance()?;
                Ok(Expr::Str(token.value))
            }
            TokenType::Variable => {
                let token = self.advance()?;
                Ok(Expr::Variable(token.value))
            }
            TokenType::True => {
                self.advance()?;
                Ok(Expr::Bool(true))
            }
            TokenType::False => {
                self.advance()?;
                Ok(Expr::Bool(false))
            }
            TokenType::Null => {
                self.advance()?;
                Ok(Expr::Null)
            }
            TokenType::OpenParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenType::CloseParen)?;
                Ok(expr)
            }
            TokenType::Identifier => {
                let token = self.advance()?;
                if self.current_is(TokenType::OpenParen) {
                    return self.parse_call(&token.value);
                }
                if self.is_jexl() {
                    // Bare identifiers resolve against the context.
                    return Ok(Expr::Variable(token.value));
                }
                match token.value.as_str() {
                    "e" | "E" => Ok(Expr::Constant(NamedConstant::E)),
                    "pi" | "PI" => Ok(Expr::Constant(NamedConstant::Pi)),
                    other => Err(Error::InvalidExpression(format!(
                        "unknown identifier '{other}'"
                    ))),
                }
            }
            _ => Err(Error::InvalidExpression(format!(
                "unexpected token '{}' at position {}",
                self.current.value, self.current.position
            ))),
        }
    }

    fn parse_call(&mut self, name: &str) -> Result<Expr> {
        let function = Function::from_name(name)
            .ok_or_else(|| Error::InvalidExpression(format!("unknown function '{name}'")))?;

        self.expect(TokenType::OpenParen)?;
        let mut args = Vec::new();
        if !self.current_is(TokenType::CloseParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.current_is(TokenType::Comma) {
                    self.advance()?;
                } else {
                    break;
                }
            }
        }
        self.expect(TokenType::CloseParen)?;

        if args.len() != function.arity() {
            return Err(Error::InvalidExpression(format!(
                "{} takes {} argument(s), got {}",
                function.name(),
                function.arity(),
                args.len()
            )));
        }

        Ok(Expr::Call { function, args })
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn parse_number(text: &str) -> Result<Expr> {
    if text.contains('.') {
        text.parse::<f64>()
            .map(Expr::Float)
            .map_err(|_| Error::InvalidExpression(format!("malformed number '{text}'")))
    } else {
        text.parse::<i64>()
            .map(Expr::Integer)
            .map_err(|_| Error::InvalidExpression(format!("malformed number '{text}'")))
    }
}
