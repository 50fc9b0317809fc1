//! Engine facade
//!
//! The engine binds a dialect to the parse/evaluate steps and exposes the
//! operations the pipeline needs: typed evaluation against an expected type,
//! `${...}` template application, and context-sufficiency checks. The
//! dialect is chosen once per device type from its configuration tag; the
//! rest of the pipeline never branches on it.

use cuprum_models::ExpressionDialect;

use crate::ast::Expr;
use crate::context::VariableContext;
use crate::error::{Error, Result};
use crate::eval::Evaluator;
use crate::parser::Parser;
use crate::template;
use crate::value::Value;

/// Result type an evaluation is checked against.
///
/// Only `Number` and `String` are valid targets; any other declared type tag
/// is rejected with `WrongExpressionType` before parsing, as in the original
/// agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    Number,
    String,
}

impl ExpectedType {
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "Number" => Ok(ExpectedType::Number),
            "String" => Ok(ExpectedType::String),
            other => Err(Error::WrongExpressionType(other.to_string())),
        }
    }
}

/// Expression engine for one dialect
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    dialect: ExpressionDialect,
}

impl Engine {
    pub fn new(dialect: ExpressionDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> ExpressionDialect {
        self.dialect
    }

    /// Parse an expression to its AST.
    pub fn parse(&self, expression: &str) -> Result<Expr> {
        Parser::new(expression, self.dialect)?.parse()
    }

    /// Evaluate a parsed expression.
    pub fn eval(&self, expr: &Expr, context: &VariableContext) -> Result<Value> {
        Evaluator::new(context, self.dialect).eval(expr)
    }

    /// Parse and evaluate, checking the result against an expected type tag.
    ///
    /// This is the `parse(expressionText, variableContext, expectedType)`
    /// contract: an unsupported tag or a `Number` request with a non-numeric
    /// result fails with `WrongExpressionType`; malformed input fails with
    /// `InvalidExpression`; it never panics.
    pub fn evaluate(
        &self,
        expression: &str,
        context: &VariableContext,
        expected: ExpectedType,
    ) -> Result<Value> {
        let ast = self.parse(expression)?;
        let value = self.eval(&ast, context)?;

        match expected {
            ExpectedType::Number => match &value {
                Value::Integer(_) | Value::Float(_) => Ok(value),
                Value::String(s) => {
                    let parsed = s.trim().parse::<f64>().map_err(|_| {
                        Error::WrongExpressionType(format!("'{s}' is not a number"))
                    })?;
                    Ok(Value::from_f64(parsed))
                }
                other => Err(Error::WrongExpressionType(format!(
                    "expected a number, got {}",
                    other.render()
                ))),
            },
            ExpectedType::String => match value {
                // Structured results pass through; scalars take their
                // canonical string form.
                Value::Array(_) | Value::Object(_) => Ok(value),
                scalar => Ok(Value::String(scalar.render())),
            },
        }
    }

    /// Apply an expression text that may embed `${...}` templates.
    ///
    /// Every `${...}` occurrence is evaluated and substituted into the
    /// surrounding literal text. When the whole text is a single template,
    /// the typed result is returned instead of a string. Text without any
    /// template is returned verbatim in the legacy dialect; in the jexl
    /// dialect it is evaluated as one whole expression.
    pub fn apply_expression(&self, text: &str, context: &VariableContext) -> Result<Value> {
        template::apply(self, text, context)
    }

    /// Whether the context provides every variable the expression references.
    ///
    /// Parse failures propagate: a malformed expression must abort the
    /// caller, not silently count as "unavailable".
    pub fn context_available(&self, text: &str, context: &VariableContext) -> Result<bool> {
        let mut all_present = true;
        for segment in template::expression_segments(text, self.dialect) {
            let ast = self.parse(&segment)?;
            if ast.variables().iter().any(|name| !context.contains(name)) {
                all_present = false;
            }
        }
        Ok(all_present)
    }
}
