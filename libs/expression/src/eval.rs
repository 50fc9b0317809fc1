//! Expression evaluation
//!
//! A straightforward tree walk. Evaluation is a pure function of the AST and
//! the variable context; it has no side effects and no dependency on prior
//! calls.

use cuprum_models::ExpressionDialect;

use crate::ast::{BinaryOp, Expr, NamedConstant, UnaryOp};
use crate::context::VariableContext;
use crate::error::{Error, Result};
use crate::functions;
use crate::value::Value;

/// Evaluator for a parsed expression
pub struct Evaluator<'a> {
    context: &'a VariableContext,
    dialect: ExpressionDialect,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a VariableContext, dialect: ExpressionDialect) -> Self {
        Self { context, dialect }
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Integer(i) => Ok(Value::Integer(*i)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Constant(NamedConstant::E) => Ok(Value::Float(std::f64::consts::E)),
            Expr::Constant(NamedConstant::Pi) => Ok(Value::Float(std::f64::consts::PI)),
            Expr::Variable(name) => Ok(self.context.get(name)),
            Expr::Unary { op, operand } => self.eval_unary(*op, operand),
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Call { function, args } => {
                let values: Vec<Value> =
                    args.iter().map(|a| self.eval(a)).collect::<Result<_>>()?;
                functions::call(*function, &values)
            }
            Expr::Member { target, name } => Ok(member(self.eval(target)?, name)),
            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                Ok(index_access(target, index))
            }
        }
    }

    fn eval_unary(&self, op: UnaryOp, operand: &Expr) -> Result<Value> {
        let value = self.eval(operand)?;
        match op {
            UnaryOp::Minus => numeric(-value.to_number()?),
            UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        }
    }

    fn eval_binary(&self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value> {
        // Logical operators short-circuit.
        match op {
            BinaryOp::And => {
                let l = self.eval(left)?;
                if !l.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                return Ok(Value::Bool(self.eval(right)?.is_truthy()));
            }
            BinaryOp::Or => {
                let l = self.eval(left)?;
                if l.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                return Ok(Value::Bool(self.eval(right)?.is_truthy()));
            }
            _ => {}
        }

        let l = self.eval(left)?;
        let r = self.eval(right)?;

        match op {
            BinaryOp::Add => {
                // The jexl dialect concatenates when either side is a
                // string; the legacy dialect's + is strictly numeric.
                if self.dialect == ExpressionDialect::Jexl
                    && (matches!(l, Value::String(_)) || matches!(r, Value::String(_)))
                {
                    Ok(Value::String(format!("{}{}", l.render(), r.render())))
                } else {
                    numeric(l.to_number()? + r.to_number()?)
                }
            }
            BinaryOp::Sub => numeric(l.to_number()? - r.to_number()?),
            BinaryOp::Mul => numeric(l.to_number()? * r.to_number()?),
            BinaryOp::Div => numeric(l.to_number()? / r.to_number()?),
            BinaryOp::Mod => numeric(l.to_number()? % r.to_number()?),
            BinaryOp::Pow => numeric(l.to_number()?.powf(r.to_number()?)),
            BinaryOp::Concat => Ok(Value::String(format!("{}{}", l.render(), r.render()))),
            BinaryOp::Eq => Ok(Value::Bool(l.loose_eq(&r))),
            BinaryOp::Ne => Ok(Value::Bool(!l.loose_eq(&r))),
            BinaryOp::Lt => compare(&l, &r, |o| o == std::cmp::Ordering::Less),
            BinaryOp::Le => compare(&l, &r, |o| o != std::cmp::Ordering::Greater),
            BinaryOp::Gt => compare(&l, &r, |o| o == std::cmp::Ordering::Greater),
            BinaryOp::Ge => compare(&l, &r, |o| o != std::cmp::Ordering::Less),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }
}

fn numeric(value: f64) -> Result<Value> {
    if value.is_finite() {
        Ok(Value::from_f64(value))
    } else {
        Err(Error::InvalidExpression(
            "arithmetic produced a non-finite result".into(),
        ))
    }
}

fn compare<F>(l: &Value, r: &Value, check: F) -> Result<Value>
where
    F: Fn(std::cmp::Ordering) -> bool,
{
    // Strings compare lexicographically; everything else numerically.
    let ordering = match (l, r) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => l
            .to_number()?
            .partial_cmp(&r.to_number()?)
            .ok_or_else(|| Error::InvalidExpression("values cannot be compared".into()))?,
    };
    Ok(Value::Bool(check(ordering)))
}

/// Member access over object values; anything else yields the absent value.
fn member(target: Value, name: &str) -> Value {
    match target {
        Value::Object(map) => map
            .get(name)
            .map(Value::from_json)
            .unwrap_or(Value::Undefined),
        _ => Value::Undefined,
    }
}

/// Index access: integer index into arrays, string key into objects.
fn index_access(target: Value, index: Value) -> Value {
    match (target, index) {
        (Value::Array(items), Value::Integer(i)) => {
            if i >= 0 {
                items
                    .get(i as usize)
                    .map(Value::from_json)
                    .unwrap_or(Value::Undefined)
            } else {
                Value::Undefined
            }
        }
        (Value::Object(map), Value::String(key)) => map
            .get(&key)
            .map(Value::from_json)
            .unwrap_or(Value::Undefined),
        _ => Value::Undefined,
    }
}
