//! Runtime values for expression evaluation
//!
//! Values bridge between JSON attribute values and the evaluator. `Undefined`
//! is the engine-defined absent value: a variable lookup that misses resolves
//! to it instead of failing. Only operations that need a number turn an
//! `Undefined` into an error.

use serde_json::{Map, Number, Value as Json};

use crate::error::{Error, Result};

/// A value during expression evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value: a missed variable lookup or member access.
    Undefined,
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Json>),
    Object(Map<String, Json>),
}

impl Value {
    /// Convert a JSON value into an evaluation value.
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(items.clone()),
            Json::Object(map) => Value::Object(map.clone()),
        }
    }

    /// Convert back to JSON. `Undefined` has no JSON form and yields `None`.
    pub fn into_json(self) -> Option<Json> {
        match self {
            Value::Undefined => None,
            Value::Null => Some(Json::Null),
            Value::Bool(b) => Some(Json::Bool(b)),
            Value::Integer(i) => Some(Json::Number(i.into())),
            Value::Float(f) => Number::from_f64(f).map(Json::Number),
            Value::String(s) => Some(Json::String(s)),
            Value::Array(items) => Some(Json::Array(items)),
            Value::Object(map) => Some(Json::Object(map)),
        }
    }

    /// Fold a float back to an integer when the result is integral.
    pub fn from_f64(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < (i64::MAX as f64) {
            Value::Integer(value as i64)
        } else {
            Value::Float(value)
        }
    }

    /// Numeric coercion for arithmetic.
    ///
    /// Numeric strings parse; booleans map to 0/1 and null to 0; an
    /// `Undefined` operand has no well-defined numeric result and fails with
    /// `InvalidExpression`.
    pub fn to_number(&self) -> Result<f64> {
        match self {
            Value::Integer(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Bool(true) => Ok(1.0),
            Value::Bool(false) => Ok(0.0),
            Value::Null => Ok(0.0),
            Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
                Error::InvalidExpression(format!("'{s}' cannot be read as a number"))
            }),
            Value::Undefined => Err(Error::InvalidExpression(
                "arithmetic on an undefined value".into(),
            )),
            Value::Array(_) | Value::Object(_) => Err(Error::InvalidExpression(
                "arithmetic on a structured value".into(),
            )),
        }
    }

    /// Canonical string form, used by concatenation and templates.
    ///
    /// Integral numbers render without a fractional part; `Undefined` renders
    /// as `undefined` as documented for the legacy dialect.
    pub fn render(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < (i64::MAX as f64) {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::String(s) => s.clone(),
            Value::Array(items) => {
                Json::Array(items.clone()).to_string()
            }
            Value::Object(map) => Json::Object(map.clone()).to_string(),
        }
    }

    /// Truthiness for the jexl dialect's logical operators.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null | Value::Bool(false) => false,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Bool(true) | Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Loose equality across the numeric variants.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (a, b) => a == b,
        }
    }
}
