//! Built-in function library
//!
//! String and math helpers shared by both dialects. The function set and
//! semantics follow the original agent's expression grammar: `substr`,
//! `slice` and `replace` behave like their JavaScript counterparts, and
//! `round` rounds halves up.

use crate::error::{Error, Result};
use crate::value::Value;

/// A function of the expression library, resolved at parse time.
///
/// An unknown function name is a parse error, not a runtime one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    // String
    IndexOf,
    Length,
    Substr,
    Trim,
    Uppercase,
    Lowercase,
    Replace,
    Slice,
    // Math
    Sin,
    Cos,
    Abs,
    Min,
    Max,
    Mod,
    Floor,
    Ceiling,
    Round,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "indexOf" => Function::IndexOf,
            "length" => Function::Length,
            "substr" => Function::Substr,
            "trim" => Function::Trim,
            "uppercase" => Function::Uppercase,
            "lowercase" => Function::Lowercase,
            "replace" => Function::Replace,
            "slice" => Function::Slice,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "abs" => Function::Abs,
            "min" => Function::Min,
            "max" => Function::Max,
            "mod" => Function::Mod,
            "floor" => Function::Floor,
            "ceiling" => Function::Ceiling,
            "round" => Function::Round,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::IndexOf => "indexOf",
            Function::Length => "length",
            Function::Substr => "substr",
            Function::Trim => "trim",
            Function::Uppercase => "uppercase",
            Function::Lowercase => "lowercase",
            Function::Replace => "replace",
            Function::Slice => "slice",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Abs => "abs",
            Function::Min => "min",
            Function::Max => "max",
            Function::Mod => "mod",
            Function::Floor => "floor",
            Function::Ceiling => "ceiling",
            Function::Round => "round",
        }
    }

    /// Number of arguments the function takes.
    pub fn arity(&self) -> usize {
        match self {
            Function::Length
            | Function::Trim
            | Function::Uppercase
            | Function::Lowercase
            | Function::Sin
            | Function::Cos
            | Function::Abs
            | Function::Floor
            | Function::Ceiling
            | Function::Round => 1,
            Function::IndexOf | Function::Min | Function::Max | Function::Mod => 2,
            Function::Substr | Function::Replace | Function::Slice => 3,
        }
    }
}

/// Apply a function to already-evaluated arguments.
pub fn call(function: Function, args: &[Value]) -> Result<Value> {
    if args.len() != function.arity() {
        return Err(Error::InvalidExpression(format!(
            "{} takes {} argument(s), got {}",
            function.name(),
            function.arity(),
            args.len()
        )));
    }

    match function {
        Function::IndexOf => {
            let haystack = args[0].render();
            let needle = args[1].render();
            let index = char_index_of(&haystack, &needle);
            Ok(Value::Integer(index))
        }
        Function::Length => Ok(Value::Integer(args[0].render().chars().count() as i64)),
        Function::Substr => {
            let s: Vec<char> = args[0].render().chars().collect();
            let start = args[1].to_number()? as i64;
            let len = args[2].to_number()? as i64;
            Ok(Value::String(substr(&s, start, len)))
        }
        Function::Trim => Ok(Value::String(args[0].render().trim().to_string())),
        Function::Uppercase => Ok(Value::String(args[0].render().to_uppercase())),
        Function::Lowercase => Ok(Value::String(args[0].render().to_lowercase())),
        Function::Replace => {
            let s = args[0].render();
            let from = args[1].render();
            let to = args[2].render();
            // First occurrence only, like String.prototype.replace.
            Ok(Value::String(s.replacen(&from, &to, 1)))
        }
        Function::Slice => {
            let s: Vec<char> = args[0].render().chars().collect();
            let start = args[1].to_number()? as i64;
            let end = args[2].to_number()? as i64;
            Ok(Value::String(slice(&s, start, end)))
        }
        Function::Sin => numeric(args[0].to_number()?.sin()),
        Function::Cos => numeric(args[0].to_number()?.cos()),
        Function::Abs => numeric(args[0].to_number()?.abs()),
        Function::Min => numeric(args[0].to_number()?.min(args[1].to_number()?)),
        Function::Max => numeric(args[0].to_number()?.max(args[1].to_number()?)),
        Function::Mod => {
            let a = args[0].to_number()?;
            let b = args[1].to_number()?;
            numeric(a % b)
        }
        Function::Floor => numeric(args[0].to_number()?.floor()),
        Function::Ceiling => numeric(args[0].to_number()?.ceil()),
        // Halves round up, as in the original runtime.
        Function::Round => numeric((args[0].to_number()? + 0.5).floor()),
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

fn char_index_of(haystack: &str, needle: &str) -> i64 {
    if needle.is_empty() {
        return 0;
    }
    match haystack.find(needle) {
        Some(byte_index) => haystack[..byte_index].chars().count() as i64,
        None => -1,
    }
}

/// `substr(start, length)` with a negative start counted from the end.
fn substr(chars: &[char], start: i64, len: i64) -> String {
    let total = chars.len() as i64;
    let begin = if start < 0 {
        (total + start).max(0)
    } else {
        start.min(total)
    };
    let take = len.max(0);
    chars
        .iter()
        .skip(begin as usize)
        .take(take as usize)
        .collect()
}

/// `slice(start, end)` with negative indexes counted from the end.
fn slice(chars: &[char], start: i64, end: i64) -> String {
    let total = chars.len() as i64;
    let clamp = |i: i64| {
        if i < 0 {
            (total + i).max(0)
        } else {
            i.min(total)
        }
    };
    let begin = clamp(start);
    let finish = clamp(end);
    if finish <= begin {
        return String::new();
    }
    chars[begin as usize..finish as usize].iter().collect()
}
