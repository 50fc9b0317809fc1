//! Variable context for expression evaluation
//!
//! An ordered name→value map built from the current measurement set. It is
//! invocation-local: rebuilt for every pipeline call, never shared or
//! mutated during evaluation.

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::value::Value;

/// Ordered variable map with unique keys (inserting an existing name
/// overwrites it in place).
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    values: IndexMap<String, Value>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from `(name, value)` pairs of JSON attribute values.
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Json)>,
    {
        let mut context = Self::new();
        for (name, value) in attributes {
            context.insert(name, Value::from_json(value));
        }
        context
    }

    /// Build a context from JSON attribute values, pre-coercing scalar
    /// strings: numeric strings become numbers and `"true"`/`"false"` become
    /// booleans. The jexl dialect expects native values in its context; the
    /// legacy dialect coerces inside its operators instead.
    pub fn from_attributes_coerced<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Json)>,
    {
        let mut context = Self::new();
        for (name, value) in attributes {
            context.insert(name, coerce_scalar(value));
        }
        context
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Resolve a variable. A miss is the engine-defined absent value, not an
    /// error.
    pub fn get(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or(Value::Undefined)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn coerce_scalar(value: &Json) -> Value {
    if let Json::String(s) = value {
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        match trimmed {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
    }
    Value::from_json(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_variable_resolves_to_undefined() {
        let context = VariableContext::new();
        assert_eq!(context.get("nope"), Value::Undefined);
    }

    #[test]
    fn coerced_context_parses_scalar_strings() {
        let raw = [
            ("level", json!("52")),
            ("ratio", json!("0.5")),
            ("armed", json!("true")),
            ("label", json!("block1")),
        ];
        let context =
            VariableContext::from_attributes_coerced(raw.iter().map(|(n, v)| (*n, v)));

        assert_eq!(context.get("level"), Value::Integer(52));
        assert_eq!(context.get("ratio"), Value::Float(0.5));
        assert_eq!(context.get("armed"), Value::Bool(true));
        assert_eq!(context.get("label"), Value::String("block1".into()));
    }

    #[test]
    fn reinsertion_overwrites_in_place() {
        let mut context = VariableContext::new();
        context.insert("t", Value::Integer(1));
        context.insert("t", Value::Integer(2));
        assert_eq!(context.get("t"), Value::Integer(2));
    }
}
