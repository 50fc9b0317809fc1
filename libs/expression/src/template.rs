//! `${...}` template application
//!
//! Computed entity identifiers and attribute values are written as literal
//! text with embedded `${expression}` segments ("Station Number ${@sn * 10}").
//! Each segment is evaluated exactly once against the provided context and
//! substituted into the surrounding text.

use std::sync::OnceLock;

use cuprum_models::ExpressionDialect;
use regex::Regex;

use crate::context::VariableContext;
use crate::engine::Engine;
use crate::error::Result;
use crate::value::Value;

fn template_regex() -> &'static Regex {
    static TEMPLATE: OnceLock<Regex> = OnceLock::new();
    TEMPLATE.get_or_init(|| Regex::new(r"\$\{([^}]*)\}").unwrap())
}

/// Whether a text embeds at least one `${...}` segment.
pub fn has_template(text: &str) -> bool {
    template_regex().is_match(text)
}

/// The embedded expressions of a template text.
///
/// Text without any `${...}` is one whole expression in the jexl dialect and
/// plain literal text (no segments) in the legacy dialect.
pub fn expression_segments(text: &str, dialect: ExpressionDialect) -> Vec<String> {
    let captures: Vec<String> = template_regex()
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect();
    if captures.is_empty() && dialect == ExpressionDialect::Jexl && !text.trim().is_empty() {
        return vec![text.to_string()];
    }
    captures
}

/// Apply a template text against a context.
pub fn apply(engine: &Engine, text: &str, context: &VariableContext) -> Result<Value> {
    let regex = template_regex();

    // A text that is exactly one template keeps the typed result instead of
    // round-tripping through a string.
    if let Some(captures) = regex.captures(text) {
        if captures.get(0).map(|m| m.as_str()) == Some(text.trim()) {
            let ast = engine.parse(&captures[1])?;
            return engine.eval(&ast, context);
        }

        let mut out = String::new();
        let mut last = 0;
        for captures in regex.captures_iter(text) {
            let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            let ast = engine.parse(inner.as_str())?;
            out.push_str(&engine.eval(&ast, context)?.render());
            last = whole.end();
        }
        out.push_str(&text[last..]);
        return Ok(Value::String(out));
    }

    // No template present: jexl treats the text as one expression, the
    // legacy dialect as a literal.
    if engine.dialect() == ExpressionDialect::Jexl {
        let ast = engine.parse(text)?;
        engine.eval(&ast, context)
    } else {
        Ok(Value::String(text.to_string()))
    }
}
