//! Type coercion
//!
//! Devices speak text: measurement values arrive as strings regardless of
//! the declared attribute type. This transform converts raw strings into
//! native JSON values based on the attribute's declared type tag. Coercion
//! never aborts the pipeline; a value that cannot be parsed passes through
//! unchanged, with a warning for structured types.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde_json::Value as Json;
use tracing::{debug, warn};

use cuprum_models::{ContextEntity, TypeInformation};

use crate::error::Result;
use crate::pipeline::Transform;

/// Coerce one raw value against a declared type tag.
///
/// Already-native values (and unknown type tags) pass through unchanged, so
/// coercion is idempotent.
pub fn coerce(raw: &Json, declared_type: &str) -> Json {
    if declared_type == "None" {
        return Json::Null;
    }
    let Json::String(text) = raw else {
        return raw.clone();
    };

    match declared_type {
        "Number" => coerce_number(text).unwrap_or_else(|| {
            debug!(value = %text, "value is not a number, keeping the raw string");
            raw.clone()
        }),
        "Boolean" => match text.trim() {
            "true" => Json::Bool(true),
            "false" => Json::Bool(false),
            _ => {
                debug!(value = %text, "value is not a boolean, keeping the raw string");
                raw.clone()
            }
        },
        "Array" | "Object" => match serde_json::from_str::<Json>(text) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(
                    value = %text,
                    declared_type,
                    %error,
                    "structured value failed to parse, keeping the raw string"
                );
                raw.clone()
            }
        },
        "Date" => match text.trim().parse::<NaiveDate>() {
            Ok(date) => Json::String(date.to_string()),
            Err(_) => {
                debug!(value = %text, "value is not a date, keeping the raw string");
                raw.clone()
            }
        },
        "Time" => match text.trim().parse::<NaiveTime>() {
            Ok(time) => Json::String(time.to_string()),
            Err(_) => {
                debug!(value = %text, "value is not a time, keeping the raw string");
                raw.clone()
            }
        },
        "DateTime" | "ISO8601" => match DateTime::parse_from_rfc3339(text.trim()) {
            Ok(instant) => Json::String(
                instant
                    .with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            Err(_) => {
                debug!(value = %text, "value is not a datetime, keeping the raw string");
                raw.clone()
            }
        },
        _ => raw.clone(),
    }
}

fn coerce_number(text: &str) -> Option<Json> {
    let trimmed = text.trim();
    // A fractional or exponent marker selects floating representation.
    if trimmed.contains(['.', 'e', 'E']) {
        let parsed: f64 = trimmed.parse().ok()?;
        serde_json::Number::from_f64(parsed).map(Json::Number)
    } else {
        let parsed: i64 = trimmed.parse().ok()?;
        Some(Json::Number(parsed.into()))
    }
}

/// Update-path transform coercing every attribute value against its
/// (post-alias) declared type.
#[derive(Debug, Default)]
pub struct TypeCoercion;

impl TypeCoercion {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for TypeCoercion {
    fn name(&self) -> &'static str {
        "type-coercion"
    }

    fn apply(
        &self,
        mut entities: Vec<ContextEntity>,
        _info: &TypeInformation,
    ) -> Result<Vec<ContextEntity>> {
        for entity in &mut entities {
            for attribute in &mut entity.attributes {
                attribute.value = coerce(&attribute.value, &attribute.attribute_type);
            }
        }
        Ok(entities)
    }
}
