//! Timestamp handling
//!
//! Two transforms:
//!
//! - [`CompressTimestamp`] rewrites ISO8601-typed values between the basic
//!   calendar form devices send (`20071103T131805`) and the extended form
//!   the context protocol expects (`+002007-11-03T13:18:05`), in the update
//!   direction, and back in the query direction.
//! - [`TimestampProcess`] propagates a reported `TimeInstant` attribute into
//!   `TimeInstant` metadata on every other attribute of the entity.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value as Json;

use cuprum_models::{AttributeMetadata, ContextEntity, TypeInformation};

use crate::error::Result;
use crate::pipeline::Transform;

/// Attribute type tag that marks a compressible timestamp.
const TIMESTAMP_TYPE: &str = "ISO8601";
/// Reserved attribute carrying the measurement instant.
const TIMESTAMP_ATTRIBUTE: &str = "TimeInstant";

fn basic_format() -> &'static Regex {
    static BASIC: OnceLock<Regex> = OnceLock::new();
    BASIC.get_or_init(|| {
        Regex::new(r"^(\d{4})(\d{2})(\d{2})T(\d{2})(\d{2})(\d{2})$").unwrap()
    })
}

fn extended_format() -> &'static Regex {
    static EXTENDED: OnceLock<Regex> = OnceLock::new();
    EXTENDED.get_or_init(|| {
        Regex::new(r"^\+00(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})$").unwrap()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Update,
    Query,
}

fn convert(text: &str, direction: Direction) -> Option<String> {
    match direction {
        Direction::Update => basic_format().captures(text).map(|c| {
            format!(
                "+00{}-{}-{}T{}:{}:{}",
                &c[1], &c[2], &c[3], &c[4], &c[5], &c[6]
            )
        }),
        Direction::Query => extended_format()
            .captures(text)
            .map(|c| format!("{}{}{}T{}{}{}", &c[1], &c[2], &c[3], &c[4], &c[5], &c[6])),
    }
}

fn convert_value(value: &mut Json, direction: Direction) {
    if let Json::String(text) = value {
        if let Some(converted) = convert(text, direction) {
            *value = Json::String(converted);
        }
    }
}

/// Rewrites ISO8601 timestamps between basic and extended calendar forms.
#[derive(Debug)]
pub struct CompressTimestamp {
    direction: Direction,
}

impl CompressTimestamp {
    /// Update direction: basic in, extended out.
    pub fn update() -> Self {
        Self {
            direction: Direction::Update,
        }
    }

    /// Query direction: extended in, basic out.
    pub fn query() -> Self {
        Self {
            direction: Direction::Query,
        }
    }
}

impl Transform for CompressTimestamp {
    fn name(&self) -> &'static str {
        "compress-timestamp"
    }

    fn apply(
        &self,
        mut entities: Vec<ContextEntity>,
        _info: &TypeInformation,
    ) -> Result<Vec<ContextEntity>> {
        for entity in &mut entities {
            for attribute in &mut entity.attributes {
                if attribute.attribute_type == TIMESTAMP_TYPE {
                    convert_value(&mut attribute.value, self.direction);
                }
                for metadata in attribute.metadata.values_mut() {
                    if metadata.metadata_type == TIMESTAMP_TYPE {
                        convert_value(&mut metadata.value, self.direction);
                    }
                }
            }
        }
        Ok(entities)
    }
}

/// Propagates a `TimeInstant` attribute into metadata on its siblings.
///
/// A no-op unless the device type opts in with its `timestamp` flag.
#[derive(Debug, Default)]
pub struct TimestampProcess;

impl TimestampProcess {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for TimestampProcess {
    fn name(&self) -> &'static str {
        "timestamp-propagation"
    }

    fn apply(
        &self,
        mut entities: Vec<ContextEntity>,
        info: &TypeInformation,
    ) -> Result<Vec<ContextEntity>> {
        if !info.timestamp {
            return Ok(entities);
        }

        for entity in &mut entities {
            let Some(instant) = entity
                .attribute(TIMESTAMP_ATTRIBUTE)
                .map(|a| a.value.clone())
            else {
                continue;
            };
            for attribute in &mut entity.attributes {
                if attribute.name == TIMESTAMP_ATTRIBUTE {
                    continue;
                }
                attribute.metadata.insert(
                    TIMESTAMP_ATTRIBUTE.to_string(),
                    AttributeMetadata {
                        metadata_type: "DateTime".to_string(),
                        value: instant.clone(),
                    },
                );
            }
        }
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuprum_models::ContextAttribute;
    use serde_json::json;

    #[test]
    fn basic_expands_on_update_and_compresses_back_on_query() {
        assert_eq!(
            convert("20071103T131805", Direction::Update).as_deref(),
            Some("+002007-11-03T13:18:05")
        );
        assert_eq!(
            convert("+002007-11-03T13:18:05", Direction::Query).as_deref(),
            Some("20071103T131805")
        );
        // Anything else is left alone.
        assert_eq!(convert("2007-11-03T13:18:05Z", Direction::Update), None);
        assert_eq!(convert("20071103T131805", Direction::Query), None);
    }

    #[test]
    fn only_timestamp_typed_values_are_touched() {
        let mut entity = ContextEntity::new("ws1", "WeatherStation");
        entity.set_attribute(ContextAttribute::new(
            "measured",
            "ISO8601",
            json!("20071103T131805"),
        ));
        entity.set_attribute(ContextAttribute::new(
            "serial",
            "Text",
            json!("20071103T131805"),
        ));

        let info = TypeInformation::new("WeatherStation");
        let out = CompressTimestamp::update().apply(vec![entity], &info).unwrap();
        assert_eq!(out[0].attributes[0].value, json!("+002007-11-03T13:18:05"));
        assert_eq!(out[0].attributes[1].value, json!("20071103T131805"));
    }

    #[test]
    fn time_instant_propagates_to_sibling_metadata() {
        let mut entity = ContextEntity::new("ws1", "WeatherStation");
        entity.set_attribute(ContextAttribute::new("pressure", "Number", json!(52)));
        entity.set_attribute(ContextAttribute::new(
            "TimeInstant",
            "DateTime",
            json!("2007-11-03T13:18:05.000Z"),
        ));

        let mut info = TypeInformation::new("WeatherStation");
        info.timestamp = true;

        let out = TimestampProcess::new().apply(vec![entity], &info).unwrap();
        let pressure = out[0].attribute("pressure").unwrap();
        let meta = pressure.metadata.get("TimeInstant").unwrap();
        assert_eq!(meta.metadata_type, "DateTime");
        assert_eq!(meta.value, json!("2007-11-03T13:18:05.000Z"));

        // The instant itself carries no self-referential metadata.
        assert!(out[0]
            .attribute("TimeInstant")
            .unwrap()
            .metadata
            .is_empty());
    }

    #[test]
    fn propagation_requires_the_type_flag() {
        let mut entity = ContextEntity::new("ws1", "WeatherStation");
        entity.set_attribute(ContextAttribute::new("pressure", "Number", json!(52)));
        entity.set_attribute(ContextAttribute::new(
            "TimeInstant",
            "DateTime",
            json!("2007-11-03T13:18:05.000Z"),
        ));

        let info = TypeInformation::new("WeatherStation");
        let out = TimestampProcess::new().apply(vec![entity], &info).unwrap();
        assert!(out[0].attribute("pressure").unwrap().metadata.is_empty());
    }
}
