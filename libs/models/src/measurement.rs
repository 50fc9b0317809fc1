//! Device measurements
//!
//! A measurement is one attribute sample reported by a device. Values arrive
//! as strings on the update path (devices speak text); command results may
//! already carry a typed value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One reported attribute sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    #[serde(rename = "type")]
    pub measurement_type: String,
    pub value: Value,
    /// Device-local wire identifier, present on the update path.
    #[serde(rename = "object_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

impl Measurement {
    pub fn new(name: impl Into<String>, measurement_type: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            measurement_type: measurement_type.into(),
            value,
            object_id: None,
        }
    }
}
