//! Context entity representation
//!
//! A context entity is the structured, typed view of a real-world object in
//! the target context-management protocol: an id, a type, and an ordered list
//! of named attributes. Attribute order is preserved end to end so that
//! pipeline output is deterministic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata entry attached to a context attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    #[serde(rename = "type")]
    pub metadata_type: String,
    pub value: Value,
}

/// One named, typed attribute of a context entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, AttributeMetadata>,
}

impl ContextAttribute {
    pub fn new(name: impl Into<String>, attribute_type: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            attribute_type: attribute_type.into(),
            value,
            metadata: IndexMap::new(),
        }
    }
}

/// The working representation manipulated by the transformation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub attributes: Vec<ContextAttribute>,
}

impl ContextEntity {
    pub fn new(id: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            attributes: Vec::new(),
        }
    }

    /// Look up an attribute by its current name.
    pub fn attribute(&self, name: &str) -> Option<&ContextAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut ContextAttribute> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }

    /// Insert or replace an attribute, keeping names unique.
    ///
    /// Replacement preserves the position of the existing attribute; new
    /// attributes are appended.
    pub fn set_attribute(&mut self, attribute: ContextAttribute) {
        match self.attribute_mut(&attribute.name) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut entity = ContextEntity::new("light1", "Lamp");
        entity.set_attribute(ContextAttribute::new("luminosity", "Number", json!(10)));
        entity.set_attribute(ContextAttribute::new("status", "Text", json!("on")));
        entity.set_attribute(ContextAttribute::new("luminosity", "Number", json!(12)));

        assert_eq!(entity.attributes.len(), 2);
        assert_eq!(entity.attributes[0].name, "luminosity");
        assert_eq!(entity.attributes[0].value, json!(12));
    }

    #[test]
    fn entity_serializes_with_protocol_field_names() {
        let mut entity = ContextEntity::new("ws4", "WeatherStation");
        entity.set_attribute(ContextAttribute::new("pressure", "Number", json!(52)));

        let encoded = serde_json::to_value(&entity).unwrap();
        assert_eq!(encoded["type"], json!("WeatherStation"));
        assert_eq!(encoded["attributes"][0]["type"], json!("Number"));
        // Empty metadata maps stay off the wire.
        assert!(encoded["attributes"][0].get("metadata").is_none());
    }
}
