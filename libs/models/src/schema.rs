//! Device-type schema
//!
//! [`TypeInformation`] is the full provisioning schema for a class of
//! devices: which attributes they report ("active"), which can be queried on
//! demand ("lazy"), which commands they accept, and how attributes map onto
//! context entities. It is read-only input for the pipeline, shared by
//! reference across concurrent invocations and never mutated by a transform.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entity::{AttributeMetadata, ContextAttribute};

/// Expression grammar/evaluation ruleset used for computed attributes and
/// computed entity identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionDialect {
    /// The original arithmetic/string grammar (`@var`, `#` concatenation).
    #[default]
    Legacy,
    /// The richer v2 syntax: bare identifiers, member/index access,
    /// comparison and logical operators.
    Jexl,
}

/// Static schema entry for one device attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDeclaration {
    /// Device-local wire identifier for this attribute.
    #[serde(rename = "object_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    /// Protocol-facing attribute name.
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: String,
    /// Target entity for multi-entity fan-out. May embed `${...}`
    /// expressions.
    #[serde(rename = "entity_name", skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(rename = "entity_type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// Expression computing this attribute's value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, AttributeMetadata>,
}

impl AttributeDeclaration {
    pub fn new(name: impl Into<String>, attribute_type: impl Into<String>) -> Self {
        Self {
            object_id: None,
            name: name.into(),
            attribute_type: attribute_type.into(),
            entity_name: None,
            entity_type: None,
            expression: None,
            metadata: IndexMap::new(),
        }
    }

    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = Some(object_id.into());
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_entity(
        mut self,
        entity_name: impl Into<String>,
        entity_type: Option<String>,
    ) -> Self {
        self.entity_name = Some(entity_name.into());
        self.entity_type = entity_type;
        self
    }
}

/// Full device-type schema, owned by the calling service layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeInformation {
    /// Default entity type for devices of this class.
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subservice: Option<String>,
    /// Attributes actively reported by the device.
    #[serde(default)]
    pub active: Vec<AttributeDeclaration>,
    /// Attributes served on demand.
    #[serde(default)]
    pub lazy: Vec<AttributeDeclaration>,
    /// Commands the device accepts.
    #[serde(default)]
    pub commands: Vec<AttributeDeclaration>,
    /// Fixed attributes attached to every update.
    #[serde(rename = "staticAttributes", default, skip_serializing_if = "Vec::is_empty")]
    pub static_attributes: Vec<ContextAttribute>,
    /// Whether updates should carry timestamp metadata.
    #[serde(default)]
    pub timestamp: bool,
    /// Expression dialect for this device type; falls back to the agent-wide
    /// default when absent.
    #[serde(rename = "expressionLanguage", skip_serializing_if = "Option::is_none")]
    pub expression_language: Option<ExpressionDialect>,
}

impl TypeInformation {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            ..Default::default()
        }
    }

    /// All attribute declarations, across active, lazy and command lists.
    pub fn all_declarations(&self) -> impl Iterator<Item = &AttributeDeclaration> {
        self.active
            .iter()
            .chain(self.lazy.iter())
            .chain(self.commands.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_tag_round_trips() {
        let info: TypeInformation = serde_json::from_str(
            r#"{
                "type": "Light",
                "expressionLanguage": "jexl",
                "active": [
                    { "object_id": "l", "name": "luminosity", "type": "Number" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(info.expression_language, Some(ExpressionDialect::Jexl));
        assert_eq!(info.active[0].object_id.as_deref(), Some("l"));

        let encoded = serde_json::to_value(&info).unwrap();
        assert_eq!(encoded["expressionLanguage"], "jexl");
    }

    #[test]
    fn all_declarations_covers_every_list() {
        let mut info = TypeInformation::new("Robot");
        info.active.push(AttributeDeclaration::new("speed", "Number"));
        info.lazy.push(AttributeDeclaration::new("battery", "Number"));
        info.commands.push(AttributeDeclaration::new("position", "Array"));

        let names: Vec<&str> = info.all_declarations().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["speed", "battery", "position"]);
    }
}
