//! Alias resolution
//!
//! Devices report attributes under short wire identifiers (`object_id`); the
//! device-type schema maps each one to a protocol-facing name and type. The
//! alias map is derived from the schema on every invocation and applied as a
//! pure rename on the update path. The query path is a pass-through: query
//! responses already carry protocol names.

use indexmap::IndexMap;

use cuprum_models::{ContextEntity, TypeInformation};

use crate::error::Result;
use crate::pipeline::Transform;

/// Rename target for one wire identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTarget {
    pub name: String,
    pub attribute_type: String,
}

/// Bidirectional wire-id / protocol-name mapping, derived per invocation.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    direct: IndexMap<String, AliasTarget>,
    inverse: IndexMap<String, String>,
}

impl AliasMap {
    /// Fold every declaration from the active, lazy and command lists.
    ///
    /// A later declaration for the same `object_id` wins, matching the
    /// fold order of the schema lists.
    pub fn from_type_information(info: &TypeInformation) -> Self {
        let mut map = Self::default();
        for declaration in info.all_declarations() {
            let Some(object_id) = &declaration.object_id else {
                continue;
            };
            map.direct.insert(
                object_id.clone(),
                AliasTarget {
                    name: declaration.name.clone(),
                    attribute_type: declaration.attribute_type.clone(),
                },
            );
            map.inverse
                .insert(declaration.name.clone(), object_id.clone());
        }
        map
    }

    /// Protocol name and type for a wire identifier.
    pub fn resolve(&self, object_id: &str) -> Option<&AliasTarget> {
        self.direct.get(object_id)
    }

    /// Wire identifier for a protocol name.
    pub fn object_id(&self, name: &str) -> Option<&str> {
        self.inverse.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty()
    }
}

/// Update-path transform renaming wire identifiers to protocol names.
#[derive(Debug, Default)]
pub struct AliasResolution;

impl AliasResolution {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for AliasResolution {
    fn name(&self) -> &'static str {
        "alias-resolution"
    }

    fn apply(
        &self,
        entities: Vec<ContextEntity>,
        info: &TypeInformation,
    ) -> Result<Vec<ContextEntity>> {
        let aliases = AliasMap::from_type_information(info);
        if aliases.is_empty() {
            return Ok(entities);
        }

        let renamed = entities
            .into_iter()
            .map(|entity| {
                let mut out = ContextEntity::new(entity.id, entity.entity_type);
                for mut attribute in entity.attributes {
                    if let Some(target) = aliases.resolve(&attribute.name) {
                        attribute.name = target.name.clone();
                        attribute.attribute_type = target.attribute_type.clone();
                    }
                    // Re-insertion keeps names unique when a rename collides
                    // with an attribute already present.
                    out.set_attribute(attribute);
                }
                out
            })
            .collect();
        Ok(renamed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuprum_models::{AttributeDeclaration, ContextAttribute};
    use serde_json::json;

    fn thermometer() -> TypeInformation {
        let mut info = TypeInformation::new("Thermometer");
        info.active
            .push(AttributeDeclaration::new("temperature", "Number").with_object_id("t"));
        info.lazy
            .push(AttributeDeclaration::new("battery", "Number").with_object_id("b"));
        info
    }

    #[test]
    fn map_covers_every_declaration_list() {
        let aliases = AliasMap::from_type_information(&thermometer());
        assert_eq!(aliases.resolve("t").unwrap().name, "temperature");
        assert_eq!(aliases.resolve("b").unwrap().name, "battery");
        assert_eq!(aliases.object_id("temperature"), Some("t"));
    }

    #[test]
    fn renames_mapped_attributes_and_passes_the_rest() {
        let mut entity = ContextEntity::new("th1", "Thermometer");
        entity.set_attribute(ContextAttribute::new("t", "string", json!("21")));
        entity.set_attribute(ContextAttribute::new("humidity", "Number", json!(40)));

        let out = AliasResolution::new()
            .apply(vec![entity], &thermometer())
            .unwrap();
        let names: Vec<&str> = out[0].attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["temperature", "humidity"]);
        assert_eq!(out[0].attributes[0].attribute_type, "Number");
    }

    #[test]
    fn rebuilding_from_the_same_schema_is_value_equal() {
        let info = thermometer();
        let first = AliasMap::from_type_information(&info);
        let second = AliasMap::from_type_information(&info);
        assert_eq!(first.resolve("t"), second.resolve("t"));
        assert_eq!(first.object_id("battery"), second.object_id("battery"));
    }
}
