//! Multi-entity fan-out
//!
//! A device can spread its attributes across several context entities: any
//! active declaration carrying an `entity_name` sends its attribute to that
//! entity instead of the primary one. Entity names may embed `${...}`
//! expressions, resolved against a context built from the full measurement
//! set, so one attribute's target can depend on another attribute's value.
//!
//! Grouping is by resolved identifier; each name expression is evaluated
//! exactly once per attribute per update. Output order is the primary entity
//! first, then derived entities in order of first occurrence.

use indexmap::IndexMap;

use cuprum_expression::{template, Engine};
use cuprum_models::{ContextEntity, ExpressionDialect, TypeInformation};

use crate::error::Result;
use crate::expression::entity_context;
use crate::pipeline::{effective_dialect, Transform};

/// Update-path transform partitioning attributes across target entities.
#[derive(Debug)]
pub struct MultiEntity {
    default_dialect: ExpressionDialect,
}

impl MultiEntity {
    pub fn new(default_dialect: ExpressionDialect) -> Self {
        Self { default_dialect }
    }
}

impl Transform for MultiEntity {
    fn name(&self) -> &'static str {
        "multi-entity"
    }

    fn apply(
        &self,
        entities: Vec<ContextEntity>,
        info: &TypeInformation,
    ) -> Result<Vec<ContextEntity>> {
        let mut entities = entities.into_iter();
        let Some(mut primary) = entities.next() else {
            return Ok(Vec::new());
        };
        let rest: Vec<ContextEntity> = entities.collect();

        let dialect = effective_dialect(info, self.default_dialect);
        let engine = Engine::new(dialect);
        // The full measurement context, shared by every name expression in
        // this update.
        let context = entity_context(&primary, dialect);

        let mut derived: IndexMap<String, ContextEntity> = IndexMap::new();
        let mut consumed: Vec<String> = Vec::new();

        for declaration in &info.active {
            let Some(entity_name) = &declaration.entity_name else {
                continue;
            };
            let Some(attribute) = primary.attribute(&declaration.name) else {
                continue;
            };

            // A name without an embedded expression is the literal string,
            // whatever the dialect; only `${...}` segments are evaluated.
            let target_id = if template::has_template(entity_name) {
                engine.apply_expression(entity_name, &context)?.render()
            } else {
                entity_name.clone()
            };
            let target = derived.entry(target_id.clone()).or_insert_with(|| {
                ContextEntity::new(
                    target_id,
                    declaration
                        .entity_type
                        .clone()
                        .unwrap_or_else(|| primary.entity_type.clone()),
                )
            });
            target.set_attribute(attribute.clone());
            consumed.push(declaration.name.clone());
        }

        primary
            .attributes
            .retain(|attribute| !consumed.contains(&attribute.name));

        let mut out = Vec::with_capacity(1 + derived.len() + rest.len());
        out.push(primary);
        out.extend(derived.into_values());
        out.extend(rest);
        Ok(out)
    }
}
