//! Expression transformation
//!
//! Computes derived attributes: every active declaration carrying an
//! expression is evaluated against a context built from the entity's current
//! attributes, and the result either overwrites the reported value or is
//! appended as a new, computed attribute. A declaration whose variables are
//! not all present is skipped for this update; a parse or evaluation failure
//! aborts the pipeline.

use serde_json::Value as Json;
use tracing::{debug, warn};

use cuprum_expression::{Engine, Value, VariableContext};
use cuprum_models::{ContextAttribute, ContextEntity, ExpressionDialect, TypeInformation};

use crate::error::{Error, Result};
use crate::pipeline::{effective_dialect, Transform};

/// Update-path transform computing expression-declared attributes.
#[derive(Debug)]
pub struct ExpressionTransformation {
    default_dialect: ExpressionDialect,
}

impl ExpressionTransformation {
    pub fn new(default_dialect: ExpressionDialect) -> Self {
        Self { default_dialect }
    }
}

/// Variable context from an entity's attributes.
///
/// The jexl dialect expects native values and gets scalar strings
/// pre-coerced; the legacy dialect coerces inside its operators.
pub(crate) fn entity_context(
    entity: &ContextEntity,
    dialect: ExpressionDialect,
) -> VariableContext {
    let pairs = entity
        .attributes
        .iter()
        .map(|a| (a.name.as_str(), &a.value));
    match dialect {
        ExpressionDialect::Legacy => VariableContext::from_attributes(pairs),
        ExpressionDialect::Jexl => VariableContext::from_attributes_coerced(pairs),
    }
}

/// Cast an evaluation result to the declared attribute type.
///
/// Cast failures degrade to the uncast result; only evaluation itself can
/// abort the pipeline.
fn cast(value: Value, declared_type: &str) -> Json {
    match declared_type {
        "Number" => match value.to_number() {
            Ok(number) => Value::from_f64(number).into_json().unwrap_or(Json::Null),
            Err(_) => {
                warn!(declared_type, "computed value is not a number, keeping it as evaluated");
                value.into_json().unwrap_or(Json::Null)
            }
        },
        "Boolean" => match &value {
            Value::Bool(b) => Json::Bool(*b),
            Value::String(s) if s == "true" => Json::Bool(true),
            Value::String(s) if s == "false" => Json::Bool(false),
            _ => {
                warn!(declared_type, "computed value is not a boolean, keeping it as evaluated");
                value.into_json().unwrap_or(Json::Null)
            }
        },
        "None" => Json::Null,
        "Text" | "String" => match value {
            structured @ (Value::Array(_) | Value::Object(_)) => {
                structured.into_json().unwrap_or(Json::Null)
            }
            scalar => Json::String(scalar.render()),
        },
        _ => value.into_json().unwrap_or(Json::Null),
    }
}

impl Transform for ExpressionTransformation {
    fn name(&self) -> &'static str {
        "expression-transformation"
    }

    fn apply(
        &self,
        mut entities: Vec<ContextEntity>,
        info: &TypeInformation,
    ) -> Result<Vec<ContextEntity>> {
        let dialect = effective_dialect(info, self.default_dialect);
        let engine = Engine::new(dialect);

        for entity in &mut entities {
            // One context per entity, from the values as reported. Earlier
            // computed attributes are not visible to later expressions.
            let context = entity_context(entity, dialect);

            for declaration in &info.active {
                let Some(expression) = &declaration.expression else {
                    continue;
                };

                let fail = |source| Error::AttributeExpression {
                    name: declaration.name.clone(),
                    attribute_type: declaration.attribute_type.clone(),
                    source,
                };

                if !engine.context_available(expression, &context).map_err(fail)? {
                    debug!(
                        attribute = %declaration.name,
                        "expression variables missing, skipping computed attribute"
                    );
                    continue;
                }

                let value = engine.apply_expression(expression, &context).map_err(fail)?;
                let coerced = cast(value, &declaration.attribute_type);

                match entity.attribute_mut(&declaration.name) {
                    Some(existing) => {
                        existing.value = coerced;
                        existing.attribute_type = declaration.attribute_type.clone();
                    }
                    None => {
                        let mut attribute = ContextAttribute::new(
                            declaration.name.clone(),
                            declaration.attribute_type.clone(),
                            coerced,
                        );
                        attribute.metadata = declaration.metadata.clone();
                        entity.attributes.push(attribute);
                    }
                }
            }
        }
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuprum_models::AttributeDeclaration;
    use serde_json::json;

    fn apply_to(entity: ContextEntity, info: &TypeInformation) -> Result<ContextEntity> {
        let transform = ExpressionTransformation::new(ExpressionDialect::Legacy);
        let mut out = transform.apply(vec![entity], info)?;
        Ok(out.remove(0))
    }

    #[test]
    fn overwrites_a_reported_attribute_in_place() {
        let mut info = TypeInformation::new("WeatherStation");
        info.active.push(
            AttributeDeclaration::new("pressure", "Number")
                .with_object_id("p")
                .with_expression("${@pressure * 20}"),
        );

        let mut entity = ContextEntity::new("ws1", "WeatherStation");
        entity.set_attribute(ContextAttribute::new("pressure", "Number", json!(52)));

        let out = apply_to(entity, &info).unwrap();
        assert_eq!(out.attributes.len(), 1);
        assert_eq!(out.attributes[0].value, json!(1040));
    }

    #[test]
    fn synthesizes_a_computed_attribute() {
        let mut info = TypeInformation::new("WeatherStation");
        info.active.push(
            AttributeDeclaration::new("pressure25", "Number")
                .with_expression("${@pressure * 2.5}"),
        );

        let mut entity = ContextEntity::new("ws1", "WeatherStation");
        entity.set_attribute(ContextAttribute::new("pressure", "Number", json!(52)));

        let out = apply_to(entity, &info).unwrap();
        assert_eq!(out.attribute("pressure25").unwrap().value, json!(130));
    }

    #[test]
    fn missing_variables_skip_without_error() {
        let mut info = TypeInformation::new("WeatherStation");
        info.active.push(
            AttributeDeclaration::new("combined", "Number")
                .with_expression("${@pressure + @humidity}"),
        );

        let mut entity = ContextEntity::new("ws1", "WeatherStation");
        entity.set_attribute(ContextAttribute::new("pressure", "Number", json!(52)));

        let out = apply_to(entity, &info).unwrap();
        assert!(out.attribute("combined").is_none());
        assert_eq!(out.attributes.len(), 1);
    }

    #[test]
    fn evaluation_failure_aborts_with_the_declared_type() {
        let mut info = TypeInformation::new("WeatherStation");
        info.active.push(
            AttributeDeclaration::new("broken", "Number").with_expression("${@pressure * }"),
        );

        let mut entity = ContextEntity::new("ws1", "WeatherStation");
        entity.set_attribute(ContextAttribute::new("pressure", "Number", json!(52)));

        let err = apply_to(entity, &info).unwrap_err();
        match err {
            Error::AttributeExpression {
                name,
                attribute_type,
                ..
            } => {
                assert_eq!(name, "broken");
                assert_eq!(attribute_type, "Number");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn text_results_render_as_strings() {
        let mut info = TypeInformation::new("WeatherStation");
        info.active.push(
            AttributeDeclaration::new("label", "Text")
                .with_expression("Pressure is ${@pressure}"),
        );

        let mut entity = ContextEntity::new("ws1", "WeatherStation");
        entity.set_attribute(ContextAttribute::new("pressure", "Number", json!(52)));

        let out = apply_to(entity, &info).unwrap();
        assert_eq!(out.attribute("label").unwrap().value, json!("Pressure is 52"));
    }

    #[test]
    fn jexl_expressions_use_the_coerced_context() {
        let mut info = TypeInformation::new("Light");
        info.expression_language = Some(ExpressionDialect::Jexl);
        info.active.push(
            AttributeDeclaration::new("double", "Number").with_expression("luminosity * 2"),
        );

        let mut entity = ContextEntity::new("l1", "Light");
        entity.set_attribute(ContextAttribute::new("luminosity", "Text", json!("21")));

        let transform = ExpressionTransformation::new(ExpressionDialect::Legacy);
        let out = transform.apply(vec![entity], &info).unwrap();
        assert_eq!(out[0].attribute("double").unwrap().value, json!(42));
    }
}
