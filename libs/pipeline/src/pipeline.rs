//! Pipeline contract and entry points
//!
//! A pipeline is two frozen, ordered lists of transforms, one per direction.
//! Built-in transforms are ordinary [`Transform`] values, indistinguishable
//! from caller-supplied ones; the pipeline has no privileged logic beyond
//! ordering. Registration happens only through [`PipelineBuilder`] before
//! [`PipelineBuilder::build`]; a built pipeline cannot be mutated, so
//! registration after startup is impossible by construction.

use std::sync::Arc;

use tracing::debug;

use cuprum_models::{ContextAttribute, ContextEntity, ExpressionDialect, Measurement, TypeInformation};

use crate::alias::AliasResolution;
use crate::coercion::TypeCoercion;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::expression::ExpressionTransformation;
use crate::multi_entity::MultiEntity;
use crate::timestamp::{CompressTimestamp, TimestampProcess};

/// One pipeline stage.
///
/// A transform maps the whole entity sequence so fan-out can grow it;
/// single-entity transforms map over each element. Transforms never mutate
/// the `TypeInformation` and hold no state across invocations.
pub trait Transform: Send + Sync {
    /// Stage name for diagnostics.
    fn name(&self) -> &'static str;

    fn apply(
        &self,
        entities: Vec<ContextEntity>,
        info: &TypeInformation,
    ) -> Result<Vec<ContextEntity>>;
}

/// Dialect for one invocation: the device type's tag, falling back to the
/// agent-wide default.
pub(crate) fn effective_dialect(
    info: &TypeInformation,
    default: ExpressionDialect,
) -> ExpressionDialect {
    info.expression_language.unwrap_or(default)
}

/// Append-only assembly point for a pipeline.
pub struct PipelineBuilder {
    update: Vec<Arc<dyn Transform>>,
    query: Vec<Arc<dyn Transform>>,
}

impl PipelineBuilder {
    /// An empty builder with no registered transforms.
    pub fn new() -> Self {
        Self {
            update: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Builder pre-loaded with the built-in transforms in canonical order.
    pub fn standard(config: &PipelineConfig) -> Self {
        let mut builder = Self::new();
        if config.timestamp {
            builder = builder.add_update_transform(CompressTimestamp::update());
        }
        builder = builder
            .add_update_transform(AliasResolution::new())
            .add_update_transform(TypeCoercion::new())
            .add_update_transform(ExpressionTransformation::new(config.default_dialect))
            .add_update_transform(MultiEntity::new(config.default_dialect));
        if config.timestamp {
            builder = builder
                .add_update_transform(TimestampProcess::new())
                .add_query_transform(CompressTimestamp::query());
        }
        builder
    }

    pub fn add_update_transform(mut self, transform: impl Transform + 'static) -> Self {
        self.update.push(Arc::new(transform));
        self
    }

    pub fn add_query_transform(mut self, transform: impl Transform + 'static) -> Self {
        self.query.push(Arc::new(transform));
        self
    }

    /// Freeze both transform lists.
    pub fn build(self) -> Pipeline {
        Pipeline {
            update: self.update,
            query: self.query,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable transform chain, shared across concurrent invocations.
pub struct Pipeline {
    update: Vec<Arc<dyn Transform>>,
    query: Vec<Arc<dyn Transform>>,
}

impl Pipeline {
    /// Update-direction entry point.
    ///
    /// Builds the initial entity from the reported measurements and threads
    /// it through the update chain. The wire `object_id` is the initial
    /// attribute name when present (alias resolution maps it to the
    /// protocol name); the reserved names `id` and `type` are prefixed to
    /// keep them off the entity surface.
    pub fn update(
        &self,
        entity_id: &str,
        entity_type: &str,
        measurements: &[Measurement],
        info: &TypeInformation,
    ) -> Result<Vec<ContextEntity>> {
        let mut entity = ContextEntity::new(entity_id, entity_type);
        for measurement in measurements {
            let name = measurement
                .object_id
                .as_deref()
                .unwrap_or(&measurement.name);
            let name = match name {
                "id" => "measure_id",
                "type" => "measure_type",
                other => other,
            };
            entity.set_attribute(ContextAttribute::new(
                name,
                measurement.measurement_type.clone(),
                measurement.value.clone(),
            ));
        }
        for attribute in &info.static_attributes {
            entity.set_attribute(attribute.clone());
        }

        self.thread(&self.update, vec![entity], info)
    }

    /// Query-direction entry point.
    ///
    /// Takes the decoded query response (obtaining it is the caller's
    /// concern) and threads it through the query chain.
    pub fn query(&self, entity: ContextEntity, info: &TypeInformation) -> Result<ContextEntity> {
        let entities = self.thread(&self.query, vec![entity], info)?;
        entities
            .into_iter()
            .next()
            .ok_or_else(|| Error::transform("pipeline", "query chain produced no entity"))
    }

    fn thread(
        &self,
        transforms: &[Arc<dyn Transform>],
        mut entities: Vec<ContextEntity>,
        info: &TypeInformation,
    ) -> Result<Vec<ContextEntity>> {
        for transform in transforms {
            debug!(transform = transform.name(), "applying transform");
            entities = transform.apply(entities, info)?;
        }
        Ok(entities)
    }
}
