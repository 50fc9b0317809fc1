//! Attribute transformation pipeline
//!
//! Converts device-native attribute samples into protocol-correct context
//! entities through an ordered chain of pure transforms:
//!
//! ```text
//! measurements
//!      |
//!   compress-timestamp      basic -> extended ISO8601
//!   alias-resolution        wire object_id -> protocol name/type
//!   type-coercion           raw strings -> native values
//!   expression-transform    computed attributes
//!   multi-entity            fan-out across target entities
//!   timestamp-propagation   TimeInstant metadata
//!      |
//! context entities
//! ```
//!
//! The query direction runs its own (much shorter) chain over decoded
//! responses. Transforms are pure: invocations share nothing but the
//! read-only `TypeInformation`, so concurrent updates need no
//! synchronization. Hard failures ([`Error`]) abort an invocation at the
//! first failing stage; recoverable degradations fall back and log.

pub mod alias;
pub mod coercion;
pub mod config;
pub mod error;
pub mod expression;
pub mod multi_entity;
pub mod pipeline;
pub mod timestamp;

pub use alias::{AliasMap, AliasResolution};
pub use coercion::{coerce, TypeCoercion};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use expression::ExpressionTransformation;
pub use multi_entity::MultiEntity;
pub use pipeline::{Pipeline, PipelineBuilder, Transform};
pub use timestamp::{CompressTimestamp, TimestampProcess};
