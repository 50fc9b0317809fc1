//! Shared data model for the cuprum IoT agent library
//!
//! This crate provides the protocol-version-neutral types exchanged between
//! the transformation pipeline and its collaborators:
//!
//! - [`Measurement`]: one reported attribute sample, as it arrives from a
//!   device (raw string values, wire-level object ids).
//! - [`AttributeDeclaration`] / [`TypeInformation`]: the static schema of a
//!   device type (which attributes it reports, how they map to entities,
//!   which expression dialect applies).
//! - [`ContextEntity`] / [`ContextAttribute`]: the working representation
//!   the pipeline manipulates. Serialization to a concrete wire protocol
//!   version is the broker client's job, not ours.
//!
//! All types are plain data with serde support; nothing here performs I/O.

pub mod entity;
pub mod measurement;
pub mod schema;

pub use entity::{AttributeMetadata, ContextAttribute, ContextEntity};
pub use measurement::Measurement;
pub use schema::{AttributeDeclaration, ExpressionDialect, TypeInformation};
