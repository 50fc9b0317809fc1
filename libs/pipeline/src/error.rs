//! Pipeline error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures that abort a pipeline invocation.
///
/// The first hard error short-circuits the transform chain and is returned
/// to the service layer untouched. Recoverable degradations (a coercion
/// parse failure, a computed attribute missing its inputs) never surface
/// here; they fall back and log instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A computed attribute's expression failed to parse or evaluate.
    #[error("invalid expression for attribute '{name}' of type {attribute_type}: {source}")]
    AttributeExpression {
        name: String,
        attribute_type: String,
        #[source]
        source: cuprum_expression::Error,
    },

    /// An expression failure outside any attribute declaration, such as a
    /// computed entity identifier.
    #[error(transparent)]
    Expression(#[from] cuprum_expression::Error),

    /// A transform-reported failure.
    #[error("transform '{transform}' failed: {message}")]
    Transform { transform: String, message: String },
}

impl Error {
    pub fn transform(transform: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Transform {
            transform: transform.into(),
            message: message.into(),
        }
    }
}
