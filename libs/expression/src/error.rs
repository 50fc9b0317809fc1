//! Error types for the expression engine

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Expression engine errors
///
/// Both variants are scoped to a single evaluation; nothing here is
/// process-fatal. The pipeline returns the first hard error to the service
/// layer untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Syntax error, unknown function, or an operation with no well-defined
    /// result (for example arithmetic on a missing variable).
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// The evaluated result does not match the attribute's declared type.
    #[error("wrong expression type: {0}")]
    WrongExpressionType(String),
}
