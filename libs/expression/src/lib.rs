//! Expression engine for computed attributes and entity identifiers
//!
//! Parses and evaluates the small expression language device schemas use for
//! derived attributes and computed entity names:
//!
//! ```text
//! Expression String
//!      |
//!   Lexer -> Tokens
//!      |
//!   Parser -> AST
//!      |
//!   Evaluator (+ VariableContext) -> Value
//! ```
//!
//! Two dialects share the machinery: the legacy arithmetic/string grammar
//! (`@var` references, `#` concatenation) and the richer jexl-style syntax
//! (bare identifiers, member/index access, comparison and logical
//! operators). The dialect is an [`cuprum_models::ExpressionDialect`] tag
//! selected per device type; callers hold an [`Engine`] and never branch on
//! the dialect themselves.
//!
//! Evaluation is pure: no I/O, no shared state, no dependency on prior
//! calls. Errors are values ([`Error::InvalidExpression`],
//! [`Error::WrongExpressionType`]); nothing here panics on malformed input.

pub mod ast;
pub mod context;
pub mod engine;
pub mod error;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod template;
pub mod token;
pub mod value;

pub use context::VariableContext;
pub use engine::{Engine, ExpectedType};
pub use error::{Error, Result};
pub use value::Value;
