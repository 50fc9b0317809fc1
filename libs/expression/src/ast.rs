//! Abstract syntax tree for expressions
//!
//! One AST serves both dialects; the parser only builds the node kinds its
//! dialect has. ASTs are immutable once built and evaluation is a pure
//! function of AST and variable context.

use crate::functions::Function;

/// AST node for an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal (a number without a fractional part)
    Integer(i64),
    /// Decimal literal
    Float(f64),
    /// String literal
    Str(String),
    /// Boolean literal (jexl)
    Bool(bool),
    /// Null literal (jexl)
    Null,
    /// Named constant (`e`, `pi`)
    Constant(NamedConstant),
    /// Variable reference, resolved by name against the variable context
    Variable(String),
    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function call
    Call { function: Function, args: Vec<Expr> },
    /// Member access: `target.name` (jexl)
    Member { target: Box<Expr>, name: String },
    /// Index access: `target[index]` (jexl)
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus, // -
    Not,   // ! (jexl)
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,    // +
    Sub,    // -
    Mul,    // *
    Div,    // /
    Mod,    // % (jexl)
    Pow,    // ^
    Concat, // # (legacy)
    Eq,     // == (jexl)
    Ne,     // != (jexl)
    Lt,     // <  (jexl)
    Le,     // <= (jexl)
    Gt,     // >  (jexl)
    Ge,     // >= (jexl)
    And,    // && (jexl)
    Or,     // || (jexl)
}

/// Named constants of the legacy dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedConstant {
    E,
    Pi,
}

impl Expr {
    /// Collect the names of all variables referenced by this expression, in
    /// first-occurrence order.
    ///
    /// Used to decide whether the variable context is sufficient before
    /// computing a derived attribute.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Expr::Variable(name) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
            Expr::Unary { operand, .. } => operand.collect_variables(names),
            Expr::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(names);
                }
            }
            Expr::Member { target, .. } => target.collect_variables(names),
            Expr::Index { target, index } => {
                target.collect_variables(names);
                index.collect_variables(names);
            }
            Expr::Integer(_)
            | Expr::Float(_)
            | Expr::Str(_)
            | Expr::Bool(_)
            | Expr::Null
            | Expr::Constant(_) => {}
        }
    }
}
