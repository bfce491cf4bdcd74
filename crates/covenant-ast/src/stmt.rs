//! Statement node definitions used by scenario `given`/`when` blocks.
//!
//! These are the only statement forms the data model names: assignment,
//! a call (optionally binding its result to a name), and a bounded loop.
//! They exist solely to script scenario setup and action phases; there is
//! no general control flow (no arbitrary `if`/`while`, no function
//! definitions) because scenarios describe fixtures, not programs.

use covenant_util::Span;
use covenant_util::Symbol;

use crate::expr::Expr;

/// A statement inside a scenario's `given` or `when` block.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `target = value`.
    Assignment {
        target: Expr,
        value: Expr,
        span: Span,
    },

    /// A call, optionally invoking a target behavior, with its result
    /// optionally bound to a name for later reference by `then`.
    Call {
        target: Option<Symbol>,
        call: Expr,
        span: Span,
    },

    /// A bounded repetition: `repeat count [as variable] { body }`.
    Loop {
        count: Expr,
        variable: Option<Symbol>,
        body: Vec<Stmt>,
        span: Span,
    },
}

impl Stmt {
    /// The source location of this statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assignment { span, .. } => *span,
            Stmt::Call { span, .. } => *span,
            Stmt::Loop { span, .. } => *span,
        }
    }
}
