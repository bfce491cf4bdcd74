//! Expression node definitions.
//!
//! Every expression form named by the consumed AST contract: identifiers,
//! literals, binary/unary operators, calls, member and index access,
//! quantifiers, conditionals, the `old`/`result`/`input` pseudo-forms,
//! lambdas, and list/map literals. [`Expr`] carries no type information;
//! the expression inferencer builds a side map from expression identity
//! to `ResolvedType`.

use covenant_util::{Span, Symbol};

use crate::ast::QualifiedName;
use crate::types::TypeNode;

/// An expression, as delivered by the external parser.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A bare identifier, resolved against locals then the symbol table.
    Identifier(Symbol, Span),

    /// A literal value.
    Literal(Literal, Span),

    /// A dotted name (`a.b.c`), resolved via qualified lookup or by
    /// stepping field-by-field through a resolved type.
    QualifiedName(QualifiedName),

    /// A binary operator application.
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },

    /// A unary operator application (`not e`, `-e`).
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        span: Span,
    },

    /// A free or method call. `receiver` is `None` for a free call to a
    /// built-in or lambda value.
    Call {
        receiver: Option<Box<Expr>>,
        callee: Symbol,
        args: Vec<Expr>,
        span: Span,
    },

    /// Field access (`a.f`) or enum variant access.
    Member {
        object: Box<Expr>,
        field: Symbol,
        span: Span,
    },

    /// Index access (`a[i]`).
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },

    /// A quantifier over a collection: `all x in c: p`, `sum x in c: e`,
    /// and so on.
    Quantifier {
        kind: QuantifierKind,
        binding: Symbol,
        collection: Box<Expr>,
        predicate: Box<Expr>,
        span: Span,
    },

    /// `c ? t : e`.
    Conditional {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        span: Span,
    },

    /// `old(e)`, valid only inside a postcondition.
    Old(Box<Expr>, Span),

    /// `result` or `result.f`, valid only inside a postcondition.
    Result(Option<Symbol>, Span),

    /// `input.f`, a field of the current behavior's input bindings.
    Input(Symbol, Span),

    /// An inline lambda, used by `filter`/`map`-style method calls.
    Lambda {
        params: Vec<Symbol>,
        body: Box<Expr>,
        span: Span,
    },

    /// `[e1, e2, ...]`.
    ListLiteral(Vec<Expr>, Span),

    /// `{k1: v1, k2: v2, ...}`.
    MapLiteral(Vec<(Expr, Expr)>, Span),
}

impl Expr {
    /// The source location of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier(_, span) => *span,
            Expr::Literal(_, span) => *span,
            Expr::QualifiedName(qn) => qn.span,
            Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Call { span, .. }
            | Expr::Member { span, .. }
            | Expr::Index { span, .. }
            | Expr::Quantifier { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Lambda { span, .. } => *span,
            Expr::Old(_, span) => *span,
            Expr::Result(_, span) => *span,
            Expr::Input(_, span) => *span,
            Expr::ListLiteral(_, span) => *span,
            Expr::MapLiteral(_, span) => *span,
        }
    }
}

/// A literal value as written in source.
#[derive(Debug, Clone)]
pub enum Literal {
    Int(i64),
    Decimal(rust_decimal::Decimal),
    Str(Symbol),
    Bool(bool),
    /// A duration literal, e.g. `30 minutes`, carrying its raw numeric
    /// value and unit name (`seconds`, `minutes`, `hours`, `days`).
    Duration(rust_decimal::Decimal, Symbol),
    /// `null`, inferred as `Optional<Unknown>`.
    Null,
}

/// Binary operators, matching the inference rule table: arithmetic,
/// comparison, logical (including `implies`/`iff` as distinct operators,
/// never desugared), and membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Implies,
    Iff,
    In,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// The kind of quantifier binding a collection expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    All,
    Any,
    None,
    Count,
    Sum,
    Filter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_util::Span;

    // === Span propagation ===

    #[test]
    fn test_binary_expr_span() {
        let left = Expr::Identifier(Symbol::intern("n"), Span::point(1, 1));
        let right = Expr::Literal(Literal::Int(1), Span::point(1, 5));
        let expr = Expr::Binary {
            op: BinOp::Add,
            left: Box::new(left),
            right: Box::new(right),
            span: Span::new(0, 1, 1, 1, 1, 6),
        };
        assert_eq!(expr.span().line, 1);
    }

    #[test]
    fn test_old_and_result_span() {
        let old = Expr::Old(Box::new(Expr::Identifier(Symbol::intern("n"), Span::DUMMY)), Span::point(2, 1));
        assert_eq!(old.span(), Span::point(2, 1));

        let result = Expr::Result(Some(Symbol::intern("refunded_amount")), Span::point(3, 1));
        assert_eq!(result.span(), Span::point(3, 1));
    }

    // === Operator set ===

    #[test]
    fn test_implies_and_iff_are_distinct_operators() {
        assert_ne!(BinOp::Implies, BinOp::Iff);
        assert_ne!(BinOp::Implies, BinOp::Or);
    }

    #[test]
    fn test_quantifier_kinds_are_distinct() {
        let kinds = [
            QuantifierKind::All,
            QuantifierKind::Any,
            QuantifierKind::None,
            QuantifierKind::Count,
            QuantifierKind::Sum,
            QuantifierKind::Filter,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for (j, b) in kinds.iter().enumerate() {
                assert_eq!(a == b, i == j);
            }
        }
    }

    // === Literal construction ===

    #[test]
    fn test_duration_literal() {
        let lit = Literal::Duration(rust_decimal::Decimal::new(30, 0), Symbol::intern("minutes"));
        match lit {
            Literal::Duration(value, unit) => {
                assert_eq!(value, rust_decimal::Decimal::new(30, 0));
                assert_eq!(unit.as_str(), "minutes");
            }
            _ => panic!("expected Duration literal"),
        }
    }
}
