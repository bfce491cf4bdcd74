//! Type node definitions.
//!
//! These mirror the type-node shape the external parser hands to the
//! semantic core: a primitive name, a reference to a declared type, a
//! constrained primitive, or a structural composite (enum/struct/union/
//! list/map/optional). [`TypeNode`] is resolved against the symbol table
//! into a `ResolvedType` by the type resolver; it carries no resolution
//! state of its own.

use covenant_util::{Span, Symbol};

use crate::ast::QualifiedName;

/// A type as written in source: either a name to resolve or a structural
/// composite built from other type nodes.
#[derive(Debug, Clone)]
pub enum TypeNode {
    /// One of the fixed primitive names (`String`, `Int`, `Decimal`,
    /// `Boolean`, `Timestamp`, `UUID`, `Duration`).
    Primitive(Symbol, Span),

    /// A reference to a declared type, entity, or enum by (possibly
    /// dotted) name.
    Reference(QualifiedName),

    /// A primitive narrowed by a list of constraints (e.g. `String` with
    /// a `minLength` constraint).
    Constrained {
        base: Box<TypeNode>,
        constraints: Vec<Constraint>,
        span: Span,
    },

    /// An inline enumeration of variant names.
    Enum { variants: Vec<Symbol>, span: Span },

    /// An inline structural record.
    Struct { fields: Vec<FieldDecl>, span: Span },

    /// A tagged union of named struct variants.
    Union { variants: Vec<UnionVariant>, span: Span },

    /// `List<element>`.
    List { element: Box<TypeNode>, span: Span },

    /// `Map<key, value>`.
    Map {
        key: Box<TypeNode>,
        value: Box<TypeNode>,
        span: Span,
    },

    /// `Optional<inner>`.
    Optional { inner: Box<TypeNode>, span: Span },
}

impl TypeNode {
    /// The source location of this type node.
    pub fn span(&self) -> Span {
        match self {
            TypeNode::Primitive(_, span) => *span,
            TypeNode::Reference(qn) => qn.span,
            TypeNode::Constrained { span, .. }
            | TypeNode::Enum { span, .. }
            | TypeNode::Struct { span, .. }
            | TypeNode::Union { span, .. }
            | TypeNode::List { span, .. }
            | TypeNode::Map { span, .. }
            | TypeNode::Optional { span, .. } => *span,
        }
    }
}

/// A single constraint attached to a [`TypeNode::Constrained`], e.g.
/// `minLength(1)` or `pattern("^[A-Z]+$")`.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: Symbol,
    pub arguments: Vec<crate::expr::Literal>,
    pub span: Span,
}

/// One variant of an inline union type: a name paired with the struct
/// shape it carries.
#[derive(Debug, Clone)]
pub struct UnionVariant {
    pub name: Symbol,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// A named, typed field, used by entities, value types, structs, union
/// variants, and behavior input lists.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: Symbol,
    pub ty: TypeNode,
    pub optional: bool,
    pub span: Span,
}
