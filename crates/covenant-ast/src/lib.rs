//! AST node definitions for the specification language's semantic core.
//!
//! Source text parsing, tokenization, and grammar concerns live outside
//! this crate: an external parser delivers a [`Domain`] and this crate
//! only defines the shape that parser produces. Every node named by the
//! consumed AST contract lives here: the domain root, type nodes,
//! expression nodes, the small statement set used by scenario `given`/
//! `when` blocks, and the per-kind declaration nodes (types, entities,
//! behaviors, invariants, policies, views, scenarios).
//!
//! Downstream crates borrow a `Domain` for the duration of one `check`
//! or `verify` call; this crate owns no resolution state of its own.

pub mod ast;
pub mod edge_cases;
pub mod expr;
pub mod items;
pub mod stmt;
pub mod types;

pub use ast::{Domain, QualifiedName};
pub use expr::{BinOp, Expr, Literal, QuantifierKind, UnOp};
pub use items::{
    BehaviorDecl, EntityDecl, InvariantDecl, LifecycleDecl, PolicyDecl, ScenarioDecl, TypeDecl, ViewDecl,
};
pub use stmt::Stmt;
pub use types::{Constraint, FieldDecl, TypeNode, UnionVariant};
