//! The AST root: a `Domain` and its qualified-name building block.
//!
//! This is the contract consumed from the external parser: every field
//! here names a list the domain checker walks in its eight phases. The
//! AST itself is produced elsewhere; this crate only defines its shape.

use covenant_util::{Span, Symbol};

use crate::items::{BehaviorDecl, EntityDecl, InvariantDecl, PolicyDecl, ScenarioDecl, TypeDecl, ViewDecl};

/// The top-level module of the specification language: a named,
/// versioned collection of declarations.
#[derive(Debug, Clone)]
pub struct Domain {
    pub name: Symbol,
    pub version: Symbol,
    pub types: Vec<TypeDecl>,
    pub entities: Vec<EntityDecl>,
    pub behaviors: Vec<BehaviorDecl>,
    pub invariants: Vec<InvariantDecl>,
    pub policies: Vec<PolicyDecl>,
    pub views: Vec<ViewDecl>,
    pub scenarios: Vec<ScenarioDecl>,
    pub span: Span,
}

impl Domain {
    /// An empty domain with the given name, at `Span::DUMMY`. Useful for
    /// tests and as a starting point when building one up incrementally.
    pub fn empty(name: Symbol, version: Symbol) -> Self {
        Self {
            name,
            version,
            types: Vec::new(),
            entities: Vec::new(),
            behaviors: Vec::new(),
            invariants: Vec::new(),
            policies: Vec::new(),
            views: Vec::new(),
            scenarios: Vec::new(),
            span: Span::DUMMY,
        }
    }
}

/// A dotted name (`a.b.c`), used for type references and field chains
/// that must be resolved step-by-step through declared structure.
#[derive(Debug, Clone)]
pub struct QualifiedName {
    pub parts: Vec<Symbol>,
    pub span: Span,
}

impl QualifiedName {
    /// A single-segment qualified name, e.g. a bare type reference.
    pub fn simple(name: Symbol, span: Span) -> Self {
        Self {
            parts: vec![name],
            span,
        }
    }

    /// The first segment, which `lookup_qualified` resolves via the
    /// symbol table before stepping into the remaining segments.
    pub fn head(&self) -> Symbol {
        self.parts[0]
    }

    /// The segments after the head, stepped through field-by-field.
    pub fn tail(&self) -> &[Symbol] {
        &self.parts[1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Domain construction ===

    #[test]
    fn test_empty_domain_has_no_declarations() {
        let domain = Domain::empty(Symbol::intern("Payments"), Symbol::intern("1.0.0"));
        assert!(domain.types.is_empty());
        assert!(domain.entities.is_empty());
        assert!(domain.behaviors.is_empty());
        assert!(domain.scenarios.is_empty());
    }

    // === Qualified names ===

    #[test]
    fn test_qualified_name_simple_has_one_part() {
        let qn = QualifiedName::simple(Symbol::intern("Order"), Span::DUMMY);
        assert_eq!(qn.parts.len(), 1);
        assert_eq!(qn.head().as_str(), "Order");
        assert!(qn.tail().is_empty());
    }

    #[test]
    fn test_qualified_name_head_and_tail() {
        let qn = QualifiedName {
            parts: vec![
                Symbol::intern("order"),
                Symbol::intern("customer"),
                Symbol::intern("email"),
            ],
            span: Span::DUMMY,
        };
        assert_eq!(qn.head().as_str(), "order");
        let tail: Vec<_> = qn.tail().iter().map(|s| s.as_str()).collect();
        assert_eq!(tail, vec!["customer", "email"]);
    }
}
