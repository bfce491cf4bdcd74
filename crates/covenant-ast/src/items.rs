//! Top-level declaration nodes: types, entities, behaviors, invariants,
//! policies, views, and scenarios.

use covenant_util::{Span, Symbol};

use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::types::{FieldDecl, TypeNode};

/// A `type` declaration: a name bound to a type body.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: Symbol,
    pub body: TypeNode,
    pub span: Span,
}

/// An `entity` declaration: a named record with fields, invariants that
/// must hold whenever the entity exists, and an optional lifecycle.
#[derive(Debug, Clone)]
pub struct EntityDecl {
    pub name: Symbol,
    pub fields: Vec<FieldDecl>,
    pub invariants: Vec<Expr>,
    pub lifecycle: Option<LifecycleDecl>,
    pub span: Span,
}

/// An entity's state machine: the transition set between named states.
/// The initial state is the first state appearing in `transitions`;
/// terminal states are those with no outgoing transition.
#[derive(Debug, Clone)]
pub struct LifecycleDecl {
    pub transitions: Vec<(Symbol, Symbol)>,
    pub span: Span,
}

impl LifecycleDecl {
    /// All state names mentioned by this lifecycle, in first-appearance
    /// order.
    pub fn declared_states(&self) -> Vec<Symbol> {
        let mut seen = Vec::new();
        for (from, to) in &self.transitions {
            if !seen.contains(from) {
                seen.push(*from);
            }
            if !seen.contains(to) {
                seen.push(*to);
            }
        }
        seen
    }

    /// The initial state: the first state appearing in the declared
    /// transitions.
    pub fn initial_state(&self) -> Option<Symbol> {
        self.transitions.first().map(|(from, _)| *from)
    }

    /// States with no outgoing transition.
    pub fn terminal_states(&self) -> Vec<Symbol> {
        self.declared_states()
            .into_iter()
            .filter(|state| !self.transitions.iter().any(|(from, _)| from == state))
            .collect()
    }
}

/// A `behavior` declaration: a named operation with input fields, an
/// output type, declared error kinds, and pre/postconditions.
#[derive(Debug, Clone)]
pub struct BehaviorDecl {
    pub name: Symbol,
    pub input_fields: Vec<FieldDecl>,
    pub output_type: TypeNode,
    pub error_types: Vec<Symbol>,
    pub preconditions: Vec<Expr>,
    pub postconditions: Vec<Expr>,
    pub invariants: Vec<Expr>,
    pub span: Span,
}

/// A standalone, domain-wide `invariant` declaration.
#[derive(Debug, Clone)]
pub struct InvariantDecl {
    pub name: Option<Symbol>,
    pub predicate: Expr,
    pub span: Span,
}

/// A `policy` declaration: a condition and a set of action expressions
/// applied to the behaviors it names.
#[derive(Debug, Clone)]
pub struct PolicyDecl {
    pub name: Symbol,
    pub applies_to: Vec<Symbol>,
    pub condition: Option<Expr>,
    pub actions: Vec<Expr>,
    pub span: Span,
}

/// A `view` declaration: a read-only projection of an entity's fields.
#[derive(Debug, Clone)]
pub struct ViewDecl {
    pub name: Symbol,
    pub entity: Symbol,
    pub fields: Vec<(Symbol, Expr)>,
    pub span: Span,
}

/// A `scenario` declaration: `given`/`when`/`then` blocks describing a
/// test of a named behavior.
#[derive(Debug, Clone)]
pub struct ScenarioDecl {
    pub name: Symbol,
    pub behavior: Symbol,
    pub given: Vec<Stmt>,
    pub when: Vec<Stmt>,
    pub then: Vec<Expr>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Lifecycle derivation ===

    #[test]
    fn test_lifecycle_initial_state_is_first_transition_source() {
        let lifecycle = LifecycleDecl {
            transitions: vec![
                (Symbol::intern("Pending"), Symbol::intern("Active")),
                (Symbol::intern("Active"), Symbol::intern("Closed")),
            ],
            span: Span::DUMMY,
        };
        assert_eq!(lifecycle.initial_state().unwrap().as_str(), "Pending");
    }

    #[test]
    fn test_lifecycle_terminal_states_have_no_outgoing_transition() {
        let lifecycle = LifecycleDecl {
            transitions: vec![
                (Symbol::intern("A"), Symbol::intern("B")),
                (Symbol::intern("B"), Symbol::intern("C")),
            ],
            span: Span::DUMMY,
        };
        let terminals = lifecycle.terminal_states();
        assert_eq!(terminals.len(), 1);
        assert_eq!(terminals[0].as_str(), "C");
    }

    #[test]
    fn test_lifecycle_declared_states_preserves_first_appearance_order() {
        let lifecycle = LifecycleDecl {
            transitions: vec![
                (Symbol::intern("A"), Symbol::intern("B")),
                (Symbol::intern("B"), Symbol::intern("A")),
            ],
            span: Span::DUMMY,
        };
        let states: Vec<_> = lifecycle.declared_states().iter().map(|s| s.as_str()).collect();
        assert_eq!(states, vec!["A", "B"]);
    }

    #[test]
    fn test_entity_decl_without_lifecycle() {
        let entity = EntityDecl {
            name: Symbol::intern("Order"),
            fields: vec![],
            invariants: vec![],
            lifecycle: None,
            span: Span::DUMMY,
        };
        assert!(entity.lifecycle.is_none());
    }
}
