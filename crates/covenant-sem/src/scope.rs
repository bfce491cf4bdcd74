//! The symbol table: an arena of scopes, each holding named records for
//! the declarations visible inside it.
//!
//! Grounded on the teacher's `ScopeTree`/`Rib` arena: scopes are nodes in a
//! flat [`IndexVec`], each pointing at its parent, rather than an owned
//! tree of boxed children. Resolution walks the parent chain outward.
//! Generalized here with duplicate-at-`define` detection, a richer
//! per-binding [`SymbolRecord`], qualified (dotted) lookup that steps
//! through declared struct/entity fields, and location-based scope lookup.

use covenant_util::{DefId, Idx, Span, Symbol};
use std::collections::HashMap;

use crate::types::ResolvedType;

covenant_util::define_idx!(ScopeId);

/// What kind of thing a [`SymbolRecord`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Type,
    Entity,
    Field,
    Behavior,
    InputField,
    Invariant,
    Policy,
    View,
    Scenario,
    /// A name bound by a quantifier or lambda parameter.
    Binding,
    /// A stdlib function preloaded into the root scope (`now`, `uuid`, ...).
    Builtin,
}

/// A named, typed, located declaration bound in some scope.
#[derive(Debug, Clone)]
pub struct SymbolRecord {
    pub name: Symbol,
    pub kind: SymbolKind,
    pub def_id: DefId,
    pub resolved_type: ResolvedType,
    pub location: Span,
}

/// A scope: a set of bindings plus a link to the enclosing scope.
#[derive(Debug)]
pub struct Scope {
    bindings: HashMap<Symbol, SymbolRecord>,
    parent: Option<ScopeId>,
    /// The span this scope covers, used by [`SymbolTable::scope_at`].
    span: Span,
}

/// Raised when [`SymbolTable::define`] would shadow a binding already
/// present in the *same* scope (not an outer one, which is ordinary
/// shadowing and always allowed).
#[derive(Debug, Clone)]
pub struct DuplicateInCurrentScope {
    pub previous: SymbolRecord,
}

/// An arena of scopes with a cursor at the scope currently being built.
pub struct SymbolTable {
    scopes: covenant_util::IndexVec<ScopeId, Scope>,
    current: ScopeId,
}

impl SymbolTable {
    /// A table with a single root (domain) scope, pre-populated with the
    /// stdlib built-ins and common enums every domain sees regardless of
    /// what it declares (§3, "the root scope is pre-populated with
    /// built-in primitives, stdlib functions, ... and a common `Status`
    /// enum").
    pub fn new() -> Self {
        let mut scopes = covenant_util::IndexVec::new();
        let root = scopes.push(Scope {
            bindings: HashMap::new(),
            parent: None,
            span: Span::DUMMY,
        });
        let mut table = Self { scopes, current: root };
        table.define_builtins();
        table
    }

    fn define_builtins(&mut self) {
        let function = |params: Vec<ResolvedType>, returns: ResolvedType| ResolvedType::Function {
            params,
            returns: Box::new(returns),
        };
        let builtins = [
            ("now", function(vec![], ResolvedType::Timestamp)),
            ("today", function(vec![], ResolvedType::Timestamp)),
            ("uuid", function(vec![], ResolvedType::Uuid)),
            ("hash", function(vec![ResolvedType::Unknown], ResolvedType::String)),
            ("random", function(vec![], ResolvedType::Decimal)),
            ("Status", ResolvedType::Enum(Symbol::intern("Status"), DefId::DUMMY)),
        ];
        for (name, resolved_type) in builtins {
            self.define(SymbolRecord {
                name: Symbol::intern(name),
                kind: SymbolKind::Builtin,
                def_id: DefId::DUMMY,
                resolved_type,
                location: Span::DUMMY,
            })
            .expect("built-ins are defined once into a fresh root scope");
        }
    }

    /// Open a child scope covering `span` and make it current.
    pub fn enter_scope(&mut self, span: Span) -> ScopeId {
        let id = self.scopes.push(Scope {
            bindings: HashMap::new(),
            parent: Some(self.current),
            span,
        });
        self.current = id;
        id
    }

    /// Return to the parent of the current scope. A no-op at the root.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    /// Bind `record` in the current scope.
    ///
    /// Fails if a binding with the same name already exists in the
    /// *current* scope (shadowing an outer scope's binding is fine).
    pub fn define(&mut self, record: SymbolRecord) -> Result<(), DuplicateInCurrentScope> {
        let scope = &mut self.scopes[self.current];
        if let Some(previous) = scope.bindings.get(&record.name) {
            return Err(DuplicateInCurrentScope {
                previous: previous.clone(),
            });
        }
        scope.bindings.insert(record.name, record);
        Ok(())
    }

    /// Resolve `name` by walking outward from the current scope.
    pub fn lookup(&self, name: Symbol) -> Option<&SymbolRecord> {
        self.lookup_from(self.current, name)
    }

    fn lookup_from(&self, scope: ScopeId, name: Symbol) -> Option<&SymbolRecord> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let scope = &self.scopes[id];
            if let Some(record) = scope.bindings.get(&name) {
                return Some(record);
            }
            cursor = scope.parent;
        }
        None
    }

    /// Resolve a dotted name by looking up its head in scope, then
    /// stepping through `field_lookup` for each remaining segment.
    ///
    /// `field_lookup(parent_type, field_name)` must return the resolved
    /// type of `field_name` on `parent_type`, or `None` if no such field
    /// exists (an entity/struct with no matching field, or a type that
    /// has no fields at all).
    pub fn lookup_qualified(
        &self,
        parts: &[Symbol],
        field_lookup: impl Fn(&ResolvedType, Symbol) -> Option<ResolvedType>,
    ) -> Option<ResolvedType> {
        let (head, tail) = parts.split_first()?;
        let mut current = self.lookup(*head)?.resolved_type.clone();
        for segment in tail {
            current = field_lookup(&current, *segment)?;
        }
        Some(current)
    }

    /// Every record bound anywhere in the table, across all scopes.
    ///
    /// Used for "did you mean" suggestions, which search the whole table
    /// rather than just the chain visible from one lookup site.
    pub fn all_records(&self) -> impl Iterator<Item = &SymbolRecord> {
        self.scopes.iter_enumerated().flat_map(|(_, scope)| scope.bindings.values())
    }

    /// The innermost scope whose span contains `location`, or the root
    /// scope if none does (e.g. `location` is `Span::DUMMY`).
    pub fn scope_at(&self, location: Span) -> ScopeId {
        let mut best = ScopeId::from_usize(0);
        let mut best_width = u32::MAX;
        for (id, scope) in self.scopes.iter_enumerated() {
            if scope.span == Span::DUMMY {
                continue;
            }
            let contains = location.line > scope.span.line
                || (location.line == scope.span.line && location.column >= scope.span.column);
            let contains = contains
                && (location.end_line < scope.span.end_line
                    || (location.end_line == scope.span.end_line && location.end_column <= scope.span.end_column));
            if contains {
                let width = scope.span.end_line.saturating_sub(scope.span.line);
                if width < best_width {
                    best = id;
                    best_width = width;
                }
            }
        }
        best
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, kind: SymbolKind, ty: ResolvedType) -> SymbolRecord {
        SymbolRecord {
            name: Symbol::intern(name),
            kind,
            def_id: DefId(0),
            resolved_type: ty,
            location: Span::DUMMY,
        }
    }

    // === Shadowing and duplicate detection ===

    #[test]
    fn test_define_then_lookup_in_same_scope() {
        let mut table = SymbolTable::new();
        table
            .define(record("Order", SymbolKind::Entity, ResolvedType::Entity(Symbol::intern("Order"), DefId(1))))
            .unwrap();
        assert!(table.lookup(Symbol::intern("Order")).is_some());
    }

    #[test]
    fn test_duplicate_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        table.define(record("Order", SymbolKind::Entity, ResolvedType::Error)).unwrap();
        let err = table.define(record("Order", SymbolKind::Entity, ResolvedType::Error));
        assert!(err.is_err());
    }

    #[test]
    fn test_shadowing_outer_scope_is_allowed() {
        let mut table = SymbolTable::new();
        table.define(record("total", SymbolKind::Field, ResolvedType::Decimal)).unwrap();
        table.enter_scope(Span::DUMMY);
        let result = table.define(record("total", SymbolKind::Binding, ResolvedType::Int));
        assert!(result.is_ok());
        assert_eq!(table.lookup(Symbol::intern("total")).unwrap().resolved_type, ResolvedType::Int);
    }

    #[test]
    fn test_exit_scope_restores_outer_binding() {
        let mut table = SymbolTable::new();
        table.define(record("total", SymbolKind::Field, ResolvedType::Decimal)).unwrap();
        table.enter_scope(Span::DUMMY);
        table.define(record("total", SymbolKind::Binding, ResolvedType::Int)).unwrap();
        table.exit_scope();
        assert_eq!(table.lookup(Symbol::intern("total")).unwrap().resolved_type, ResolvedType::Decimal);
    }

    #[test]
    fn test_lookup_unbound_name_returns_none() {
        let table = SymbolTable::new();
        assert!(table.lookup(Symbol::intern("nope")).is_none());
    }

    // === Built-ins ===

    #[test]
    fn test_root_scope_has_stdlib_functions() {
        let table = SymbolTable::new();
        for name in ["now", "today", "uuid", "hash", "random"] {
            let found = table.lookup(Symbol::intern(name)).unwrap_or_else(|| panic!("missing builtin `{name}`"));
            assert_eq!(found.kind, SymbolKind::Builtin);
            assert!(matches!(found.resolved_type, ResolvedType::Function { .. }));
        }
    }

    #[test]
    fn test_root_scope_has_common_status_enum() {
        let table = SymbolTable::new();
        let status = table.lookup(Symbol::intern("Status")).unwrap();
        assert!(matches!(status.resolved_type, ResolvedType::Enum(..)));
    }

    #[test]
    fn test_domain_declaration_may_shadow_a_builtin_name() {
        let mut table = SymbolTable::new();
        let result = table.define(record("now", SymbolKind::Entity, ResolvedType::Entity(Symbol::intern("now"), DefId(9))));
        assert!(result.is_err(), "built-ins live in the root scope, so redefining one there is a same-scope duplicate");
    }

    // === Qualified lookup ===

    #[test]
    fn test_lookup_qualified_steps_through_fields() {
        let mut table = SymbolTable::new();
        table
            .define(record("order", SymbolKind::Binding, ResolvedType::Entity(Symbol::intern("Order"), DefId(5))))
            .unwrap();
        let parts = vec![Symbol::intern("order"), Symbol::intern("total")];
        let resolved = table.lookup_qualified(&parts, |_parent, field| {
            if field.as_str() == "total" {
                Some(ResolvedType::Decimal)
            } else {
                None
            }
        });
        assert_eq!(resolved, Some(ResolvedType::Decimal));
    }

    #[test]
    fn test_lookup_qualified_fails_on_unknown_field() {
        let mut table = SymbolTable::new();
        table
            .define(record("order", SymbolKind::Binding, ResolvedType::Entity(Symbol::intern("Order"), DefId(5))))
            .unwrap();
        let parts = vec![Symbol::intern("order"), Symbol::intern("missing")];
        let resolved = table.lookup_qualified(&parts, |_, _| None);
        assert!(resolved.is_none());
    }
}
