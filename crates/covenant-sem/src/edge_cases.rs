//! Edge case tests for the semantic core: boundary behaviors that cut
//! across the symbol table, type resolver, inferencer, and domain
//! checker rather than any one module's internals.

#[cfg(test)]
mod tests {
    use crate::analysis::check;
    use crate::infer::{FieldInfo, Inferencer};
    use crate::resolve::TypeResolver;
    use crate::scope::{SymbolKind, SymbolRecord, SymbolTable};
    use crate::types::ResolvedType;
    use covenant_ast::ast::QualifiedName;
    use covenant_ast::{Domain, Expr, Literal, QuantifierKind, TypeDecl, TypeNode};
    use covenant_util::diagnostic::DiagnosticCode;
    use covenant_util::{DefId, Handler, Span, Symbol};
    use rustc_hash::FxHashMap;

    // ==================== EMPTY DOMAIN ====================

    /// EDGE CASE: An empty domain checks successfully with no diagnostics.
    #[test]
    fn test_edge_empty_domain_checks_clean() {
        let domain = Domain::empty(Symbol::intern("Empty"), Symbol::intern("1.0.0"));
        let result = check(&domain);
        assert!(result.success);
        assert!(result.diagnostics.is_empty());
    }

    // ==================== SYMBOL TABLE ====================

    /// EDGE CASE: A table with only the root scope resolves nothing.
    #[test]
    fn test_edge_root_scope_resolves_nothing() {
        let table = SymbolTable::new();
        assert!(table.lookup(Symbol::intern("nonexistent")).is_none());
    }

    /// EDGE CASE: Entering and exiting three nested scopes returns a
    /// binding made inside them to invisible once popped.
    #[test]
    fn test_edge_binding_in_deeply_nested_scope_does_not_escape() {
        let mut table = SymbolTable::new();
        table.enter_scope(Span::DUMMY);
        table.enter_scope(Span::DUMMY);
        table.enter_scope(Span::DUMMY);
        table
            .define(SymbolRecord {
                name: Symbol::intern("x"),
                kind: SymbolKind::Binding,
                def_id: DefId(0),
                resolved_type: ResolvedType::Int,
                location: Span::DUMMY,
            })
            .unwrap();
        assert!(table.lookup(Symbol::intern("x")).is_some());
        table.exit_scope();
        table.exit_scope();
        table.exit_scope();
        assert!(table.lookup(Symbol::intern("x")).is_none());
    }

    // ==================== TYPE RESOLUTION ====================

    /// EDGE CASE: A self-referential type chain (`type A = B; type B = A`)
    /// is rejected rather than stack-overflowing.
    #[test]
    fn test_edge_circular_type_reference_does_not_overflow() {
        let type_a = TypeDecl {
            name: Symbol::intern("A"),
            body: TypeNode::Reference(QualifiedName::simple(Symbol::intern("B"), Span::DUMMY)),
            span: Span::DUMMY,
        };
        let type_b = TypeDecl {
            name: Symbol::intern("B"),
            body: TypeNode::Reference(QualifiedName::simple(Symbol::intern("A"), Span::DUMMY)),
            span: Span::DUMMY,
        };
        let mut domain = Domain::empty(Symbol::intern("Cyclic"), Symbol::intern("1.0.0"));
        domain.types.push(type_a);
        domain.types.push(type_b);
        let def_ids = FxHashMap::default();
        let handler = Handler::new();
        let resolver = TypeResolver::new(&domain, &def_ids, &handler);
        let _ = resolver.resolve_all();
        assert!(handler.has_errors());
        assert!(handler.diagnostics().iter().any(|d| d.code == DiagnosticCode::CircularReference));
    }

    /// EDGE CASE: A deeply nested `Optional<List<Optional<List<...>>>>`
    /// resolves without overflowing the recursive resolver.
    #[test]
    fn test_edge_deeply_nested_type_composition() {
        let domain = Domain::empty(Symbol::intern("D"), Symbol::intern("1.0.0"));
        let def_ids = FxHashMap::default();
        let handler = Handler::new();
        let mut resolver = TypeResolver::new(&domain, &def_ids, &handler);

        let mut node = TypeNode::Primitive(Symbol::intern("Int"), Span::DUMMY);
        for _ in 0..50 {
            node = TypeNode::List { element: Box::new(node), span: Span::DUMMY };
            node = TypeNode::Optional { inner: Box::new(node), span: Span::DUMMY };
        }
        let resolved = resolver.resolve(&node);
        assert!(matches!(resolved, ResolvedType::Optional(_)));
    }

    // ==================== QUANTIFIERS ====================

    /// EDGE CASE: `all` over an empty list literal still type checks as
    /// Boolean; the emptiness is an evaluator-time concern, not a
    /// checker-time one.
    #[test]
    fn test_edge_quantifier_over_empty_list_is_boolean() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let expr = Expr::Quantifier {
            kind: QuantifierKind::All,
            binding: Symbol::intern("x"),
            collection: Box::new(Expr::ListLiteral(vec![], Span::DUMMY)),
            predicate: Box::new(Expr::Literal(Literal::Bool(true), Span::DUMMY)),
            span: Span::DUMMY,
        };
        assert_eq!(inferencer.infer(&expr), ResolvedType::Boolean);
        assert!(!handler.has_errors());
    }

    /// EDGE CASE: `old` nested inside a member access chain, not wrapping
    /// a bare identifier, is still gated on postcondition context.
    #[test]
    fn test_edge_old_wrapping_member_access() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields: FxHashMap<Symbol, FxHashMap<Symbol, FieldInfo>> = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields).in_postcondition(ResolvedType::Boolean);
        let expr = Expr::Old(
            Box::new(Expr::Member {
                object: Box::new(Expr::Result(None, Span::DUMMY)),
                field: Symbol::intern("captured_amount"),
                span: Span::DUMMY,
            }),
            Span::DUMMY,
        );
        // `result` resolves (we are in a postcondition) but has no field
        // map entry since its type is plain Boolean here, so member
        // access itself reports, not the `old` wrapper.
        inferencer.infer(&expr);
        assert!(handler.has_errors());
    }

    // ==================== ASSIGNABILITY AT THE BOUNDARIES ====================

    /// EDGE CASE: `Error` is assignable both ways so a single undefined
    /// reference does not cascade into every expression that uses it.
    #[test]
    fn test_edge_error_type_does_not_cascade_mismatches() {
        assert!(ResolvedType::Error.is_assignable_to(&ResolvedType::Boolean));
        assert!(ResolvedType::Uuid.is_assignable_to(&ResolvedType::Error));
        assert!(ResolvedType::Error.is_assignable_to(&ResolvedType::Error));
    }

    /// EDGE CASE: an `Optional<Optional<T>>` is still structurally
    /// assignable, one layer at a time.
    #[test]
    fn test_edge_doubly_optional_assignability() {
        let inner = ResolvedType::Optional(Box::new(ResolvedType::Int));
        let outer_decimal = ResolvedType::Optional(Box::new(ResolvedType::Optional(Box::new(ResolvedType::Decimal))));
        assert!(inner.is_assignable_to(&outer_decimal));
    }
}
