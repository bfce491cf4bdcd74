//! The domain checker: the entry point that walks a whole [`Domain`] and
//! produces a [`TypeCheckResult`].
//!
//! Grounded on the teacher's `SemanticAnalyzer` in the original
//! `analysis.rs` (`collect_items` → `analyze_item` → per-kind `analyze_*`
//! dispatch), generalized from Rust items (fn/struct/enum/trait/impl) to
//! the domain's declaration kinds and from a single analysis pass to the
//! eight ordered phases: collect, resolve types, check entities, check
//! behaviors, global invariants, policies, views, scenarios.

use covenant_ast::{BehaviorDecl, Domain, EntityDecl, LifecycleDecl, PolicyDecl, ScenarioDecl, Stmt, ViewDecl};
use covenant_util::diagnostic::DiagnosticCode;
use covenant_util::{DefId, DefIdGenerator, Diagnostic, Handler, Span, Symbol};
use rustc_hash::FxHashMap;

use crate::infer::{FieldInfo, Inferencer};
use crate::resolve::TypeResolver;
use crate::scope::{SymbolKind, SymbolRecord, SymbolTable};
use crate::types::ResolvedType;

/// The result of checking a whole domain.
#[derive(Debug)]
pub struct TypeCheckResult {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub symbol_table: SymbolTable,
    /// The inferred type of every top-level checked expression, keyed by
    /// its span (the AST contract carries no separate expression-node id).
    pub expression_types: FxHashMap<Span, ResolvedType>,
}

/// Code-level knobs for [`check`], populated by the caller rather than
/// read from environment or file (module/CLI config loading is out of
/// scope here; a future CLI layer owns turning flags/TOML into this).
#[derive(Debug, Clone, Copy)]
pub struct CheckerConfig {
    /// Stop after the first phase that reports any error, skipping the
    /// remaining phases entirely. Off by default: the checker's whole
    /// point is surfacing every problem in one pass (§4.4).
    pub fail_fast: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self { fail_fast: false }
    }
}

/// Orchestrates the eight phases against one [`Domain`], accumulating
/// diagnostics in a [`Handler`] shared across phases so that a failure in
/// an early phase does not stop later phases from reporting their own.
pub struct DomainChecker<'a> {
    domain: &'a Domain,
    config: CheckerConfig,
    handler: Handler,
    def_ids: FxHashMap<Symbol, DefId>,
    symbols: SymbolTable,
    entity_fields: FxHashMap<Symbol, FxHashMap<Symbol, FieldInfo>>,
    behaviors: FxHashMap<Symbol, &'a BehaviorDecl>,
    expression_types: FxHashMap<Span, ResolvedType>,
}

impl<'a> DomainChecker<'a> {
    pub fn new(domain: &'a Domain) -> Self {
        Self::with_config(domain, CheckerConfig::default())
    }

    pub fn with_config(domain: &'a Domain, config: CheckerConfig) -> Self {
        Self {
            domain,
            config,
            handler: Handler::new(),
            def_ids: FxHashMap::default(),
            symbols: SymbolTable::new(),
            entity_fields: FxHashMap::default(),
            behaviors: FxHashMap::default(),
            expression_types: FxHashMap::default(),
        }
    }

    pub fn check(mut self) -> TypeCheckResult {
        macro_rules! phase {
            ($body:expr) => {
                $body;
                if self.config.fail_fast && self.handler.has_errors() {
                    return self.finish();
                }
            };
        }

        self.collect_declarations();
        if self.config.fail_fast && self.handler.has_errors() {
            return self.finish();
        }
        let mut resolver = TypeResolver::new(self.domain, &self.def_ids, &self.handler);
        phase!(self.resolve_types(&mut resolver));
        phase!(self.check_entities(&mut resolver));
        phase!(self.check_behaviors(&mut resolver));
        phase!(self.check_global_invariants());
        phase!(self.check_policies());
        phase!(self.check_views(&mut resolver));
        self.check_scenarios();

        self.finish()
    }

    fn finish(self) -> TypeCheckResult {
        let success = !self.handler.has_errors();
        TypeCheckResult {
            success,
            diagnostics: self.handler.diagnostics(),
            symbol_table: self.symbols,
            expression_types: self.expression_types,
        }
    }

    /// Phase 1: define a placeholder symbol for every top-level
    /// declaration, so later phases can cross-reference names declared
    /// anywhere in the domain regardless of declaration order.
    fn collect_declarations(&mut self) {
        let gen = DefIdGenerator::new();

        macro_rules! collect {
            ($items:expr, $kind:expr, $placeholder:expr) => {
                for item in $items {
                    let def_id = gen.next();
                    self.def_ids.insert(item.name, def_id);
                    let record = SymbolRecord {
                        name: item.name,
                        kind: $kind,
                        def_id,
                        resolved_type: $placeholder(item.name, def_id),
                        location: item.span,
                    };
                    if let Err(duplicate) = self.symbols.define(record) {
                        self.handler
                            .build_error(
                                item.span,
                                DiagnosticCode::DuplicateDeclaration,
                                format!("`{}` is already declared", item.name.as_str()),
                            )
                            .with_source("domain-checker")
                            .related("previously declared here", duplicate.previous.location)
                            .emit(&self.handler);
                    }
                }
            };
        }

        // A placeholder's shape follows §4.4 step 1: `Unknown` for a
        // type's body (it has no stable shape until the resolver runs),
        // but entities and behaviors get a real, identifiable placeholder
        // since other declarations may reference them by `DefId` before
        // their own fields are resolved.
        collect!(&self.domain.types, SymbolKind::Type, |_name, _def_id| ResolvedType::Unknown);
        collect!(&self.domain.entities, SymbolKind::Entity, ResolvedType::Entity);
        collect!(&self.domain.behaviors, SymbolKind::Behavior, ResolvedType::Behavior);
        collect!(&self.domain.policies, SymbolKind::Policy, |_name, _def_id| ResolvedType::Unknown);
        collect!(&self.domain.views, SymbolKind::View, |_name, _def_id| ResolvedType::Unknown);
        collect!(&self.domain.scenarios, SymbolKind::Scenario, |_name, _def_id| ResolvedType::Unknown);

        for behavior in &self.domain.behaviors {
            self.behaviors.insert(behavior.name, behavior);
        }
    }

    /// Phase 2: resolve every type declaration body, and fill in each
    /// entity's and behavior's field map.
    fn resolve_types(&mut self, resolver: &mut TypeResolver<'a>) {
        for entity in &self.domain.entities {
            let mut fields = FxHashMap::default();
            for field in &entity.fields {
                let mut ty = resolver.resolve(&field.ty);
                if field.optional && !matches!(ty, ResolvedType::Optional(_)) {
                    ty = ResolvedType::Optional(Box::new(ty));
                }
                if fields.insert(field.name, FieldInfo { ty, optional: field.optional }).is_some() {
                    self.handler
                        .build_error(
                            field.span,
                            DiagnosticCode::DuplicateField,
                            format!("field `{}` is already declared on `{}`", field.name.as_str(), entity.name.as_str()),
                        )
                        .with_source("domain-checker")
                        .emit(&self.handler);
                }
            }
            self.entity_fields.insert(entity.name, fields);
        }

        for behavior in &self.domain.behaviors {
            let mut seen = FxHashMap::default();
            for field in &behavior.input_fields {
                let ty = resolver.resolve(&field.ty);
                if seen.insert(field.name, ty).is_some() {
                    self.handler
                        .build_error(
                            field.span,
                            DiagnosticCode::DuplicateField,
                            format!("input `{}` is already declared on `{}`", field.name.as_str(), behavior.name.as_str()),
                        )
                        .with_source("domain-checker")
                        .emit(&self.handler);
                }
            }
        }
    }

    /// Phase 3: check every entity's invariants and lifecycle.
    fn check_entities(&mut self, resolver: &mut TypeResolver<'a>) {
        let _ = resolver;
        for entity in &self.domain.entities {
            self.symbols.enter_scope(entity.span);
            self.bind_entity_fields(entity);

            for invariant in &entity.invariants {
                let ty = self.infer_and_record(invariant.span(), invariant, false, None);
                if ty != ResolvedType::Boolean && !ty.is_absorbing() {
                    self.handler
                        .build_error(
                            invariant.span(),
                            DiagnosticCode::TypeMismatch,
                            format!("invariant on `{}` must be Boolean, found `{}`", entity.name.as_str(), ty),
                        )
                        .with_source("domain-checker")
                        .emit(&self.handler);
                }
            }

            if let Some(lifecycle) = &entity.lifecycle {
                self.check_lifecycle(entity, lifecycle);
            }

            self.symbols.exit_scope();
        }
    }

    fn bind_entity_fields(&mut self, entity: &EntityDecl) {
        if let Some(fields) = self.entity_fields.get(&entity.name) {
            for (name, info) in fields {
                let _ = self.symbols.define(SymbolRecord {
                    name: *name,
                    kind: SymbolKind::Field,
                    def_id: DefId::DUMMY,
                    resolved_type: info.ty.clone(),
                    location: entity.span,
                });
            }
        }
    }

    /// Every state reachable from the lifecycle's initial state by
    /// following declared transitions. A state declared but unreachable
    /// signals a typo or a missing transition into it.
    fn check_lifecycle(&mut self, entity: &EntityDecl, lifecycle: &LifecycleDecl) {
        let Some(initial) = lifecycle.initial_state() else {
            return;
        };
        let mut reachable = vec![initial];
        let mut frontier = vec![initial];
        while let Some(state) = frontier.pop() {
            for (from, to) in &lifecycle.transitions {
                if *from == state && !reachable.contains(to) {
                    reachable.push(*to);
                    frontier.push(*to);
                }
            }
        }
        for state in lifecycle.declared_states() {
            if !reachable.contains(&state) {
                let valid = reachable.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ");
                self.handler
                    .build_error(
                        lifecycle.span,
                        DiagnosticCode::InvalidLifecycleState,
                        format!(
                            "state `{}` on `{}` is never reached from the initial state `{}`",
                            state.as_str(),
                            entity.name.as_str(),
                            initial.as_str()
                        ),
                    )
                    .with_source("domain-checker")
                    .with_help(format!("reachable states: {}", valid))
                    .emit(&self.handler);
            }
        }
    }

    /// Phase 4: check every behavior's preconditions, postconditions, and
    /// behavior-level invariants.
    fn check_behaviors(&mut self, resolver: &mut TypeResolver<'a>) {
        for behavior in &self.domain.behaviors {
            self.symbols.enter_scope(behavior.span);
            for field in &behavior.input_fields {
                let ty = resolver.resolve(&field.ty);
                let ty = if field.optional && !matches!(ty, ResolvedType::Optional(_)) {
                    ResolvedType::Optional(Box::new(ty))
                } else {
                    ty
                };
                let _ = self.symbols.define(SymbolRecord {
                    name: field.name,
                    kind: SymbolKind::InputField,
                    def_id: DefId::DUMMY,
                    resolved_type: ty,
                    location: field.span,
                });
            }

            for precondition in &behavior.preconditions {
                let ty = self.infer_and_record(precondition.span(), precondition, false, None);
                self.require_boolean(precondition.span(), &ty, "precondition");
            }

            let output_type = resolver.resolve(&behavior.output_type);
            for postcondition in &behavior.postconditions {
                let ty = self.infer_and_record(postcondition.span(), postcondition, true, Some(output_type.clone()));
                self.require_boolean(postcondition.span(), &ty, "postcondition");
            }

            for invariant in &behavior.invariants {
                let ty = self.infer_and_record(invariant.span(), invariant, true, Some(output_type.clone()));
                self.require_boolean(invariant.span(), &ty, "behavior invariant");
            }

            self.symbols.exit_scope();
        }
    }

    /// Phase 5: every domain-wide invariant must be Boolean.
    fn check_global_invariants(&mut self) {
        for invariant in &self.domain.invariants {
            let ty = self.infer_and_record(invariant.predicate.span(), &invariant.predicate, false, None);
            self.require_boolean(invariant.predicate.span(), &ty, "invariant");
        }
    }

    /// Phase 6: every policy's targets must exist, its condition (if any)
    /// must be Boolean, and its actions are inferred for diagnostics.
    fn check_policies(&mut self) {
        for policy in &self.domain.policies {
            self.check_policy(policy);
        }
    }

    fn check_policy(&mut self, policy: &PolicyDecl) {
        for target in &policy.applies_to {
            if !self.behaviors.contains_key(target) {
                self.handler
                    .build_error(
                        policy.span,
                        DiagnosticCode::UndefinedVariable,
                        format!("policy `{}` applies to undefined behavior `{}`", policy.name.as_str(), target.as_str()),
                    )
                    .with_source("domain-checker")
                    .emit(&self.handler);
            }
        }
        if let Some(condition) = &policy.condition {
            let ty = self.infer_and_record(condition.span(), condition, false, None);
            self.require_boolean(condition.span(), &ty, "policy condition");
        }
        for action in &policy.actions {
            self.infer_and_record(action.span(), action, false, None);
        }
    }

    /// Phase 7: resolve each view's entity, expose its fields, and infer
    /// each view field's expression.
    fn check_views(&mut self, resolver: &mut TypeResolver<'a>) {
        let _ = resolver;
        for view in &self.domain.views {
            self.check_view(view);
        }
    }

    fn check_view(&mut self, view: &ViewDecl) {
        let Some(entity) = self.domain.entities.iter().find(|e| e.name == view.entity) else {
            self.handler
                .build_error(
                    view.span,
                    DiagnosticCode::UndefinedType,
                    format!("view `{}` projects undefined entity `{}`", view.name.as_str(), view.entity.as_str()),
                )
                .with_source("domain-checker")
                .emit(&self.handler);
            return;
        };
        self.symbols.enter_scope(view.span);
        self.bind_entity_fields(entity);
        for (field_name, expr) in &view.fields {
            let _ = field_name;
            self.infer_and_record(expr.span(), expr, false, None);
        }
        self.symbols.exit_scope();
    }

    /// Phase 8: confirm every scenario's behavior exists, script its
    /// `given`/`when` statements, and infer its `then` assertions.
    fn check_scenarios(&mut self) {
        for scenario in &self.domain.scenarios {
            self.check_scenario(scenario);
        }
    }

    fn check_scenario(&mut self, scenario: &ScenarioDecl) {
        if !self.behaviors.contains_key(&scenario.behavior) {
            self.handler
                .build_error(
                    scenario.span,
                    DiagnosticCode::UndefinedVariable,
                    format!("scenario `{}` references undefined behavior `{}`", scenario.name.as_str(), scenario.behavior.as_str()),
                )
                .with_source("domain-checker")
                .emit(&self.handler);
            return;
        }

        self.symbols.enter_scope(scenario.span);
        for stmt in &scenario.given {
            self.check_stmt(stmt);
        }
        for stmt in &scenario.when {
            self.check_stmt(stmt);
        }
        for assertion in &scenario.then {
            let ty = self.infer_and_record(assertion.span(), assertion, false, None);
            self.require_boolean(assertion.span(), &ty, "scenario assertion");
        }
        self.symbols.exit_scope();
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assignment { target, value, span } => {
                let value_ty = self.infer_and_record(value.span(), value, false, None);
                if let covenant_ast::Expr::Identifier(name, _) = target {
                    let _ = self.symbols.define(SymbolRecord {
                        name: *name,
                        kind: SymbolKind::Binding,
                        def_id: DefId::DUMMY,
                        resolved_type: value_ty,
                        location: *span,
                    });
                } else {
                    self.infer_and_record(target.span(), target, false, None);
                }
            }
            Stmt::Call { target, call, span } => {
                let result_ty = self.infer_and_record(call.span(), call, false, None);
                if let Some(name) = target {
                    let _ = self.symbols.define(SymbolRecord {
                        name: *name,
                        kind: SymbolKind::Binding,
                        def_id: DefId::DUMMY,
                        resolved_type: result_ty,
                        location: *span,
                    });
                }
            }
            Stmt::Loop { count, variable, body, .. } => {
                let count_ty = self.infer_and_record(count.span(), count, false, None);
                if count_ty != ResolvedType::Int && !count_ty.is_absorbing() {
                    self.handler
                        .build_error(count.span(), DiagnosticCode::TypeMismatch, "loop count must be Int")
                        .with_source("domain-checker")
                        .emit(&self.handler);
                }
                if let Some(variable) = variable {
                    let _ = self.symbols.define(SymbolRecord {
                        name: *variable,
                        kind: SymbolKind::Binding,
                        def_id: DefId::DUMMY,
                        resolved_type: ResolvedType::Int,
                        location: count.span(),
                    });
                }
                for inner in body {
                    self.check_stmt(inner);
                }
            }
        }
    }

    fn infer_and_record(
        &mut self,
        span: Span,
        expr: &covenant_ast::Expr,
        in_postcondition: bool,
        result_type: Option<ResolvedType>,
    ) -> ResolvedType {
        let mut inferencer = Inferencer::new(&self.symbols, &self.handler, &self.entity_fields);
        if in_postcondition {
            inferencer = inferencer.in_postcondition(result_type.unwrap_or(ResolvedType::Unknown));
        }
        let ty = inferencer.infer(expr);
        self.expression_types.insert(span, ty.clone());
        ty
    }

    fn require_boolean(&self, span: Span, ty: &ResolvedType, what: &str) {
        if *ty != ResolvedType::Boolean && !ty.is_absorbing() {
            self.handler
                .build_error(span, DiagnosticCode::TypeMismatch, format!("{} must be Boolean, found `{}`", what, ty))
                .with_source("domain-checker")
                .emit(&self.handler);
        }
    }
}

/// Check a whole domain and return its full diagnostic result.
pub fn check(domain: &Domain) -> TypeCheckResult {
    DomainChecker::new(domain).check()
}

/// Like [`check`], with caller-supplied [`CheckerConfig`] knobs.
pub fn check_with_config(domain: &Domain, config: CheckerConfig) -> TypeCheckResult {
    DomainChecker::with_config(domain, config).check()
}
