//! The expression inferencer: computes a [`ResolvedType`] for every
//! expression node bottom-up, and reports the type-level diagnostics
//! (undefined variable, type mismatch, `old`/`result` used outside a
//! postcondition) along the way.
//!
//! Grounded on the teacher's `analyze_binary`/`analyze_call`/`analyze_path`
//! family in `analysis.rs`: one method per expression shape, looking
//! operand types up first and then deciding the result type and any
//! diagnostics from them. Generalized from Hindley-Milner unification
//! (this language has no inference variables; every binding has a
//! declared type) to direct bottom-up computation, and extended with the
//! quantifier, `old`/`result`/`input`, and qualified-name cases the
//! teacher's Rust expression grammar has no equivalent of.

use covenant_ast::{BinOp, Expr, Literal, QuantifierKind, UnOp};
use covenant_util::diagnostic::DiagnosticCode;
use covenant_util::{Handler, Span, Symbol};
use rustc_hash::FxHashMap;

use crate::scope::{SymbolKind, SymbolRecord, SymbolTable};
use crate::types::ResolvedType;

/// A field on a struct-shaped type (entity, struct, or union variant),
/// used to resolve member access and qualified names.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub ty: ResolvedType,
    pub optional: bool,
}

/// Computes types for expressions against a symbol table and a field
/// directory, in one of two modes: ordinary (preconditions, invariants,
/// view projections) or postcondition (`old`/`result` become legal).
pub struct Inferencer<'a> {
    pub symbols: &'a SymbolTable,
    pub handler: &'a Handler,
    pub fields: &'a FxHashMap<Symbol, FxHashMap<Symbol, FieldInfo>>,
    pub in_postcondition: bool,
    pub result_type: Option<ResolvedType>,
    /// Bindings introduced by a quantifier or lambda parameter, innermost
    /// last. Consulted before the symbol table, since these names are not
    /// (and must not be) recorded there: the table is shared read-only
    /// state across sibling expressions, while a binding is scoped to a
    /// single predicate/body.
    locals: Vec<FxHashMap<Symbol, ResolvedType>>,
}

impl<'a> Inferencer<'a> {
    pub fn new(symbols: &'a SymbolTable, handler: &'a Handler, fields: &'a FxHashMap<Symbol, FxHashMap<Symbol, FieldInfo>>) -> Self {
        Self {
            symbols,
            handler,
            fields,
            in_postcondition: false,
            result_type: None,
            locals: Vec::new(),
        }
    }

    pub fn in_postcondition(mut self, result_type: ResolvedType) -> Self {
        self.in_postcondition = true;
        self.result_type = Some(result_type);
        self
    }

    fn push_local(&mut self, bindings: FxHashMap<Symbol, ResolvedType>) {
        self.locals.push(bindings);
    }

    fn pop_local(&mut self) {
        self.locals.pop();
    }

    fn lookup_local(&self, name: Symbol) -> Option<ResolvedType> {
        self.locals.iter().rev().find_map(|scope| scope.get(&name).cloned())
    }

    /// Compute the type of `expr`, emitting diagnostics for anything that
    /// does not type check. Always returns a type: on failure this is
    /// [`ResolvedType::Error`], so callers can keep walking without
    /// cascading the same problem into every enclosing expression.
    pub fn infer(&mut self, expr: &Expr) -> ResolvedType {
        match expr {
            Expr::Identifier(name, span) => self.infer_identifier(*name, *span),
            Expr::Literal(lit, _) => self.infer_literal(lit),
            Expr::QualifiedName(qname) => self.infer_qualified(&qname.parts, qname.span),
            Expr::Binary { op, left, right, span } => self.infer_binary(*op, left, right, *span),
            Expr::Unary { op, operand, span } => self.infer_unary(*op, operand, *span),
            Expr::Call { receiver, callee, args, span } => self.infer_call(receiver.as_deref(), *callee, args, *span),
            Expr::Member { object, field, span } => {
                let object_ty = self.infer(object);
                self.member_type(&object_ty, *field, *span)
            }
            Expr::Index { object, index, span } => self.infer_index(object, index, *span),
            Expr::Quantifier { kind, binding, collection, predicate, span } => {
                self.infer_quantifier(*kind, *binding, collection, predicate, *span)
            }
            Expr::Conditional { cond, then_branch, else_branch, span } => {
                self.infer_conditional(cond, then_branch, else_branch, *span)
            }
            Expr::Old(inner, span) => self.infer_old(inner, *span),
            Expr::Result(field, span) => self.infer_result(*field, *span),
            Expr::Input(name, span) => self.infer_identifier(*name, *span),
            Expr::Lambda { body, .. } => self.infer(body),
            Expr::ListLiteral(items, _) => self.infer_list_literal(items),
            Expr::MapLiteral(entries, _) => self.infer_map_literal(entries),
        }
    }

    fn infer_identifier(&mut self, name: Symbol, span: Span) -> ResolvedType {
        if let Some(ty) = self.lookup_local(name) {
            return ty;
        }
        match self.symbols.lookup(name) {
            Some(record) => record.resolved_type.clone(),
            None => {
                let mut builder = self
                    .handler
                    .build_error(span, DiagnosticCode::UndefinedVariable, format!("undefined name `{}`", name.as_str()))
                    .with_source("expression-inferencer");
                if let Some(suggestion) = self.suggest(name) {
                    builder = builder.with_help(format!("did you mean `{}`?", suggestion));
                }
                builder.emit(self.handler);
                ResolvedType::Error
            }
        }
    }

    /// Suggest the closest bound name within edit distance 2, the same
    /// bound a typo in a short identifier typically falls within.
    fn suggest(&self, name: Symbol) -> Option<String> {
        self.symbols
            .candidate_names()
            .map(|candidate| (candidate, levenshtein(name.as_str(), candidate)))
            .filter(|(_, distance)| *distance <= 2)
            .min_by_key(|(_, distance)| *distance)
            .map(|(candidate, _)| candidate.to_string())
    }

    fn infer_literal(&self, lit: &Literal) -> ResolvedType {
        match lit {
            Literal::Int(_) => ResolvedType::Int,
            Literal::Decimal(_) => ResolvedType::Decimal,
            Literal::Str(_) => ResolvedType::String,
            Literal::Bool(_) => ResolvedType::Boolean,
            Literal::Duration(_, _) => ResolvedType::Duration,
            Literal::Null => ResolvedType::Optional(Box::new(ResolvedType::Error)),
        }
    }

    fn infer_qualified(&mut self, parts: &[Symbol], span: Span) -> ResolvedType {
        let fields = self.fields;
        self.symbols
            .lookup_qualified(parts, |parent, field| {
                Self::field_lookup_static(fields, parent, field).map(|info| info.ty)
            })
            .unwrap_or_else(|| {
                self.handler
                    .build_error(
                        span,
                        DiagnosticCode::UndefinedVariable,
                        format!(
                            "undefined name `{}`",
                            parts.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(".")
                        ),
                    )
                    .with_source("expression-inferencer")
                    .emit(self.handler);
                ResolvedType::Error
            })
    }

    fn member_type(&mut self, object_ty: &ResolvedType, field: Symbol, span: Span) -> ResolvedType {
        let unwrapped = match object_ty {
            ResolvedType::Optional(inner) => inner.as_ref(),
            other => other,
        };
        match Self::field_lookup_static(self.fields, unwrapped, field) {
            Some(info) if info.optional => ResolvedType::Optional(Box::new(info.ty)),
            Some(info) => info.ty,
            None => {
                if object_ty.is_absorbing() {
                    return ResolvedType::Error;
                }
                self.handler
                    .build_error(
                        span,
                        DiagnosticCode::UndefinedVariable,
                        format!("`{}` has no field `{}`", object_ty, field.as_str()),
                    )
                    .with_source("expression-inferencer")
                    .emit(self.handler);
                ResolvedType::Error
            }
        }
    }

    fn field_lookup_static(
        fields: &FxHashMap<Symbol, FxHashMap<Symbol, FieldInfo>>,
        parent: &ResolvedType,
        field: Symbol,
    ) -> Option<FieldInfo> {
        let owner_name = match parent {
            ResolvedType::Entity(name, _) | ResolvedType::Struct(name, _) | ResolvedType::Union(name, _) => *name,
            _ => return None,
        };
        fields.get(&owner_name)?.get(&field).cloned()
    }

    fn infer_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, span: Span) -> ResolvedType {
        let left_ty = self.infer(left);
        let right_ty = self.infer(right);
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                match left_ty.widen_numeric(&right_ty) {
                    Some(widened) => widened,
                    None => {
                        if left_ty.is_absorbing() || right_ty.is_absorbing() {
                            return ResolvedType::Error;
                        }
                        self.mismatch(span, &left_ty, &right_ty, "arithmetic requires two numeric operands");
                        ResolvedType::Error
                    }
                }
            }
            BinOp::Eq | BinOp::Ne => {
                if !left_ty.is_comparable_for_equality(&right_ty) {
                    self.mismatch(span, &left_ty, &right_ty, "cannot compare these types for equality");
                }
                ResolvedType::Boolean
            }
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                if !(left_ty.is_numeric() && right_ty.is_numeric())
                    && !(left_ty == ResolvedType::Timestamp && right_ty == ResolvedType::Timestamp)
                {
                    self.mismatch(span, &left_ty, &right_ty, "ordering requires two numeric or timestamp operands");
                }
                ResolvedType::Boolean
            }
            BinOp::And | BinOp::Or | BinOp::Implies | BinOp::Iff => {
                if left_ty != ResolvedType::Boolean && !left_ty.is_absorbing() {
                    self.mismatch(span, &left_ty, &ResolvedType::Boolean, "expected a boolean operand");
                }
                if right_ty != ResolvedType::Boolean && !right_ty.is_absorbing() {
                    self.mismatch(span, &right_ty, &ResolvedType::Boolean, "expected a boolean operand");
                }
                ResolvedType::Boolean
            }
            BinOp::In => {
                if let Some(elem) = right_ty.list_element() {
                    if !left_ty.is_assignable_to(elem) && !left_ty.is_absorbing() {
                        self.mismatch(span, &left_ty, elem, "left side of `in` must match the list's element type");
                    }
                } else if !right_ty.is_absorbing() {
                    self.handler
                        .build_error(span, DiagnosticCode::TypeMismatch, format!("`{}` is not a list", right_ty))
                        .with_source("expression-inferencer")
                        .emit(self.handler);
                }
                ResolvedType::Boolean
            }
        }
    }

    fn infer_unary(&mut self, op: UnOp, operand: &Expr, span: Span) -> ResolvedType {
        let ty = self.infer(operand);
        match op {
            UnOp::Neg => {
                if !ty.is_numeric() && !ty.is_absorbing() {
                    self.mismatch(span, &ty, &ResolvedType::Decimal, "unary `-` requires a numeric operand");
                }
                ty
            }
            UnOp::Not => {
                if ty != ResolvedType::Boolean && !ty.is_absorbing() {
                    self.mismatch(span, &ty, &ResolvedType::Boolean, "`not` requires a boolean operand");
                }
                ResolvedType::Boolean
            }
        }
    }

    fn infer_call(&mut self, receiver: Option<&Expr>, callee: Symbol, args: &[Expr], span: Span) -> ResolvedType {
        match receiver {
            Some(receiver) => {
                let receiver_ty = self.infer(receiver);
                self.infer_method_call(&receiver_ty, callee, args, span)
            }
            None => self.infer_free_call(callee, args, span),
        }
    }

    /// A free call to a stdlib function: no receiver, so dispatch is on
    /// `callee` alone (§4.3's free built-ins).
    fn infer_free_call(&mut self, callee: Symbol, args: &[Expr], span: Span) -> ResolvedType {
        let arg_types: Vec<ResolvedType> = args.iter().map(|arg| self.infer(arg)).collect();
        match callee.as_str() {
            "now" | "today" => ResolvedType::Timestamp,
            "uuid" => ResolvedType::Uuid,
            "hash" => ResolvedType::String,
            "random" => ResolvedType::Decimal,
            "abs" | "floor" | "ceil" | "round" => arg_types.into_iter().next().unwrap_or(ResolvedType::Error),
            "min" | "max" => arg_types
                .into_iter()
                .reduce(|acc, ty| acc.widen_numeric(&ty).unwrap_or(acc))
                .unwrap_or(ResolvedType::Error),
            "len" | "length" => ResolvedType::Int,
            "toString" => ResolvedType::String,
            "parseInt" => ResolvedType::Int,
            "parseDecimal" => ResolvedType::Decimal,
            "isValid" | "isNull" | "isNotNull" => ResolvedType::Boolean,
            _ => {
                self.handler
                    .build_error(span, DiagnosticCode::UndefinedVariable, format!("undefined function `{}`", callee.as_str()))
                    .with_source("expression-inferencer")
                    .emit(self.handler);
                ResolvedType::Error
            }
        }
    }

    /// A method-style call with a receiver, dispatched by the receiver's
    /// type then by method name (§4.3's "method dispatch by receiver"
    /// table).
    fn infer_method_call(&mut self, receiver_ty: &ResolvedType, callee: Symbol, args: &[Expr], span: Span) -> ResolvedType {
        if receiver_ty.is_absorbing() {
            for arg in args {
                self.infer(arg);
            }
            return ResolvedType::Error;
        }
        match receiver_ty {
            ResolvedType::List(elem) => self.infer_list_method(elem, callee, args, span),
            ResolvedType::String => self.infer_string_method(callee, args, span),
            ResolvedType::Map(key, value) => self.infer_map_method(key, value, callee, span),
            ResolvedType::Optional(inner) => self.infer_optional_method(inner, callee, args, span),
            ResolvedType::Entity(..) => self.infer_entity_method(callee, args, span),
            _ => {
                for arg in args {
                    self.infer(arg);
                }
                self.handler
                    .build_error(
                        span,
                        DiagnosticCode::UndefinedVariable,
                        format!("`{}` has no method `{}`", receiver_ty, callee.as_str()),
                    )
                    .with_source("expression-inferencer")
                    .emit(self.handler);
                ResolvedType::Error
            }
        }
    }

    fn infer_list_method(&mut self, elem: &ResolvedType, callee: Symbol, args: &[Expr], span: Span) -> ResolvedType {
        match callee.as_str() {
            "length" | "count" | "size" => ResolvedType::Int,
            "isEmpty" | "isNotEmpty" => ResolvedType::Boolean,
            "contains" | "includes" => {
                for arg in args {
                    self.infer(arg);
                }
                ResolvedType::Boolean
            }
            "first" | "last" => ResolvedType::Optional(Box::new(elem.clone())),
            "filter" => {
                self.infer_lambda_args(args, std::slice::from_ref(elem));
                ResolvedType::List(Box::new(elem.clone()))
            }
            "map" => {
                let result_elem = self.infer_lambda_args(args, std::slice::from_ref(elem)).unwrap_or(ResolvedType::Error);
                ResolvedType::List(Box::new(result_elem))
            }
            "sum" | "avg" | "min" | "max" => elem.clone(),
            _ => {
                for arg in args {
                    self.infer(arg);
                }
                self.undefined_method(&ResolvedType::List(Box::new(elem.clone())), callee, span)
            }
        }
    }

    fn infer_string_method(&mut self, callee: Symbol, args: &[Expr], span: Span) -> ResolvedType {
        for arg in args {
            self.infer(arg);
        }
        match callee.as_str() {
            "length" => ResolvedType::Int,
            "isEmpty" | "isNotEmpty" | "startsWith" | "endsWith" | "contains" | "matches" => ResolvedType::Boolean,
            "toUpperCase" | "toLowerCase" | "trim" | "concat" => ResolvedType::String,
            "split" => ResolvedType::List(Box::new(ResolvedType::String)),
            _ => self.undefined_method(&ResolvedType::String, callee, span),
        }
    }

    fn infer_map_method(&mut self, key: &ResolvedType, value: &ResolvedType, callee: Symbol, span: Span) -> ResolvedType {
        match callee.as_str() {
            "get" => ResolvedType::Optional(Box::new(value.clone())),
            "has" | "containsKey" => ResolvedType::Boolean,
            "keys" => ResolvedType::List(Box::new(key.clone())),
            "values" => ResolvedType::List(Box::new(value.clone())),
            "size" => ResolvedType::Int,
            _ => self.undefined_method(&ResolvedType::Map(Box::new(key.clone()), Box::new(value.clone())), callee, span),
        }
    }

    fn infer_optional_method(&mut self, inner: &ResolvedType, callee: Symbol, args: &[Expr], span: Span) -> ResolvedType {
        match callee.as_str() {
            "isDefined" | "isEmpty" => ResolvedType::Boolean,
            "get" => inner.clone(),
            "getOrElse" => {
                for arg in args {
                    self.infer(arg);
                }
                inner.clone()
            }
            _ => {
                for arg in args {
                    self.infer(arg);
                }
                self.undefined_method(&ResolvedType::Optional(Box::new(inner.clone())), callee, span)
            }
        }
    }

    fn infer_entity_method(&mut self, callee: Symbol, args: &[Expr], span: Span) -> ResolvedType {
        for arg in args {
            self.infer(arg);
        }
        match callee.as_str() {
            "lookup" => ResolvedType::Optional(Box::new(ResolvedType::Unknown)),
            "exists" => ResolvedType::Boolean,
            _ => {
                self.handler
                    .build_error(span, DiagnosticCode::UndefinedVariable, format!("entity has no method `{}`", callee.as_str()))
                    .with_source("expression-inferencer")
                    .emit(self.handler);
                ResolvedType::Error
            }
        }
    }

    fn undefined_method(&self, receiver_ty: &ResolvedType, callee: Symbol, span: Span) -> ResolvedType {
        self.handler
            .build_error(
                span,
                DiagnosticCode::UndefinedVariable,
                format!("`{}` has no method `{}`", receiver_ty, callee.as_str()),
            )
            .with_source("expression-inferencer")
            .emit(self.handler);
        ResolvedType::Error
    }

    /// Infer a single lambda argument's body with its parameters bound to
    /// `param_types` (positionally; a lambda with a different parameter
    /// count than `param_types` binds the extras to `Unknown`, per §4.3's
    /// rule that a lambda's body is "inferred with parameters bound to
    /// `Unknown`" when no more specific type applies). Returns the body's
    /// type, or `None` if `args` holds anything other than one lambda.
    fn infer_lambda_args(&mut self, args: &[Expr], param_types: &[ResolvedType]) -> Option<ResolvedType> {
        let [Expr::Lambda { params, body, .. }] = args else {
            for arg in args {
                self.infer(arg);
            }
            return None;
        };
        let mut scope = FxHashMap::default();
        for (i, param) in params.iter().enumerate() {
            let ty = param_types.get(i).cloned().unwrap_or(ResolvedType::Unknown);
            scope.insert(*param, ty);
        }
        self.push_local(scope);
        let result = self.infer(body);
        self.pop_local();
        Some(result)
    }

    fn infer_index(&mut self, object: &Expr, index: &Expr, span: Span) -> ResolvedType {
        let object_ty = self.infer(object);
        let index_ty = self.infer(index);
        match &object_ty {
            ResolvedType::List(elem) => {
                if index_ty != ResolvedType::Int && !index_ty.is_absorbing() {
                    self.mismatch(span, &index_ty, &ResolvedType::Int, "list index must be an Int");
                }
                elem.as_ref().clone()
            }
            ResolvedType::Map(key, value) => {
                if !index_ty.is_assignable_to(key) && !index_ty.is_absorbing() {
                    self.mismatch(span, &index_ty, key, "map key type mismatch");
                }
                ResolvedType::Optional(Box::new(value.as_ref().clone()))
            }
            ResolvedType::Error | ResolvedType::Unknown => ResolvedType::Error,
            _ => {
                self.handler
                    .build_error(span, DiagnosticCode::TypeMismatch, format!("`{}` cannot be indexed", object_ty))
                    .with_source("expression-inferencer")
                    .emit(self.handler);
                ResolvedType::Error
            }
        }
    }

    fn infer_quantifier(
        &mut self,
        kind: QuantifierKind,
        binding: Symbol,
        collection: &Expr,
        predicate: &Expr,
        span: Span,
    ) -> ResolvedType {
        let collection_ty = self.infer(collection);
        let elem_ty = match collection_ty.list_element() {
            Some(elem) => elem.clone(),
            None if collection_ty.is_absorbing() => ResolvedType::Error,
            None => {
                self.handler
                    .build_error(span, DiagnosticCode::TypeMismatch, format!("`{}` is not a list", collection_ty))
                    .with_source("expression-inferencer")
                    .emit(self.handler);
                ResolvedType::Error
            }
        };

        // The predicate names `binding` as one element of the collection;
        // bound here as a local for the duration of inferring `predicate`
        // so `infer_identifier` resolves it without needing a mutable
        // symbol table.
        let mut scope = FxHashMap::default();
        scope.insert(binding, elem_ty.clone());
        self.push_local(scope);
        let predicate_ty = self.infer(predicate);
        self.pop_local();

        match kind {
            QuantifierKind::All | QuantifierKind::Any | QuantifierKind::None => {
                if predicate_ty != ResolvedType::Boolean && !predicate_ty.is_absorbing() {
                    self.mismatch(span, &predicate_ty, &ResolvedType::Boolean, "quantifier predicate must be boolean");
                }
                ResolvedType::Boolean
            }
            QuantifierKind::Count => ResolvedType::Int,
            QuantifierKind::Sum => elem_ty,
            QuantifierKind::Filter => ResolvedType::List(Box::new(elem_ty)),
        }
    }

    fn infer_conditional(&mut self, cond: &Expr, then_branch: &Expr, else_branch: &Expr, span: Span) -> ResolvedType {
        let cond_ty = self.infer(cond);
        if cond_ty != ResolvedType::Boolean && !cond_ty.is_absorbing() {
            self.mismatch(span, &cond_ty, &ResolvedType::Boolean, "condition must be boolean");
        }
        let then_ty = self.infer(then_branch);
        let else_ty = self.infer(else_branch);
        if then_ty.is_assignable_to(&else_ty) {
            else_ty
        } else if else_ty.is_assignable_to(&then_ty) {
            then_ty
        } else {
            self.mismatch(span, &then_ty, &else_ty, "branches of a conditional must have compatible types");
            ResolvedType::Error
        }
    }

    fn infer_old(&mut self, inner: &Expr, span: Span) -> ResolvedType {
        if !self.in_postcondition {
            self.handler
                .build_error(span, DiagnosticCode::OldOutsidePostcondition, "`old` may only appear in a postcondition")
                .with_source("expression-inferencer")
                .emit(self.handler);
        }
        self.infer(inner)
    }

    fn infer_result(&mut self, field: Option<Symbol>, span: Span) -> ResolvedType {
        let Some(result_ty) = self.result_type.clone().filter(|_| self.in_postcondition) else {
            self.handler
                .build_error(
                    span,
                    DiagnosticCode::ResultOutsidePostcondition,
                    "`result` may only appear in a postcondition",
                )
                .with_source("expression-inferencer")
                .emit(self.handler);
            return ResolvedType::Error;
        };
        match field {
            Some(field) => self.member_type(&result_ty, field, span),
            None => result_ty,
        }
    }

    fn infer_list_literal(&mut self, items: &[Expr]) -> ResolvedType {
        let mut elem = None;
        for item in items {
            let ty = self.infer(item);
            elem = Some(match elem {
                None => ty,
                Some(acc) => acc.widen_numeric(&ty).unwrap_or(acc),
            });
        }
        ResolvedType::List(Box::new(elem.unwrap_or(ResolvedType::Error)))
    }

    fn infer_map_literal(&mut self, entries: &[(Expr, Expr)]) -> ResolvedType {
        let mut key_ty = None;
        let mut value_ty = None;
        for (key, value) in entries {
            key_ty = Some(self.infer(key));
            value_ty = Some(self.infer(value));
        }
        ResolvedType::Map(
            Box::new(key_ty.unwrap_or(ResolvedType::Error)),
            Box::new(value_ty.unwrap_or(ResolvedType::Error)),
        )
    }

    fn mismatch(&self, span: Span, found: &ResolvedType, expected: &ResolvedType, message: &str) {
        self.handler
            .build_error(
                span,
                DiagnosticCode::TypeMismatch,
                format!("{}: expected `{}`, found `{}`", message, expected, found),
            )
            .with_source("expression-inferencer")
            .emit(self.handler);
    }
}

impl SymbolTable {
    /// Every name bound in any reachable scope, for undefined-name
    /// suggestions. Not meant for resolution, only for the bounded
    /// "did you mean" search.
    pub fn candidate_names(&self) -> impl Iterator<Item = &str> {
        self.all_records().map(|r| r.name.as_str())
    }
}

/// Bounded Levenshtein edit distance between two short identifiers.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let temp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j - 1])
            };
            prev = temp;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_util::DefId;

    fn table_with(name: &str, ty: ResolvedType) -> SymbolTable {
        let mut table = SymbolTable::new();
        table
            .define(SymbolRecord {
                name: Symbol::intern(name),
                kind: SymbolKind::Binding,
                def_id: DefId(0),
                resolved_type: ty,
                location: Span::DUMMY,
            })
            .unwrap();
        table
    }

    // === Literals and identifiers ===

    #[test]
    fn test_infer_int_literal() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        assert_eq!(inferencer.infer(&Expr::Literal(Literal::Int(5), Span::DUMMY)), ResolvedType::Int);
    }

    #[test]
    fn test_undefined_identifier_emits_with_suggestion() {
        let table = table_with("amount", ResolvedType::Decimal);
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let ty = inferencer.infer(&Expr::Identifier(Symbol::intern("amoutn"), Span::DUMMY));
        assert_eq!(ty, ResolvedType::Error);
        assert!(handler.has_errors());
        let diags = handler.diagnostics();
        assert!(diags[0].help.as_deref().unwrap().contains("amount"));
    }

    // === Arithmetic widening ===

    #[test]
    fn test_binary_add_int_and_decimal_widens_to_decimal() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let expr = Expr::Binary {
            op: BinOp::Add,
            left: Box::new(Expr::Literal(Literal::Int(1), Span::DUMMY)),
            right: Box::new(Expr::Literal(Literal::Decimal(Default::default()), Span::DUMMY)),
            span: Span::DUMMY,
        };
        assert_eq!(inferencer.infer(&expr), ResolvedType::Decimal);
    }

    // === old/result gating ===

    #[test]
    fn test_old_outside_postcondition_is_rejected() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        inferencer.infer(&Expr::Old(Box::new(Expr::Literal(Literal::Bool(true), Span::DUMMY)), Span::DUMMY));
        assert!(handler.has_errors());
    }

    #[test]
    fn test_result_inside_postcondition_is_accepted() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields).in_postcondition(ResolvedType::Boolean);
        let ty = inferencer.infer(&Expr::Result(None, Span::DUMMY));
        assert_eq!(ty, ResolvedType::Boolean);
        assert!(!handler.has_errors());
    }

    // === Quantifiers ===

    #[test]
    fn test_count_quantifier_over_list_is_int() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let expr = Expr::Quantifier {
            kind: QuantifierKind::Count,
            binding: Symbol::intern("x"),
            collection: Box::new(Expr::ListLiteral(vec![Expr::Literal(Literal::Int(1), Span::DUMMY)], Span::DUMMY)),
            predicate: Box::new(Expr::Literal(Literal::Bool(true), Span::DUMMY)),
            span: Span::DUMMY,
        };
        assert_eq!(inferencer.infer(&expr), ResolvedType::Int);
    }

    #[test]
    fn test_quantifier_predicate_may_reference_its_own_binding() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let expr = Expr::Quantifier {
            kind: QuantifierKind::All,
            binding: Symbol::intern("item"),
            collection: Box::new(Expr::ListLiteral(vec![Expr::Literal(Literal::Int(1), Span::DUMMY)], Span::DUMMY)),
            predicate: Box::new(Expr::Binary {
                op: BinOp::Gt,
                left: Box::new(Expr::Identifier(Symbol::intern("item"), Span::DUMMY)),
                right: Box::new(Expr::Literal(Literal::Int(0), Span::DUMMY)),
                span: Span::DUMMY,
            }),
            span: Span::DUMMY,
        };
        assert_eq!(inferencer.infer(&expr), ResolvedType::Boolean);
        assert!(!handler.has_errors(), "predicate should resolve `item` via the quantifier's own binding");
    }

    // === Method dispatch by receiver ===

    fn call(receiver: Expr, callee: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            receiver: Some(Box::new(receiver)),
            callee: Symbol::intern(callee),
            args,
            span: Span::DUMMY,
        }
    }

    #[test]
    fn test_list_filter_binds_lambda_param_to_element_type_and_returns_same_list() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let list = Expr::ListLiteral(vec![Expr::Literal(Literal::Int(1), Span::DUMMY)], Span::DUMMY);
        let lambda = Expr::Lambda {
            params: vec![Symbol::intern("n")],
            body: Box::new(Expr::Binary {
                op: BinOp::Gt,
                left: Box::new(Expr::Identifier(Symbol::intern("n"), Span::DUMMY)),
                right: Box::new(Expr::Literal(Literal::Int(0), Span::DUMMY)),
                span: Span::DUMMY,
            }),
            span: Span::DUMMY,
        };
        let expr = call(list, "filter", vec![lambda]);
        assert_eq!(inferencer.infer(&expr), ResolvedType::List(Box::new(ResolvedType::Int)));
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_list_map_result_type_follows_lambda_body() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let list = Expr::ListLiteral(vec![Expr::Literal(Literal::Int(1), Span::DUMMY)], Span::DUMMY);
        let lambda = Expr::Lambda {
            params: vec![Symbol::intern("n")],
            body: Box::new(Expr::Literal(Literal::Str(Symbol::intern("x")), Span::DUMMY)),
            span: Span::DUMMY,
        };
        let expr = call(list, "map", vec![lambda]);
        assert_eq!(inferencer.infer(&expr), ResolvedType::List(Box::new(ResolvedType::String)));
    }

    #[test]
    fn test_list_length_and_first_methods() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let list = || Expr::ListLiteral(vec![Expr::Literal(Literal::Int(1), Span::DUMMY)], Span::DUMMY);
        assert_eq!(inferencer.infer(&call(list(), "length", vec![])), ResolvedType::Int);
        assert_eq!(
            inferencer.infer(&call(list(), "first", vec![])),
            ResolvedType::Optional(Box::new(ResolvedType::Int))
        );
    }

    #[test]
    fn test_string_methods_dispatch_by_name() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let string = || Expr::Literal(Literal::Str(Symbol::intern("hi")), Span::DUMMY);
        assert_eq!(inferencer.infer(&call(string(), "length", vec![])), ResolvedType::Int);
        assert_eq!(inferencer.infer(&call(string(), "toUpperCase", vec![])), ResolvedType::String);
        assert_eq!(
            inferencer.infer(&call(string(), "split", vec![string()])),
            ResolvedType::List(Box::new(ResolvedType::String))
        );
    }

    #[test]
    fn test_map_methods_dispatch_by_name() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let map = || {
            Expr::MapLiteral(
                vec![(Expr::Literal(Literal::Str(Symbol::intern("k")), Span::DUMMY), Expr::Literal(Literal::Int(1), Span::DUMMY))],
                Span::DUMMY,
            )
        };
        assert_eq!(
            inferencer.infer(&call(map(), "get", vec![Expr::Literal(Literal::Str(Symbol::intern("k")), Span::DUMMY)])),
            ResolvedType::Optional(Box::new(ResolvedType::Int))
        );
        assert_eq!(inferencer.infer(&call(map(), "keys", vec![])), ResolvedType::List(Box::new(ResolvedType::String)));
    }

    #[test]
    fn test_optional_get_or_else_returns_inner_type() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let optional = Expr::Literal(Literal::Null, Span::DUMMY);
        let expr = call(optional, "getOrElse", vec![Expr::Literal(Literal::Int(0), Span::DUMMY)]);
        assert_eq!(inferencer.infer(&expr), ResolvedType::Error);
    }

    #[test]
    fn test_free_builtin_abs_returns_argument_type() {
        let table = SymbolTable::new();
        let handler = Handler::new();
        let fields = FxHashMap::default();
        let mut inferencer = Inferencer::new(&table, &handler, &fields);
        let expr = Expr::Call {
            receiver: None,
            callee: Symbol::intern("abs"),
            args: vec![Expr::Literal(Literal::Decimal(Default::default()), Span::DUMMY)],
            span: Span::DUMMY,
        };
        assert_eq!(inferencer.infer(&expr), ResolvedType::Decimal);
    }
}
