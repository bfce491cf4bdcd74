//! The expression evaluator (§4.5).
//!
//! Computes a [`Value`] for a [`covenant_ast::Expr`] given an
//! [`Environment`], deterministically and without side effects beyond
//! whatever an injected effect handler does. Mirrors the shape of
//! `covenant_sem::infer::Inferencer`, one bottom-up dispatch over every
//! expression form, but produces values instead of types, and reports
//! failures as [`RuntimeError`] instead of diagnostics, since a failed
//! evaluation is a property of one test run, not a static defect in the
//! domain.

use std::cmp::Ordering;

use covenant_ast::{BinOp, Expr, Literal, QuantifierKind, UnOp};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::value::Value;

/// Recursion depth past which evaluation aborts rather than risk a
/// stack overflow on a pathological or accidentally-recursive domain
/// expression (§4.7, "global cap on recursion depth").
const MAX_DEPTH: usize = 256;

/// Quantifier collections larger than this abort rather than let one
/// test record drive an unbounded loop (§4.7, "quantifier collection
/// size").
const MAX_QUANTIFIER_ITEMS: usize = 100_000;

pub struct Evaluator<'env> {
    env: &'env Environment<'env>,
    /// The environment `old(...)` evaluates its argument against, the
    /// pre-mutation snapshot. `None` outside a postcondition, matching
    /// the inferencer's `in_postcondition` gate.
    old_env: Option<&'env Environment<'env>>,
    depth: usize,
}

impl<'env> Evaluator<'env> {
    pub fn new(env: &'env Environment<'env>) -> Self {
        Self { env, old_env: None, depth: 0 }
    }

    pub fn in_postcondition(mut self, old_env: &'env Environment<'env>) -> Self {
        self.old_env = Some(old_env);
        self
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.depth -= 1;
            return Err(RuntimeError::RecursionLimitExceeded);
        }
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Identifier(name, _) => self
                .env
                .lookup(name.as_str())
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedName(name.as_str().to_string())),
            Expr::Literal(lit, _) => Ok(literal_to_value(lit)),
            Expr::QualifiedName(qn) => self.eval_qualified(&qn.parts),
            Expr::Binary { op, left, right, .. } => self.eval_binary(*op, left, right),
            Expr::Unary { op, operand, .. } => self.eval_unary(*op, operand),
            Expr::Call { receiver, callee, args, .. } => self.eval_call(receiver.as_deref(), callee.as_str(), args),
            Expr::Member { object, field, .. } => {
                let object = self.eval(object)?;
                member_access(&object, field.as_str())
            }
            Expr::Index { object, index, .. } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                index_access(&object, &index)
            }
            Expr::Quantifier { kind, binding, collection, predicate, .. } => {
                self.eval_quantifier(*kind, binding.as_str(), collection, predicate)
            }
            Expr::Conditional { cond, then_branch, else_branch, .. } => {
                if self.eval_bool(cond)? {
                    self.eval(then_branch)
                } else {
                    self.eval(else_branch)
                }
            }
            Expr::Old(inner, _) => self.eval_old(inner),
            Expr::Result(field, _) => {
                let result = self
                    .env
                    .result()
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedName("result".to_string()))?;
                match field {
                    Some(field) => member_access(&result, field.as_str()),
                    None => Ok(result),
                }
            }
            Expr::Input(field, _) => self
                .env
                .lookup(field.as_str())
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedName(field.as_str().to_string())),
            Expr::Lambda { body, .. } => self.eval(body),
            Expr::ListLiteral(items, _) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::MapLiteral(entries, _) => {
                let mut map = IndexMap::new();
                for (key_expr, value_expr) in entries {
                    let key = self.eval(key_expr)?;
                    let key = value_to_map_key(&key)?;
                    let value = self.eval(value_expr)?;
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
        }
    }

    fn eval_bool(&mut self, expr: &Expr) -> Result<bool, RuntimeError> {
        match self.eval(expr)? {
            Value::Boolean(b) => Ok(b),
            other => Err(RuntimeError::TypeError { expected: "boolean".to_string(), found: other.type_tag().to_string() }),
        }
    }

    fn eval_qualified(&mut self, parts: &[covenant_util::Symbol]) -> Result<Value, RuntimeError> {
        let (head, tail) = parts
            .split_first()
            .ok_or_else(|| RuntimeError::UndefinedName("<empty qualified name>".to_string()))?;
        let mut current = self
            .env
            .lookup(head.as_str())
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedName(head.as_str().to_string()))?;
        for segment in tail {
            current = member_access(&current, segment.as_str())?;
        }
        Ok(current)
    }

    fn eval_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Result<Value, RuntimeError> {
        match op {
            BinOp::And => {
                if !self.eval_bool(left)? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.eval_bool(right)?))
            }
            BinOp::Or => {
                if self.eval_bool(left)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.eval_bool(right)?))
            }
            // `implies a b` desugars to `(not a) or b` (§4.5), an
            // evaluator-only desugaring; the inferencer keeps Implies
            // and Iff distinct so mismatches are reported against the
            // operator actually written.
            BinOp::Implies => {
                if !self.eval_bool(left)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.eval_bool(right)?))
            }
            BinOp::Iff => Ok(Value::Boolean(self.eval_bool(left)? == self.eval_bool(right)?)),
            BinOp::Eq => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                Ok(Value::Boolean(l.equals(&r)))
            }
            BinOp::Ne => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                Ok(Value::Boolean(!l.equals(&r)))
            }
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                let ordering = compare_values(&l, &r)?;
                let holds = match op {
                    BinOp::Lt => ordering == Ordering::Less,
                    BinOp::Gt => ordering == Ordering::Greater,
                    BinOp::Le => ordering != Ordering::Greater,
                    BinOp::Ge => ordering != Ordering::Less,
                    _ => unreachable!(),
                };
                Ok(Value::Boolean(holds))
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                arithmetic(op, &l, &r)
            }
            BinOp::In => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                membership(&l, &r)
            }
        }
    }

    fn eval_unary(&mut self, op: UnOp, operand: &Expr) -> Result<Value, RuntimeError> {
        match op {
            UnOp::Not => Ok(Value::Boolean(!self.eval_bool(operand)?)),
            UnOp::Neg => match self.eval(operand)? {
                Value::Int(i) => Ok(Value::Int(-i)),
                Value::Decimal(d) => Ok(Value::Decimal(-d)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(RuntimeError::TypeError { expected: "numeric".to_string(), found: other.type_tag().to_string() }),
            },
        }
    }

    fn eval_call(&mut self, receiver: Option<&Expr>, callee: &str, args: &[Expr]) -> Result<Value, RuntimeError> {
        match receiver {
            None => self.eval_free_call(callee, args),
            Some(receiver_expr) => {
                let receiver_value = self.eval(receiver_expr)?;
                self.eval_method_call(receiver_value, callee, args)
            }
        }
    }

    /// A free call to a stdlib function or an effect override (§4.3's
    /// free built-ins). An effect override bound via
    /// [`Environment::bind_effect`] always wins over the default
    /// implementation, so a test harness can make `now`/`uuid`/`random`
    /// deterministic.
    fn eval_free_call(&mut self, callee: &str, args: &[Expr]) -> Result<Value, RuntimeError> {
        if let Some(handler) = self.env.lookup_effect(callee) {
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(self.eval(arg)?);
            }
            return Ok(handler(&evaluated));
        }
        if args.is_empty() {
            if let Some(value) = default_builtin(callee) {
                return Ok(value);
            }
        }

        let mut evaluated = Vec::with_capacity(args.len());
        for arg in args {
            evaluated.push(self.eval(arg)?);
        }
        match callee {
            "abs" | "floor" | "ceil" | "round" => {
                let value = evaluated.first().ok_or_else(|| missing_arg(callee))?;
                numeric_unary(callee, value)
            }
            "min" | "max" => {
                let mut values = evaluated.into_iter();
                let mut acc = values.next().ok_or_else(|| missing_arg(callee))?;
                for value in values {
                    let ordering = compare_values(&acc, &value)?;
                    let replace = if callee == "min" { ordering == Ordering::Greater } else { ordering == Ordering::Less };
                    if replace {
                        acc = value;
                    }
                }
                Ok(acc)
            }
            "len" | "length" => {
                let value = evaluated.first().ok_or_else(|| missing_arg(callee))?;
                collection_length(value)
            }
            "toString" => Ok(Value::String(display_value(evaluated.first().ok_or_else(|| missing_arg(callee))?))),
            "hash" => {
                use std::hash::{Hash, Hasher};
                let mut hasher = rustc_hash::FxHasher::default();
                display_value(evaluated.first().ok_or_else(|| missing_arg(callee))?).hash(&mut hasher);
                Ok(Value::String(format!("{:x}", hasher.finish())))
            }
            "parseInt" => parse_int(evaluated.first().ok_or_else(|| missing_arg(callee))?),
            "parseDecimal" => parse_decimal(evaluated.first().ok_or_else(|| missing_arg(callee))?),
            "isNull" => Ok(Value::Boolean(!evaluated.first().map(Value::is_truthy_option).unwrap_or(true))),
            "isNotNull" | "isValid" => Ok(Value::Boolean(evaluated.first().map(Value::is_truthy_option).unwrap_or(false))),
            other => Err(RuntimeError::UndefinedName(other.to_string())),
        }
    }

    /// A method-style call with a receiver, dispatched by the receiver
    /// value's shape then by method name, mirroring
    /// `covenant_sem::infer::Inferencer::infer_method_call`.
    fn eval_method_call(&mut self, receiver: Value, callee: &str, args: &[Expr]) -> Result<Value, RuntimeError> {
        match receiver {
            Value::List(items) => self.eval_list_method(items, callee, args),
            Value::Set(items) => self.eval_list_method(items, callee, args),
            Value::String(s) => eval_string_method(&s, callee, args, self),
            Value::Map(map) => self.eval_map_method(&map, callee, args),
            Value::Option(inner) => self.eval_optional_method(inner, callee, args),
            Value::Entity { .. } => self.eval_entity_method(&receiver, callee, args),
            other => Err(RuntimeError::NoSuchField { field: callee.to_string(), ty: other.type_tag().to_string() }),
        }
    }

    fn eval_list_method(&mut self, items: Vec<Value>, callee: &str, args: &[Expr]) -> Result<Value, RuntimeError> {
        match callee {
            "length" | "count" | "size" => Ok(Value::Int(items.len() as i128)),
            "isEmpty" => Ok(Value::Boolean(items.is_empty())),
            "isNotEmpty" => Ok(Value::Boolean(!items.is_empty())),
            "contains" | "includes" => {
                let needle = self.eval(args.first().ok_or_else(|| missing_arg(callee))?)?;
                Ok(Value::Boolean(items.iter().any(|item| item.equals(&needle))))
            }
            "first" => Ok(Value::Option(items.first().cloned().map(Box::new))),
            "last" => Ok(Value::Option(items.last().cloned().map(Box::new))),
            "filter" => {
                let lambda = single_lambda(args, callee)?;
                let mut kept = Vec::new();
                for item in items {
                    if self.eval_lambda_bool(lambda, item.clone())? {
                        kept.push(item);
                    }
                }
                Ok(Value::List(kept))
            }
            "map" => {
                let lambda = single_lambda(args, callee)?;
                let mut mapped = Vec::with_capacity(items.len());
                for item in items {
                    mapped.push(self.eval_lambda(lambda, item)?);
                }
                Ok(Value::List(mapped))
            }
            "sum" => items.into_iter().try_fold(Value::Int(0), |acc, item| arithmetic(BinOp::Add, &acc, &item)),
            "avg" => {
                let count = items.len();
                if count == 0 {
                    return Err(RuntimeError::TypeError { expected: "non-empty list".to_string(), found: "empty list".to_string() });
                }
                let total = items.into_iter().try_fold(Value::Int(0), |acc, item| arithmetic(BinOp::Add, &acc, &item))?;
                arithmetic(BinOp::Div, &total, &Value::Int(count as i128))
            }
            "min" | "max" => {
                let mut values = items.into_iter();
                let mut acc = values.next().ok_or_else(|| RuntimeError::TypeError {
                    expected: "non-empty list".to_string(),
                    found: "empty list".to_string(),
                })?;
                for value in values {
                    let ordering = compare_values(&acc, &value)?;
                    let replace = if callee == "min" { ordering == Ordering::Greater } else { ordering == Ordering::Less };
                    if replace {
                        acc = value;
                    }
                }
                Ok(acc)
            }
            other => Err(RuntimeError::NoSuchField { field: other.to_string(), ty: "list".to_string() }),
        }
    }

    fn eval_optional_method(&mut self, inner: Option<Box<Value>>, callee: &str, args: &[Expr]) -> Result<Value, RuntimeError> {
        match callee {
            "isDefined" => Ok(Value::Boolean(inner.is_some())),
            "isEmpty" => Ok(Value::Boolean(inner.is_none())),
            "get" => inner.map(|v| *v).ok_or_else(|| RuntimeError::TypeError {
                expected: "defined optional".to_string(),
                found: "none".to_string(),
            }),
            "getOrElse" => match inner {
                Some(value) => Ok(*value),
                None => self.eval(args.first().ok_or_else(|| missing_arg(callee))?),
            },
            other => Err(RuntimeError::NoSuchField { field: other.to_string(), ty: "option".to_string() }),
        }
    }

    fn eval_map_method(&mut self, map: &IndexMap<String, Value>, callee: &str, args: &[Expr]) -> Result<Value, RuntimeError> {
        match callee {
            "get" => {
                let key = self.eval(args.first().ok_or_else(|| missing_arg(callee))?)?;
                let key = value_to_map_key(&key)?;
                Ok(Value::Option(map.get(&key).cloned().map(Box::new)))
            }
            "has" | "containsKey" => {
                let key = self.eval(args.first().ok_or_else(|| missing_arg(callee))?)?;
                let key = value_to_map_key(&key)?;
                Ok(Value::Boolean(map.contains_key(&key)))
            }
            "keys" => Ok(Value::List(map.keys().map(|k| Value::String(k.clone())).collect())),
            "values" => Ok(Value::List(map.values().cloned().collect())),
            "size" | "length" | "count" => Ok(Value::Int(map.len() as i128)),
            other => Err(RuntimeError::NoSuchField { field: other.to_string(), ty: "map".to_string() }),
        }
    }

    fn eval_entity_method(&mut self, receiver: &Value, callee: &str, args: &[Expr]) -> Result<Value, RuntimeError> {
        match callee {
            "exists" => Ok(Value::Boolean(true)),
            "lookup" => {
                for arg in args {
                    self.eval(arg)?;
                }
                Ok(Value::Option(Some(Box::new(receiver.clone()))))
            }
            other => Err(RuntimeError::NoSuchField { field: other.to_string(), ty: receiver.type_tag().to_string() }),
        }
    }

    /// Evaluate a `filter`/`map` lambda argument with its single
    /// parameter bound to `item`.
    fn eval_lambda(&mut self, lambda: &Expr, item: Value) -> Result<Value, RuntimeError> {
        let Expr::Lambda { params, body, .. } = lambda else {
            unreachable!("single_lambda only returns an Expr::Lambda");
        };
        let mut bindings = std::collections::HashMap::new();
        if let Some(param) = params.first() {
            bindings.insert(param.as_str().to_string(), item);
        }
        let child = self.env.child_with_many(bindings);
        let mut sub = Evaluator { env: &child, old_env: self.old_env, depth: self.depth };
        sub.eval(body)
    }

    fn eval_lambda_bool(&mut self, lambda: &Expr, item: Value) -> Result<bool, RuntimeError> {
        match self.eval_lambda(lambda, item)? {
            Value::Boolean(b) => Ok(b),
            other => Err(RuntimeError::TypeError { expected: "boolean".to_string(), found: other.type_tag().to_string() }),
        }
    }

    fn eval_quantifier(
        &mut self,
        kind: QuantifierKind,
        binding: &str,
        collection: &Expr,
        predicate: &Expr,
    ) -> Result<Value, RuntimeError> {
        let collection_value = self.eval(collection)?;
        let items = collection_items(&collection_value)?;
        if items.len() > MAX_QUANTIFIER_ITEMS {
            return Err(RuntimeError::CollectionTooLarge(items.len()));
        }

        match kind {
            QuantifierKind::All => {
                for item in &items {
                    let child = self.env.child_with(binding, item.clone());
                    let mut sub = Evaluator { env: &child, old_env: self.old_env, depth: self.depth };
                    if !sub.eval_bool(predicate)? {
                        return Ok(Value::Boolean(false));
                    }
                }
                Ok(Value::Boolean(true))
            }
            QuantifierKind::Any => {
                for item in &items {
                    let child = self.env.child_with(binding, item.clone());
                    let mut sub = Evaluator { env: &child, old_env: self.old_env, depth: self.depth };
                    if sub.eval_bool(predicate)? {
                        return Ok(Value::Boolean(true));
                    }
                }
                Ok(Value::Boolean(false))
            }
            QuantifierKind::None => {
                for item in &items {
                    let child = self.env.child_with(binding, item.clone());
                    let mut sub = Evaluator { env: &child, old_env: self.old_env, depth: self.depth };
                    if sub.eval_bool(predicate)? {
                        return Ok(Value::Boolean(false));
                    }
                }
                Ok(Value::Boolean(true))
            }
            QuantifierKind::Count => {
                let mut count: i128 = 0;
                for item in &items {
                    let child = self.env.child_with(binding, item.clone());
                    let mut sub = Evaluator { env: &child, old_env: self.old_env, depth: self.depth };
                    if sub.eval_bool(predicate)? {
                        count += 1;
                    }
                }
                Ok(Value::Int(count))
            }
            QuantifierKind::Sum => {
                let mut total = Value::Int(0);
                for item in &items {
                    let child = self.env.child_with(binding, item.clone());
                    let mut sub = Evaluator { env: &child, old_env: self.old_env, depth: self.depth };
                    let term = sub.eval(predicate)?;
                    total = arithmetic(BinOp::Add, &total, &term)?;
                }
                Ok(total)
            }
            QuantifierKind::Filter => {
                let mut kept = Vec::new();
                for item in &items {
                    let child = self.env.child_with(binding, item.clone());
                    let mut sub = Evaluator { env: &child, old_env: self.old_env, depth: self.depth };
                    if sub.eval_bool(predicate)? {
                        kept.push(item.clone());
                    }
                }
                Ok(Value::List(kept))
            }
        }
    }

    fn eval_old(&mut self, inner: &Expr) -> Result<Value, RuntimeError> {
        let old_env = self.old_env.ok_or_else(|| RuntimeError::TypeError {
            expected: "postcondition context".to_string(),
            found: "precondition".to_string(),
        })?;
        let mut sub = Evaluator { env: old_env, old_env: None, depth: self.depth };
        sub.eval(inner)
    }
}

fn missing_arg(method: &str) -> RuntimeError {
    RuntimeError::TypeError { expected: format!("argument to `{method}`"), found: "none".to_string() }
}

fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(i) => Value::Int(*i as i128),
        Literal::Decimal(d) => Value::Decimal(*d),
        Literal::Str(s) => Value::String(s.as_str().to_string()),
        Literal::Bool(b) => Value::Boolean(*b),
        Literal::Duration(value, unit) => Value::Duration { value: *value, unit: unit.as_str().to_string() },
        Literal::Null => Value::Option(None),
    }
}

/// Field/variant access. `Optional` member access on `None` yields
/// `None` (an absent field of an absent optional is still absent)
/// rather than an error, matching "Optional field accessed through
/// Optional yields Optional<field>" (§8).
fn member_access(object: &Value, field: &str) -> Result<Value, RuntimeError> {
    match object {
        Value::Record { fields, .. } | Value::Entity { fields, .. } => fields
            .get(field)
            .cloned()
            .ok_or_else(|| RuntimeError::NoSuchField { field: field.to_string(), ty: object.type_tag().to_string() }),
        Value::Map(map) => map
            .get(field)
            .cloned()
            .ok_or_else(|| RuntimeError::NoSuchField { field: field.to_string(), ty: object.type_tag().to_string() }),
        Value::Result { success, value, error } => match field {
            "success" => Ok(Value::Boolean(*success)),
            "value" | "result" => Ok(value.as_deref().cloned().unwrap_or(Value::Option(None))),
            "error" => Ok(error.as_deref().cloned().unwrap_or(Value::Option(None))),
            _ => Err(RuntimeError::NoSuchField { field: field.to_string(), ty: "result".to_string() }),
        },
        Value::Enum { variant, data, .. } => match field {
            "variant" => Ok(Value::String(variant.clone())),
            "data" => Ok(data.as_deref().cloned().unwrap_or(Value::Option(None))),
            _ => Err(RuntimeError::NoSuchField { field: field.to_string(), ty: "enum".to_string() }),
        },
        Value::Option(None) => Ok(Value::Option(None)),
        Value::Option(Some(inner)) => member_access(inner, field),
        other => Err(RuntimeError::NoSuchField { field: field.to_string(), ty: other.type_tag().to_string() }),
    }
}

fn index_access(object: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match (object, index) {
        (Value::List(items), Value::Int(i)) => {
            let idx = if *i < 0 { None } else { usize::try_from(*i).ok() };
            idx.and_then(|idx| items.get(idx).cloned())
                .ok_or(RuntimeError::IndexOutOfBounds { index: *i as i64, length: items.len() })
        }
        (Value::Map(map), Value::String(key)) => map
            .get(key)
            .cloned()
            .ok_or_else(|| RuntimeError::NoSuchField { field: key.clone(), ty: "map".to_string() }),
        (other, _) => Err(RuntimeError::TypeError { expected: "indexable".to_string(), found: other.type_tag().to_string() }),
    }
}

fn value_to_map_key(value: &Value) -> Result<String, RuntimeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(RuntimeError::TypeError { expected: "string key".to_string(), found: other.type_tag().to_string() }),
    }
}

fn collection_items(value: &Value) -> Result<Vec<Value>, RuntimeError> {
    match value {
        Value::List(items) => Ok(items.clone()),
        Value::Set(items) => Ok(items.clone()),
        Value::Map(map) => Ok(map.values().cloned().collect()),
        other => Err(RuntimeError::TypeError { expected: "collection".to_string(), found: other.type_tag().to_string() }),
    }
}

fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_arithmetic(op, *a, *b),
        (Value::Decimal(a), Value::Decimal(b)) => decimal_arithmetic(op, *a, *b),
        (Value::Int(a), Value::Decimal(b)) => decimal_arithmetic(op, Decimal::from(*a), *b),
        (Value::Decimal(a), Value::Int(b)) => decimal_arithmetic(op, *a, Decimal::from(*b)),
        (Value::Float(a), Value::Float(b)) => float_arithmetic(op, *a, *b),
        (Value::String(a), Value::String(b)) if op == BinOp::Add => Ok(Value::String(format!("{a}{b}"))),
        (l, r) => Err(RuntimeError::TypeError { expected: "numeric".to_string(), found: format!("{}/{}", l.type_tag(), r.type_tag()) }),
    }
}

fn int_arithmetic(op: BinOp, a: i128, b: i128) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => Ok(Value::Int(a + b)),
        BinOp::Sub => Ok(Value::Int(a - b)),
        BinOp::Mul => Ok(Value::Int(a * b)),
        BinOp::Div => {
            if b == 0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Int(a / b))
            }
        }
        BinOp::Mod => {
            if b == 0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Int(a % b))
            }
        }
        _ => unreachable!("non-arithmetic op routed to int_arithmetic"),
    }
}

fn decimal_arithmetic(op: BinOp, a: Decimal, b: Decimal) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => Ok(Value::Decimal(a + b)),
        BinOp::Sub => Ok(Value::Decimal(a - b)),
        BinOp::Mul => Ok(Value::Decimal(a * b)),
        BinOp::Div => {
            if b.is_zero() {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Decimal(a / b))
            }
        }
        BinOp::Mod => {
            if b.is_zero() {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Decimal(a % b))
            }
        }
        _ => unreachable!("non-arithmetic op routed to decimal_arithmetic"),
    }
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => Ok(Value::Float(a + b)),
        BinOp::Sub => Ok(Value::Float(a - b)),
        BinOp::Mul => Ok(Value::Float(a * b)),
        BinOp::Div => {
            if b == 0.0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Float(a / b))
            }
        }
        BinOp::Mod => {
            if b == 0.0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Float(a % b))
            }
        }
        _ => unreachable!("non-arithmetic op routed to float_arithmetic"),
    }
}

fn compare_values(left: &Value, right: &Value) -> Result<Ordering, RuntimeError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Decimal(a), Value::Decimal(b)) => Ok(a.cmp(b)),
        (Value::Int(a), Value::Decimal(b)) => Ok(Decimal::from(*a).cmp(b)),
        (Value::Decimal(a), Value::Int(b)) => Ok(a.cmp(&Decimal::from(*b))),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).ok_or(RuntimeError::TypeError {
            expected: "comparable float".to_string(),
            found: "NaN".to_string(),
        }),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Ok(a.cmp(b)),
        (l, r) => Err(RuntimeError::TypeError { expected: "comparable".to_string(), found: format!("{}/{}", l.type_tag(), r.type_tag()) }),
    }
}

fn membership(needle: &Value, haystack: &Value) -> Result<Value, RuntimeError> {
    match haystack {
        Value::List(items) => Ok(Value::Boolean(items.iter().any(|item| item.equals(needle)))),
        Value::Set(items) => Ok(Value::Boolean(items.iter().any(|item| item.equals(needle)))),
        Value::Map(map) => match needle {
            Value::String(key) => Ok(Value::Boolean(map.contains_key(key))),
            other => Err(RuntimeError::TypeError { expected: "string key".to_string(), found: other.type_tag().to_string() }),
        },
        other => Err(RuntimeError::TypeError { expected: "collection".to_string(), found: other.type_tag().to_string() }),
    }
}

/// The single declared parameter of a `filter`/`map` argument, which
/// the parser always produces as an `Expr::Lambda` (§4.3).
fn single_lambda<'a>(args: &'a [Expr], method: &str) -> Result<&'a Expr, RuntimeError> {
    match args.first() {
        Some(lambda @ Expr::Lambda { .. }) => Ok(lambda),
        Some(other) => Err(RuntimeError::TypeError {
            expected: format!("lambda argument to `{method}`"),
            found: format!("{other:?}"),
        }),
        None => Err(missing_arg(method)),
    }
}

/// `abs`/`floor`/`ceil`/`round`, dispatched over whichever numeric
/// representation the value actually holds. `floor`/`ceil`/`round` are
/// identities on `Int` (already whole).
fn numeric_unary(name: &str, value: &Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Int(i) => match name {
            "abs" => Ok(Value::Int(i.abs())),
            _ => Ok(Value::Int(*i)),
        },
        Value::Decimal(d) => match name {
            "abs" => Ok(Value::Decimal(d.abs())),
            "floor" => Ok(Value::Decimal(d.floor())),
            "ceil" => Ok(Value::Decimal(d.ceil())),
            "round" => Ok(Value::Decimal(d.round())),
            _ => unreachable!("numeric_unary called with unknown name {name}"),
        },
        Value::Float(f) => match name {
            "abs" => Ok(Value::Float(f.abs())),
            "floor" => Ok(Value::Float(f.floor())),
            "ceil" => Ok(Value::Float(f.ceil())),
            "round" => Ok(Value::Float(f.round())),
            _ => unreachable!("numeric_unary called with unknown name {name}"),
        },
        other => Err(RuntimeError::TypeError { expected: "numeric".to_string(), found: other.type_tag().to_string() }),
    }
}

/// `len`/`length` as a free call taking its collection as an argument,
/// distinct from the method-call form dispatched in `eval_list_method`.
fn collection_length(value: &Value) -> Result<Value, RuntimeError> {
    match value {
        Value::List(items) => Ok(Value::Int(items.len() as i128)),
        Value::Set(items) => Ok(Value::Int(items.len() as i128)),
        Value::Map(map) => Ok(Value::Int(map.len() as i128)),
        Value::String(s) => Ok(Value::Int(s.chars().count() as i128)),
        other => Err(RuntimeError::TypeError { expected: "collection".to_string(), found: other.type_tag().to_string() }),
    }
}

/// `toString`'s rendering of a value, independent of `Display` on
/// `Value` itself since this is a domain-level stdlib function, not a
/// debugging aid.
fn display_value(value: &Value) -> String {
    match value {
        Value::Unit => "unit".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::String(s) => s.clone(),
        Value::Bytes(b) => format!("{b:?}"),
        Value::Timestamp(t) => t.to_rfc3339(),
        Value::Duration { value, unit } => format!("{value} {unit}"),
        Value::Uuid(u) => u.to_string(),
        Value::List(items) => format!("[{}]", items.iter().map(display_value).collect::<Vec<_>>().join(", ")),
        Value::Set(items) => format!("{{{}}}", items.iter().map(display_value).collect::<Vec<_>>().join(", ")),
        Value::Map(map) => format!(
            "{{{}}}",
            map.iter().map(|(k, v)| format!("{k}: {}", display_value(v))).collect::<Vec<_>>().join(", ")
        ),
        Value::Option(None) => "none".to_string(),
        Value::Option(Some(inner)) => display_value(inner),
        Value::Result { success, .. } => if *success { "ok".to_string() } else { "error".to_string() },
        Value::Record { type_name, .. } => type_name.clone(),
        Value::Entity { type_name, id, .. } => format!("{type_name}({})", display_value(id)),
        Value::Enum { variant, .. } => variant.clone(),
        Value::Native(name) => name.clone(),
    }
}

fn parse_int(value: &Value) -> Result<Value, RuntimeError> {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map(Value::Int)
            .map_err(|_| RuntimeError::TypeError { expected: "integer string".to_string(), found: s.clone() }),
        Value::Int(i) => Ok(Value::Int(*i)),
        other => Err(RuntimeError::TypeError { expected: "string".to_string(), found: other.type_tag().to_string() }),
    }
}

fn parse_decimal(value: &Value) -> Result<Value, RuntimeError> {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Value::Decimal)
            .map_err(|_| RuntimeError::TypeError { expected: "decimal string".to_string(), found: s.clone() }),
        Value::Decimal(d) => Ok(Value::Decimal(*d)),
        other => Err(RuntimeError::TypeError { expected: "string".to_string(), found: other.type_tag().to_string() }),
    }
}

fn eval_string_method(s: &str, callee: &str, args: &[Expr], eval: &mut Evaluator<'_>) -> Result<Value, RuntimeError> {
    match callee {
        "length" => Ok(Value::Int(s.chars().count() as i128)),
        "isEmpty" => Ok(Value::Boolean(s.is_empty())),
        "isNotEmpty" => Ok(Value::Boolean(!s.is_empty())),
        "contains" | "includes" => {
            let needle = eval.eval(args.first().ok_or_else(|| missing_arg(callee))?)?;
            match needle {
                Value::String(needle) => Ok(Value::Boolean(s.contains(&needle))),
                other => Err(RuntimeError::TypeError { expected: "string".to_string(), found: other.type_tag().to_string() }),
            }
        }
        "startsWith" => {
            let needle = eval.eval(args.first().ok_or_else(|| missing_arg(callee))?)?;
            match needle {
                Value::String(needle) => Ok(Value::Boolean(s.starts_with(&needle))),
                other => Err(RuntimeError::TypeError { expected: "string".to_string(), found: other.type_tag().to_string() }),
            }
        }
        "endsWith" => {
            let needle = eval.eval(args.first().ok_or_else(|| missing_arg(callee))?)?;
            match needle {
                Value::String(needle) => Ok(Value::Boolean(s.ends_with(&needle))),
                other => Err(RuntimeError::TypeError { expected: "string".to_string(), found: other.type_tag().to_string() }),
            }
        }
        "toUpperCase" => Ok(Value::String(s.to_uppercase())),
        "toLowerCase" => Ok(Value::String(s.to_lowercase())),
        "trim" => Ok(Value::String(s.trim().to_string())),
        "concat" => {
            let other = eval.eval(args.first().ok_or_else(|| missing_arg(callee))?)?;
            match other {
                Value::String(other) => Ok(Value::String(format!("{s}{other}"))),
                other => Err(RuntimeError::TypeError { expected: "string".to_string(), found: other.type_tag().to_string() }),
            }
        }
        "split" => {
            let separator = eval.eval(args.first().ok_or_else(|| missing_arg(callee))?)?;
            match separator {
                Value::String(separator) => {
                    Ok(Value::List(s.split(separator.as_str()).map(|part| Value::String(part.to_string())).collect()))
                }
                other => Err(RuntimeError::TypeError { expected: "string".to_string(), found: other.type_tag().to_string() }),
            }
        }
        other => Err(RuntimeError::NoSuchField { field: other.to_string(), ty: "string".to_string() }),
    }
}

/// The default, effect-handler-free implementation of the stdlib
/// producers named in §3 ("built-ins preloaded"). A test harness that
/// needs deterministic output overrides these via
/// [`Environment::bind_effect`]; absent an override these still
/// produce a value of the declared type, just not a reproducible one.
fn default_builtin(name: &str) -> Option<Value> {
    match name {
        "now" | "today" => Some(Value::Timestamp(chrono::Utc::now())),
        "uuid" => Some(Value::Uuid(uuid::Uuid::new_v4())),
        "random" => Some(Value::Decimal(Decimal::new(0, 0))),
        _ => None,
    }
}
