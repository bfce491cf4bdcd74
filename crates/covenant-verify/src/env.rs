//! Evaluation environments and verification bindings.
//!
//! An [`Environment`] is what the expression evaluator reads from; a
//! [`Bindings`] is what the contract verifier builds from test data and
//! threads through the phases of one behavior check (§4.7). The two are
//! related but distinct: `Bindings` owns the `pre`/`post`/`old` value
//! sets across the whole verification of one behavior, while an
//! `Environment` is the narrower, possibly nested, view the evaluator
//! sees for one expression (a quantifier predicate sees a child
//! environment with its bound variable added on top of the behavior's
//! environment).

use std::collections::HashMap;
use std::sync::Arc;

use covenant_sem::ResolvedType;

use crate::value::Value;

/// A built-in seam (`now`, `uuid`, `random`, ...) a caller may override,
/// e.g. to make a test deterministic. Effect invocation is otherwise
/// outside this crate's responsibility (§4.5).
pub type EffectHandler = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// A lexical evaluation environment: bindings plus their declared
/// types plus any effect overrides, with an optional parent to fall
/// back to.
#[derive(Clone)]
pub struct Environment<'a> {
    parent: Option<&'a Environment<'a>>,
    bindings: HashMap<String, Value>,
    types: HashMap<String, ResolvedType>,
    effects: HashMap<String, EffectHandler>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Self {
            parent: None,
            bindings: HashMap::new(),
            types: HashMap::new(),
            effects: HashMap::new(),
        }
    }

    pub fn with_bindings(bindings: HashMap<String, Value>) -> Self {
        Self { parent: None, bindings, types: HashMap::new(), effects: HashMap::new() }
    }

    /// A child environment that shadows `self` with one additional
    /// binding, used to introduce a quantifier's bound variable without
    /// mutating the parent.
    pub fn child_with(&'a self, name: &str, value: Value) -> Environment<'a> {
        let mut bindings = HashMap::new();
        bindings.insert(name.to_string(), value);
        Environment {
            parent: Some(self),
            bindings,
            types: HashMap::new(),
            effects: HashMap::new(),
        }
    }

    /// Like [`Environment::child_with`], but for a lambda's whole
    /// parameter list at once (`filter`/`map` arguments may bind more
    /// than one name).
    pub fn child_with_many(&'a self, bindings: HashMap<String, Value>) -> Environment<'a> {
        Environment {
            parent: Some(self),
            bindings,
            types: HashMap::new(),
            effects: HashMap::new(),
        }
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn bind_type(&mut self, name: impl Into<String>, ty: ResolvedType) {
        self.types.insert(name.into(), ty);
    }

    pub fn bind_effect(&mut self, name: impl Into<String>, handler: EffectHandler) {
        self.effects.insert(name.into(), handler);
    }

    /// Look up `name`, walking outward through parent environments.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value);
        }
        self.parent.and_then(|parent| parent.lookup(name))
    }

    pub fn lookup_type(&self, name: &str) -> Option<&ResolvedType> {
        if let Some(ty) = self.types.get(name) {
            return Some(ty);
        }
        self.parent.and_then(|parent| parent.lookup_type(name))
    }

    pub fn lookup_effect(&self, name: &str) -> Option<&EffectHandler> {
        if let Some(handler) = self.effects.get(name) {
            return Some(handler);
        }
        self.parent.and_then(|parent| parent.lookup_effect(name))
    }

    /// `old(id)` resolves against the `__old_id` mirror name (§4.5).
    pub fn lookup_old(&self, name: &str) -> Option<&Value> {
        self.lookup(&format!("__old_{name}"))
    }

    pub fn result(&self) -> Option<&Value> {
        self.lookup("result")
    }
}

impl<'a> Default for Environment<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned value sets threaded through one behavior's verification
/// (§3, "Bindings").
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub pre: HashMap<String, Value>,
    pub post: HashMap<String, Value>,
    pub old: HashMap<String, Value>,
    pub result: Option<Value>,
}

impl Bindings {
    pub fn new(pre: HashMap<String, Value>) -> Self {
        let old = pre.clone();
        Self { pre, post: HashMap::new(), old, result: None }
    }

    /// An environment built from `pre`, for precondition evaluation.
    pub fn precondition_environment(&self) -> Environment<'static> {
        Environment::with_bindings(self.pre.clone())
    }

    /// An environment built from `post` plus `__old_X` mirrors plus
    /// `result`, for postcondition and invariant evaluation.
    pub fn postcondition_environment(&self) -> Environment<'static> {
        let mut bindings = self.post.clone();
        for (name, value) in &self.old {
            bindings.insert(format!("__old_{name}"), value.clone());
        }
        if let Some(result) = &self.result {
            bindings.insert("result".to_string(), result.clone());
        }
        Environment::with_bindings(bindings)
    }
}
