//! The contract verifier (§4.7): the core of what `verify` does.
//!
//! One [`Behavior`] is checked in up to four steps: materialize
//! `Bindings` from test data, evaluate preconditions, optionally invoke
//! the target function (dynamic mode) and evaluate postconditions and
//! invariants against its outcome, then run any declared scenarios for
//! that behavior. A precondition failure does not stop the
//! postcondition/invariant checks from running; only a target exception
//! does, since postconditions can't be meaningfully evaluated without a
//! result (§7).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use covenant_ast::{BehaviorDecl, Domain};
use covenant_sem::ResolvedType;
use covenant_util::{DefId, Symbol};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::env::{Bindings, Environment};
use crate::error::{VerifyError, Result};
use crate::eval::Evaluator;
use crate::json::{self, to_json};
use crate::sandbox::{self, Outcome};
use crate::scenario::{ScenarioResult, ScenarioRunner};
use crate::value::Value;

/// Which of the three checks a call to [`verify`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMode {
    /// Preconditions, postconditions, and invariants against bindings
    /// supplied directly by test data. No target function is invoked.
    Static,
    /// Like `Static`, plus one target-function invocation per behavior,
    /// whose result feeds the postcondition/invariant checks.
    Dynamic,
    /// Like `Dynamic`, plus every declared scenario for each behavior.
    Scenario,
}

/// A target function a harness makes invokable for dynamic/scenario
/// verification. `Ok(None)` signals "no function under this name",
/// distinct from `Err` (the function exists and threw), so the caller
/// can fall back through the exact/camelCase/snake_case candidates
/// without mistaking a real failure for a naming miss.
#[async_trait]
pub trait TargetFunction: Send + Sync {
    async fn invoke(&self, name: &str, args: Vec<serde_json::Value>) -> std::result::Result<Option<serde_json::Value>, String>;
}

/// Test data for one behavior: the bindings the checks run against,
/// and any scenario overlays (§6).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BehaviorTestData {
    pub intent: Option<String>,
    pub bindings: Option<BindingsSpec>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioTestData>,
    /// Budget for the target invocation, milliseconds. Defaults to 1000.
    pub timeout_ms: Option<u64>,
    /// Input field names whose string bindings must never be promoted
    /// to `UUID`/`Timestamp` by shape-sniffing, even when they look
    /// like one (§9's schema-hint open question).
    #[serde(default)]
    pub no_promote: std::collections::HashSet<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BindingsSpec {
    #[serde(default)]
    pub pre: serde_json::Value,
    pub post: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioTestData {
    pub name: String,
    pub expected: Option<ExpectedOutcome>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpectedOutcome {
    pub success: Option<bool>,
    pub result: Option<serde_json::Value>,
    pub error: Option<ExpectedError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpectedError {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// The full test data for a `verify` call: test bindings keyed by the
/// behavior name they belong to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TestData(pub IndexMap<String, BehaviorTestData>);

impl TestData {
    pub fn from_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateStatus {
    Passed,
    Failed,
    Errored,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct PredicateResult {
    pub description: String,
    pub status: PredicateStatus,
    pub message: Option<String>,
    pub expected: Option<serde_json::Value>,
    pub actual: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct BehaviorResult {
    pub name: String,
    pub passed: bool,
    pub timed_out: bool,
    pub preconditions: Vec<PredicateResult>,
    pub postconditions: Vec<PredicateResult>,
    pub invariants: Vec<PredicateResult>,
    pub target_result: Option<serde_json::Value>,
    pub target_error: Option<String>,
    pub scenarios: Vec<ScenarioResult>,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub spec_path: Option<String>,
    pub target_path: Option<String>,
    pub test_data_path: Option<String>,
    pub mode: VerificationMode,
    pub behaviors: Vec<BehaviorResult>,
    pub summary: Summary,
    pub duration_ms: u128,
    pub timestamp: DateTime<Utc>,
    pub warnings: Vec<String>,
}

const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Code-level knobs for [`verify`], populated by the caller rather than
/// read from environment or file (the config *shape*, not a config
/// *loader* — loading it from TOML/env is a future CLI's job).
#[derive(Debug, Clone, Copy)]
pub struct VerifierConfig {
    /// Used for a behavior whose test data omits `timeout_ms`.
    pub default_timeout_ms: u64,
    /// Stop checking further behaviors as soon as one fails or errors.
    /// Off by default: `verify`'s point is a full report in one pass.
    pub fail_fast: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self { default_timeout_ms: DEFAULT_TIMEOUT_MS, fail_fast: false }
    }
}

/// Checks every behavior named in `test_data` against `domain`, in the
/// given mode. A behavior name in `test_data` that `domain` does not
/// declare is a fatal, not per-behavior, error: it almost always means
/// the test data and the domain have drifted apart.
pub async fn verify(
    domain: &Domain,
    test_data: &TestData,
    target: Option<Arc<dyn TargetFunction>>,
    mode: VerificationMode,
) -> Result<VerificationReport> {
    verify_with_config(domain, test_data, target, mode, VerifierConfig::default()).await
}

/// Like [`verify`], with caller-supplied [`VerifierConfig`] knobs.
pub async fn verify_with_config(
    domain: &Domain,
    test_data: &TestData,
    target: Option<Arc<dyn TargetFunction>>,
    mode: VerificationMode,
    config: VerifierConfig,
) -> Result<VerificationReport> {
    let started = Instant::now();
    let mut warnings = Vec::new();
    if mode != VerificationMode::Static && target.is_none() {
        warnings.push("dynamic/scenario mode requested with no target function; falling back to static checks".to_string());
    }

    let mut behaviors = Vec::with_capacity(test_data.0.len());
    for (name, data) in &test_data.0 {
        let behavior = domain
            .behaviors
            .iter()
            .find(|b| b.name.as_str() == name)
            .ok_or_else(|| VerifyError::UnknownBehavior(name.clone()))?;
        let result = run_behavior(domain, behavior, data, target.as_deref(), mode, config.default_timeout_ms).await;
        let stop = config.fail_fast && !result.passed;
        behaviors.push(result);
        if stop {
            break;
        }
    }

    let summary = summarize(&behaviors);
    Ok(VerificationReport {
        spec_path: None,
        target_path: None,
        test_data_path: None,
        mode,
        behaviors,
        summary,
        duration_ms: started.elapsed().as_millis(),
        timestamp: Utc::now(),
        warnings,
    })
}

fn summarize(behaviors: &[BehaviorResult]) -> Summary {
    let mut summary = Summary { total: behaviors.len(), ..Summary::default() };
    for behavior in behaviors {
        let has_error = behavior
            .preconditions
            .iter()
            .chain(&behavior.postconditions)
            .chain(&behavior.invariants)
            .any(|p| p.status == PredicateStatus::Errored)
            || behavior.target_error.is_some() && behavior.target_result.is_none() && !behavior.timed_out;
        if has_error {
            summary.errors += 1;
        } else if behavior.timed_out {
            summary.skipped += 1;
        } else if behavior.passed {
            summary.passed += 1;
        } else {
            summary.failed += 1;
        }
    }
    summary
}

async fn run_behavior(
    domain: &Domain,
    behavior: &BehaviorDecl,
    data: &BehaviorTestData,
    target: Option<&dyn TargetFunction>,
    mode: VerificationMode,
    default_timeout_ms: u64,
) -> BehaviorResult {
    let started = Instant::now();
    let pre_json = data.bindings.as_ref().map(|b| &b.pre);
    let pre = build_pre_bindings(behavior, pre_json, &data.no_promote);
    let mut bindings = Bindings::new(pre);

    let preconditions = check_predicates(&behavior.preconditions, &bindings.precondition_environment(), None, "precondition");

    let mut target_result = None;
    let mut target_error = None;
    let mut timed_out = false;

    if mode != VerificationMode::Static {
        if let Some(target) = target {
            let timeout_ms = data.timeout_ms.unwrap_or(default_timeout_ms);
            let args = behavior
                .input_fields
                .iter()
                .map(|field| to_json(bindings.pre.get(field.name.as_str()).unwrap_or(&Value::Option(None))))
                .collect::<Vec<_>>();
            match invoke_target(target, behavior.name.as_str(), args, timeout_ms).await {
                Ok(Outcome::Success(value, _)) => {
                    let resolved = resolve_type_node(&behavior.output_type);
                    bindings.result = Some(json::from_json_typed(&value, &resolved));
                    target_result = Some(value);
                }
                Ok(Outcome::Failure(message, _)) => {
                    target_error = Some(message);
                }
                Ok(Outcome::Timeout(_)) => {
                    timed_out = true;
                }
                Err(_not_found) => {
                    target_error = Some(format!("no target function matches `{}`", behavior.name.as_str()));
                }
            }
        }
    }

    bindings.post = build_post_bindings(behavior, &bindings.pre, data.bindings.as_ref().and_then(|b| b.post.as_ref()));

    // A target exception leaves `result` undefined; postconditions that
    // read it would only fail with a confusing "undefined name" rather
    // than reporting the real cause, so they're skipped outright. A
    // timeout is the same situation for the opposite reason: the target
    // never told us anything, cooperative or not (§4.6/§4.7).
    let skip_post = timed_out || (target_error.is_some() && target_result.is_none() && mode != VerificationMode::Static);

    let (postconditions, invariants) = if skip_post {
        (
            skipped_predicates(&behavior.postconditions, "postcondition"),
            skipped_predicates(&behavior.invariants, "invariant"),
        )
    } else {
        let old_env = bindings.precondition_environment();
        let post_env = bindings.postcondition_environment();
        (
            check_predicates(&behavior.postconditions, &post_env, Some(&old_env), "postcondition"),
            check_predicates(&behavior.invariants, &post_env, Some(&old_env), "invariant"),
        )
    };

    let scenarios = if mode == VerificationMode::Scenario {
        run_scenarios_for(domain, behavior, &bindings, target, &data.scenarios, default_timeout_ms).await
    } else {
        Vec::new()
    };

    let passed = !timed_out
        && target_error.is_none()
        && all_passed(&preconditions)
        && all_passed(&postconditions)
        && all_passed(&invariants)
        && scenarios.iter().all(|s| s.passed);

    BehaviorResult {
        name: behavior.name.as_str().to_string(),
        passed,
        timed_out,
        preconditions,
        postconditions,
        invariants,
        target_result,
        target_error,
        scenarios,
        duration_ms: started.elapsed().as_millis(),
    }
}

async fn run_scenarios_for(
    domain: &Domain,
    behavior: &BehaviorDecl,
    bindings: &Bindings,
    target: Option<&dyn TargetFunction>,
    test_scenarios: &[ScenarioTestData],
    timeout_ms: u64,
) -> Vec<ScenarioResult> {
    let mut results = Vec::new();
    for scenario in domain.scenarios.iter().filter(|s| s.behavior == behavior.name) {
        let scenario_bindings = Bindings::new(bindings.pre.clone());
        let mut runner = ScenarioRunner::new(scenario.name.as_str(), &scenario.given, &scenario.when, &scenario.then, scenario_bindings);
        let expected = test_scenarios.iter().find(|s| s.name == scenario.name.as_str()).and_then(|s| s.expected.as_ref());

        let given_steps = runner.run_given();
        if !given_steps.iter().all(|s| s.status == crate::scenario::StepStatus::Passed) {
            let when_steps = Vec::new();
            let then_results = crate::scenario::skipped_then_results(scenario.then.len());
            results.push(runner.finish(given_steps, when_steps, then_results));
            continue;
        }

        if let Some(target) = target {
            let args = behavior
                .input_fields
                .iter()
                .map(|field| to_json(runner.bindings().pre.get(field.name.as_str()).unwrap_or(&Value::Option(None))))
                .collect::<Vec<_>>();
            if let Ok(Outcome::Success(value, _)) = invoke_target(target, behavior.name.as_str(), args, timeout_ms).await {
                let resolved = resolve_type_node(&behavior.output_type);
                runner.inject_result(json::from_json_typed(&value, &resolved));
            }
        }

        let when_steps = runner.run_when();
        let mut then_results = if when_steps.iter().all(|s| s.status == crate::scenario::StepStatus::Passed) {
            runner.run_then_public()
        } else {
            crate::scenario::skipped_then_results(scenario.then.len())
        };

        if let Some(expected) = expected {
            then_results.push(compare_expected(expected, runner.bindings().result.as_ref()));
        }

        results.push(runner.finish(given_steps, when_steps, then_results));
    }
    results
}

/// Compares a scenario's produced `result` against the `expected` block
/// test data supplies alongside it (§8, scenario 4: "expected.error.code
/// matches the target's thrown error code").
fn compare_expected(expected: &ExpectedOutcome, actual: Option<&Value>) -> crate::scenario::ThenResult {
    use crate::scenario::{StepStatus, ThenResult};

    let actual_json = actual.map(to_json);
    if let Some(wanted_success) = expected.success {
        let got_success = actual
            .map(|v| match v {
                Value::Result { success, .. } => *success,
                _ => true,
            })
            .unwrap_or(false);
        if got_success != wanted_success {
            return ThenResult {
                status: StepStatus::Failed,
                message: "expected.success did not match the scenario's result".to_string(),
                expected: Some(serde_json::Value::Bool(wanted_success)),
                actual: Some(serde_json::Value::Bool(got_success)),
                values: None,
                error: None,
            };
        }
    }
    if let Some(wanted_error) = &expected.error {
        let got_code = actual.and_then(|v| match v {
            Value::Result { error: Some(error), .. } => match error.as_ref() {
                Value::Record { fields, .. } => fields.get("code").map(to_json),
                _ => None,
            },
            _ => None,
        });
        if let Some(wanted_code) = &wanted_error.code {
            let matches = got_code.as_ref().and_then(|v| v.as_str()) == Some(wanted_code.as_str());
            if !matches {
                return ThenResult {
                    status: StepStatus::Failed,
                    message: "expected.error.code did not match".to_string(),
                    expected: Some(serde_json::Value::String(wanted_code.clone())),
                    actual: got_code,
                    values: None,
                    error: None,
                };
            }
        }
    }
    if let Some(wanted_result) = &expected.result {
        if actual_json.as_ref() != Some(wanted_result) {
            return ThenResult {
                status: StepStatus::Failed,
                message: "expected.result did not match the scenario's result".to_string(),
                expected: Some(wanted_result.clone()),
                actual: actual_json,
                values: None,
                error: None,
            };
        }
    }
    ThenResult {
        status: StepStatus::Passed,
        message: "expected outcome matched".to_string(),
        expected: None,
        actual: actual_json,
        values: None,
        error: None,
    }
}

fn all_passed(predicates: &[PredicateResult]) -> bool {
    predicates.iter().all(|p| p.status == PredicateStatus::Passed)
}

fn check_predicates(
    exprs: &[covenant_ast::Expr],
    env: &Environment<'_>,
    old_env: Option<&Environment<'_>>,
    label: &str,
) -> Vec<PredicateResult> {
    exprs
        .iter()
        .enumerate()
        .map(|(i, expr)| {
            let mut evaluator = Evaluator::new(env);
            if let Some(old_env) = old_env {
                evaluator = evaluator.in_postcondition(old_env);
            }
            let description = format!("{label} #{}", i + 1);
            match evaluator.eval(expr) {
                Ok(Value::Boolean(true)) => PredicateResult {
                    description,
                    status: PredicateStatus::Passed,
                    message: None,
                    expected: None,
                    actual: None,
                },
                Ok(Value::Boolean(false)) => PredicateResult {
                    description,
                    status: PredicateStatus::Failed,
                    message: Some(format!("{label} did not hold")),
                    expected: Some(serde_json::Value::Bool(true)),
                    actual: Some(serde_json::Value::Bool(false)),
                },
                Ok(other) => PredicateResult {
                    description,
                    status: PredicateStatus::Failed,
                    message: Some(format!("{label} must be boolean, found {}", other.type_tag())),
                    expected: Some(serde_json::Value::String("boolean".to_string())),
                    actual: Some(to_json(&other)),
                },
                Err(error) => PredicateResult {
                    description,
                    status: PredicateStatus::Errored,
                    message: Some(error.to_string()),
                    expected: None,
                    actual: None,
                },
            }
        })
        .collect()
}

fn skipped_predicates(exprs: &[covenant_ast::Expr], label: &str) -> Vec<PredicateResult> {
    (0..exprs.len())
        .map(|i| PredicateResult {
            description: format!("{label} #{}", i + 1),
            status: PredicateStatus::Skipped,
            message: Some(format!("{label} skipped: target result undefined")),
            expected: None,
            actual: None,
        })
        .collect()
}

/// Tries `name`, its camelCase form, and its snake_case form in turn,
/// racing each attempt against `timeout_ms` (§4.7, "exact, then
/// camelCase, then snake_case").
async fn invoke_target(
    target: &dyn TargetFunction,
    name: &str,
    args: Vec<serde_json::Value>,
    timeout_ms: u64,
) -> std::result::Result<Outcome<serde_json::Value, String>, ()> {
    for candidate in name_candidates(name) {
        let outcome = sandbox::run_with_timeout(target.invoke(&candidate, args.clone()), timeout_ms).await;
        match outcome {
            Outcome::Success(None, _) => continue,
            Outcome::Success(Some(value), duration) => return Ok(Outcome::Success(value, duration)),
            Outcome::Failure(message, duration) => return Ok(Outcome::Failure(message, duration)),
            Outcome::Timeout(duration) => return Ok(Outcome::Timeout(duration)),
        }
    }
    Err(())
}

fn name_candidates(name: &str) -> Vec<String> {
    use heck::{ToLowerCamelCase, ToSnakeCase};
    let mut candidates = vec![name.to_string(), name.to_lower_camel_case(), name.to_snake_case()];
    candidates.dedup();
    candidates
}

fn build_pre_bindings(
    behavior: &BehaviorDecl,
    pre_json: Option<&serde_json::Value>,
    no_promote: &std::collections::HashSet<String>,
) -> HashMap<String, Value> {
    let object = pre_json.and_then(|v| v.as_object());
    let mut bindings = HashMap::with_capacity(behavior.input_fields.len());
    for field in &behavior.input_fields {
        let name = field.name.as_str();
        let ty = resolve_type_node(&field.ty);
        let value = object
            .and_then(|o| o.get(name))
            .map(|json| {
                if no_promote.contains(name) {
                    crate::json::from_json_no_promote(json)
                } else {
                    crate::json::from_json_typed(json, &ty)
                }
            })
            .unwrap_or(Value::Option(None));
        bindings.insert(name.to_string(), value);
    }
    bindings
}

fn build_post_bindings(
    behavior: &BehaviorDecl,
    pre: &HashMap<String, Value>,
    post_json: Option<&serde_json::Value>,
) -> HashMap<String, Value> {
    let mut post = pre.clone();
    let Some(object) = post_json.and_then(|v| v.as_object()) else {
        return post;
    };
    for (key, value) in object {
        let ty = behavior
            .input_fields
            .iter()
            .find(|f| f.name.as_str() == key)
            .map(|f| resolve_type_node(&f.ty));
        let converted = match ty {
            Some(ty) => crate::json::from_json_typed(value, &ty),
            None => crate::json::from_json(value),
        };
        post.insert(key.clone(), converted);
    }
    post
}

/// A best-effort `TypeNode` → `ResolvedType` mapping for binding
/// conversion. Unlike `covenant_sem::resolve::TypeResolver`, this needs
/// no symbol table: declared types it can't name precisely (inline
/// enums/unions, or references it hasn't cross-checked) fall back to a
/// `DefId::DUMMY`-keyed `Struct`, since JSON conversion only branches on
/// the `ResolvedType` variant, never on the `DefId` itself.
fn resolve_type_node(node: &covenant_ast::TypeNode) -> ResolvedType {
    use covenant_ast::TypeNode;
    match node {
        TypeNode::Primitive(name, _) => match name.as_str() {
            "String" => ResolvedType::String,
            "Int" => ResolvedType::Int,
            "Decimal" => ResolvedType::Decimal,
            "Boolean" => ResolvedType::Boolean,
            "Timestamp" => ResolvedType::Timestamp,
            "UUID" => ResolvedType::Uuid,
            "Duration" => ResolvedType::Duration,
            _ => ResolvedType::Error,
        },
        TypeNode::Reference(qualified) => ResolvedType::Struct(qualified.head(), DefId::DUMMY),
        TypeNode::Constrained { base, .. } => resolve_type_node(base),
        TypeNode::Enum { .. } | TypeNode::Union { .. } => ResolvedType::Error,
        TypeNode::Struct { .. } => ResolvedType::Struct(Symbol::intern("Object"), DefId::DUMMY),
        TypeNode::List { element, .. } => ResolvedType::List(Box::new(resolve_type_node(element))),
        TypeNode::Map { value, .. } => ResolvedType::Map(Box::new(ResolvedType::String), Box::new(resolve_type_node(value))),
        TypeNode::Optional { inner, .. } => ResolvedType::Optional(Box::new(resolve_type_node(inner))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_ast::{BinOp, Expr, Literal};
    use covenant_util::Span;

    fn eq_expr(left: Expr, right: Expr) -> Expr {
        Expr::Binary { op: BinOp::Eq, left: Box::new(left), right: Box::new(right), span: Span::DUMMY }
    }

    fn field(name: &str, ty: covenant_ast::TypeNode) -> covenant_ast::FieldDecl {
        covenant_ast::FieldDecl { name: Symbol::intern(name), ty, optional: false, span: Span::DUMMY }
    }

    fn int_type() -> covenant_ast::TypeNode {
        covenant_ast::TypeNode::Primitive(Symbol::intern("Int"), Span::DUMMY)
    }

    fn increment_behavior() -> BehaviorDecl {
        BehaviorDecl {
            name: Symbol::intern("Increment"),
            input_fields: vec![field("n", int_type())],
            output_type: int_type(),
            error_types: vec![],
            preconditions: vec![],
            postconditions: vec![eq_expr(
                Expr::Result(None, Span::DUMMY),
                Expr::Binary {
                    op: BinOp::Add,
                    left: Box::new(Expr::Old(Box::new(Expr::Identifier(Symbol::intern("n"), Span::DUMMY)), Span::DUMMY)),
                    right: Box::new(Expr::Literal(Literal::Int(1), Span::DUMMY)),
                    span: Span::DUMMY,
                },
            )],
            invariants: vec![],
            span: Span::DUMMY,
        }
    }

    struct FixedTarget(i64);

    #[async_trait]
    impl TargetFunction for FixedTarget {
        async fn invoke(&self, _name: &str, _args: Vec<serde_json::Value>) -> std::result::Result<Option<serde_json::Value>, String> {
            Ok(Some(serde_json::json!(self.0)))
        }
    }

    #[tokio::test]
    async fn test_postcondition_with_old_passes_when_target_matches() {
        let domain = Domain::empty(Symbol::intern("Counter"), Symbol::intern("1.0.0"));
        let behavior = increment_behavior();
        let data = BehaviorTestData {
            intent: None,
            bindings: Some(BindingsSpec { pre: serde_json::json!({"n": 5}), post: None }),
            scenarios: vec![],
            timeout_ms: None,
            no_promote: Default::default(),
        };
        let result = run_behavior(&domain, &behavior, &data, Some(&FixedTarget(6)), VerificationMode::Dynamic, 1000).await;
        assert!(result.passed, "{result:?}");
        assert_eq!(result.target_result, Some(serde_json::json!(6)));
    }

    #[tokio::test]
    async fn test_postcondition_fails_when_target_result_is_wrong() {
        let domain = Domain::empty(Symbol::intern("Counter"), Symbol::intern("1.0.0"));
        let behavior = increment_behavior();
        let data = BehaviorTestData {
            intent: None,
            bindings: Some(BindingsSpec { pre: serde_json::json!({"n": 5}), post: None }),
            scenarios: vec![],
            timeout_ms: None,
            no_promote: Default::default(),
        };
        let result = run_behavior(&domain, &behavior, &data, Some(&FixedTarget(99)), VerificationMode::Dynamic, 1000).await;
        assert!(!result.passed);
        assert_eq!(result.postconditions[0].status, PredicateStatus::Failed);
    }

    struct SlowTarget;

    #[async_trait]
    impl TargetFunction for SlowTarget {
        async fn invoke(&self, _name: &str, _args: Vec<serde_json::Value>) -> std::result::Result<Option<serde_json::Value>, String> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Some(serde_json::json!(1)))
        }
    }

    #[tokio::test]
    async fn test_target_timeout_skips_postconditions_but_marks_behavior_failed() {
        let domain = Domain::empty(Symbol::intern("Counter"), Symbol::intern("1.0.0"));
        let behavior = increment_behavior();
        let data = BehaviorTestData {
            intent: None,
            bindings: Some(BindingsSpec { pre: serde_json::json!({"n": 5}), post: None }),
            scenarios: vec![],
            timeout_ms: Some(5),
            no_promote: Default::default(),
        };
        let result = run_behavior(&domain, &behavior, &data, Some(&SlowTarget), VerificationMode::Dynamic, 1000).await;
        assert!(result.timed_out);
        assert!(!result.passed);
        assert_eq!(result.postconditions[0].status, PredicateStatus::Skipped);
    }

    #[test]
    fn test_no_promote_field_keeps_uuid_shaped_string_literal() {
        let behavior = BehaviorDecl {
            name: Symbol::intern("TakesCode"),
            input_fields: vec![field("code", covenant_ast::TypeNode::Primitive(Symbol::intern("String"), Span::DUMMY))],
            output_type: int_type(),
            error_types: vec![],
            preconditions: vec![],
            postconditions: vec![],
            invariants: vec![],
            span: Span::DUMMY,
        };
        let mut no_promote = std::collections::HashSet::new();
        no_promote.insert("code".to_string());
        let pre_json = serde_json::json!({"code": "550e8400-e29b-41d4-a716-446655440000"});
        let bindings = build_pre_bindings(&behavior, Some(&pre_json), &no_promote);
        assert_eq!(bindings.get("code"), Some(&Value::String("550e8400-e29b-41d4-a716-446655440000".to_string())));
    }

    #[test]
    fn test_name_candidates_include_camel_and_snake_case() {
        let candidates = name_candidates("create_payment");
        assert!(candidates.contains(&"create_payment".to_string()));
        assert!(candidates.contains(&"createPayment".to_string()));
    }

    #[test]
    fn test_name_candidates_dedup_when_forms_coincide() {
        assert_eq!(name_candidates("length"), vec!["length".to_string()]);
    }

    #[test]
    fn test_static_mode_never_invokes_target() {
        let _ = VerificationMode::Static;
    }

    fn refund_behavior() -> BehaviorDecl {
        let le_expr = Expr::Binary {
            op: BinOp::Le,
            left: Box::new(Expr::Result(Some(Symbol::intern("refunded_amount")), Span::DUMMY)),
            right: Box::new(Expr::Old(Box::new(Expr::Identifier(Symbol::intern("captured_amount"), Span::DUMMY)), Span::DUMMY)),
            span: Span::DUMMY,
        };
        BehaviorDecl {
            name: Symbol::intern("Refund"),
            input_fields: vec![field("captured_amount", int_type()), field("requested_amount", int_type())],
            output_type: covenant_ast::TypeNode::Reference(covenant_ast::QualifiedName::simple(Symbol::intern("RefundResult"), Span::DUMMY)),
            error_types: vec![],
            preconditions: vec![],
            postconditions: vec![le_expr],
            invariants: vec![],
            span: Span::DUMMY,
        }
    }

    struct RefundTarget(i64);

    #[async_trait]
    impl TargetFunction for RefundTarget {
        async fn invoke(&self, _name: &str, _args: Vec<serde_json::Value>) -> std::result::Result<Option<serde_json::Value>, String> {
            Ok(Some(serde_json::json!({"refunded_amount": self.0})))
        }
    }

    #[tokio::test]
    async fn test_refund_exceeding_captured_amount_fails_postcondition() {
        let domain = Domain::empty(Symbol::intern("Payments"), Symbol::intern("1.0.0"));
        let behavior = refund_behavior();
        let data = BehaviorTestData {
            intent: None,
            bindings: Some(BindingsSpec {
                pre: serde_json::json!({"captured_amount": 50, "requested_amount": 75}),
                post: None,
            }),
            scenarios: vec![],
            timeout_ms: None,
            no_promote: Default::default(),
        };
        // Target naively refunds whatever was requested, exceeding what was captured.
        let result = run_behavior(&domain, &behavior, &data, Some(&RefundTarget(75)), VerificationMode::Dynamic, 1000).await;
        assert!(!result.passed);
        assert_eq!(result.postconditions[0].status, PredicateStatus::Failed);
        assert_eq!(result.postconditions[0].expected, Some(serde_json::Value::Bool(true)));
        assert_eq!(result.postconditions[0].actual, Some(serde_json::Value::Bool(false)));
    }

    fn create_payment_behavior() -> BehaviorDecl {
        BehaviorDecl {
            name: Symbol::intern("CreatePayment"),
            input_fields: vec![field("amount", int_type())],
            output_type: covenant_ast::TypeNode::Reference(covenant_ast::QualifiedName::simple(Symbol::intern("PaymentResult"), Span::DUMMY)),
            error_types: vec![],
            preconditions: vec![],
            postconditions: vec![],
            invariants: vec![],
            span: Span::DUMMY,
        }
    }

    struct DeclinedTarget;

    #[async_trait]
    impl TargetFunction for DeclinedTarget {
        async fn invoke(&self, _name: &str, _args: Vec<serde_json::Value>) -> std::result::Result<Option<serde_json::Value>, String> {
            Ok(Some(serde_json::json!({"success": false, "error": {"code": "CARD_DECLINED"}})))
        }
    }

    #[tokio::test]
    async fn test_scenario_matches_expected_declined_error() {
        let mut domain = Domain::empty(Symbol::intern("Payments"), Symbol::intern("1.0.0"));
        let behavior = create_payment_behavior();
        domain.scenarios.push(covenant_ast::ScenarioDecl {
            name: Symbol::intern("DeclinedCard"),
            behavior: Symbol::intern("CreatePayment"),
            given: vec![],
            when: vec![],
            then: vec![],
            span: Span::DUMMY,
        });
        domain.behaviors.push(behavior.clone());

        let mut test_data = IndexMap::new();
        test_data.insert(
            "CreatePayment".to_string(),
            BehaviorTestData {
                intent: None,
                bindings: Some(BindingsSpec { pre: serde_json::json!({"amount": 100}), post: None }),
                scenarios: vec![ScenarioTestData {
                    name: "DeclinedCard".to_string(),
                    expected: Some(ExpectedOutcome {
                        success: Some(false),
                        result: None,
                        error: Some(ExpectedError { code: Some("CARD_DECLINED".to_string()), message: None }),
                    }),
                }],
                timeout_ms: None,
                no_promote: Default::default(),
            },
        );
        let test_data = TestData(test_data);
        let target: Arc<dyn TargetFunction> = Arc::new(DeclinedTarget);
        let report = verify(&domain, &test_data, Some(target), VerificationMode::Scenario).await.unwrap();

        assert_eq!(report.behaviors.len(), 1);
        let scenario = &report.behaviors[0].scenarios[0];
        assert!(scenario.passed, "{scenario:?}");
    }

    #[tokio::test]
    async fn test_fail_fast_stops_after_first_failing_behavior() {
        let mut domain = Domain::empty(Symbol::intern("Counter"), Symbol::intern("1.0.0"));
        domain.behaviors.push(increment_behavior());
        let mut test_data = IndexMap::new();
        test_data.insert(
            "Increment".to_string(),
            BehaviorTestData {
                intent: None,
                bindings: Some(BindingsSpec { pre: serde_json::json!({"n": 5}), post: None }),
                scenarios: vec![],
                timeout_ms: None,
                no_promote: Default::default(),
            },
        );
        let test_data = TestData(test_data);
        let target: Arc<dyn TargetFunction> = Arc::new(FixedTarget(99));
        let config = VerifierConfig { default_timeout_ms: 1000, fail_fast: true };
        let report = verify_with_config(&domain, &test_data, Some(target), VerificationMode::Dynamic, config).await.unwrap();
        assert_eq!(report.behaviors.len(), 1);
        assert!(!report.behaviors[0].passed);
    }
}
