//! The scenario runner (§4.8): executes one `given`/`when`/`then` block
//! against its own child bindings, recording per-step and per-assertion
//! results as it goes.
//!
//! States advance forward only (`given_running` → `when_running` →
//! `then_running` → `done`); an error inside `given` or `when` skips
//! straight to `done` rather than attempting `then`, and the skipped
//! assertions are reported rather than silently dropped, so a caller
//! can always see the full shape of what ran and what didn't.

use std::time::{Duration, Instant};

use covenant_ast::{Expr, Stmt};

use crate::env::Bindings;
use crate::error::RuntimeError;
use crate::eval::Evaluator;
use crate::json::to_json;
use crate::value::Value;

/// The runner's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    GivenRunning,
    WhenRunning,
    ThenRunning,
    Done,
}

/// The status of one step or assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Passed,
    Failed,
    Errored,
    /// The phase it belonged to was aborted before this ran.
    NotRun,
}

/// The outcome of one `given`/`when` statement.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub description: String,
    pub status: StepStatus,
    pub duration: Duration,
}

/// The outcome of one `then` assertion, enriched with the comparisons
/// the verifier adds when `expected.*` fields are present (§4.7, step
/// 7).
#[derive(Debug, Clone)]
pub struct ThenResult {
    pub status: StepStatus,
    pub message: String,
    pub expected: Option<serde_json::Value>,
    pub actual: Option<serde_json::Value>,
    pub values: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// The full record of running one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: String,
    pub passed: bool,
    pub given_steps: Vec<StepResult>,
    pub when_steps: Vec<StepResult>,
    pub then_results: Vec<ThenResult>,
}

/// Drives one scenario's `given`, `when`, and `then` phases against a
/// set of child bindings derived from the behavior's `pre` bindings.
pub struct ScenarioRunner<'a> {
    name: String,
    given: &'a [Stmt],
    when: &'a [Stmt],
    then: &'a [Expr],
    bindings: Bindings,
    state: ScenarioState,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(name: impl Into<String>, given: &'a [Stmt], when: &'a [Stmt], then: &'a [Expr], bindings: Bindings) -> Self {
        Self { name: name.into(), given, when, then, bindings, state: ScenarioState::GivenRunning }
    }

    pub fn run(mut self) -> ScenarioResult {
        let given_steps = self.run_given();
        let given_ok = all_passed(&given_steps);

        let when_steps = if given_ok {
            self.run_when()
        } else {
            self.state = ScenarioState::Done;
            Vec::new()
        };
        let when_ok = given_ok && all_passed(&when_steps);

        let then_results = if when_ok { self.run_then() } else { skipped_then_results(self.then.len()) };
        self.state = ScenarioState::Done;

        let passed = given_ok && when_ok && all_passed(&then_results);
        ScenarioResult { name: self.name, passed, given_steps, when_steps, then_results }
    }

    /// Runs only the `given` phase, leaving `when`/`then` for the caller
    /// to drive. Used when a target function must be invoked between
    /// `given` and `then`: the caller runs `given`, reads the bindings it
    /// produced to build the target's arguments, awaits the call, and
    /// feeds the result back in via [`Self::inject_result`].
    pub fn run_given(&mut self) -> Vec<StepResult> {
        self.run_phase(self.given)
    }

    pub fn run_when(&mut self) -> Vec<StepResult> {
        self.state = ScenarioState::WhenRunning;
        self.run_phase(self.when)
    }

    /// Binds a value as `result` for the remaining `then` predicates,
    /// the way a completed dynamic target invocation would.
    pub fn inject_result(&mut self, value: Value) {
        self.bindings.result = Some(value);
    }

    /// The bindings accumulated so far, for reading current field values
    /// (e.g. to build a target call's argument list after `given` runs).
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn run_then_public(&mut self) -> Vec<ThenResult> {
        self.state = ScenarioState::ThenRunning;
        self.run_then()
    }

    /// Finishes the scenario, reporting its name and the results
    /// gathered via [`Self::run_given`]/[`Self::run_when`]/
    /// [`Self::run_then_public`].
    pub fn finish(
        self,
        given_steps: Vec<StepResult>,
        when_steps: Vec<StepResult>,
        then_results: Vec<ThenResult>,
    ) -> ScenarioResult {
        let passed = all_passed(&given_steps) && all_passed(&when_steps) && all_passed(&then_results);
        ScenarioResult { name: self.name, passed, given_steps, when_steps, then_results }
    }

    /// Runs a `given` or `when` block. Statements execute in order;
    /// the first error stops the phase and the remaining statements are
    /// reported `NotRun`, matching "stop at first error within their
    /// phase" (§4.7).
    fn run_phase(&mut self, stmts: &[Stmt]) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(stmts.len());
        let mut aborted = false;
        for stmt in stmts {
            if aborted {
                results.push(StepResult {
                    description: describe_stmt(stmt),
                    status: StepStatus::NotRun,
                    duration: Duration::ZERO,
                });
                continue;
            }
            let started = Instant::now();
            let status = match self.exec_stmt(stmt) {
                Ok(()) => StepStatus::Passed,
                Err(_) => {
                    aborted = true;
                    StepStatus::Errored
                }
            };
            results.push(StepResult { description: describe_stmt(stmt), status, duration: started.elapsed() });
        }
        results
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Assignment { target, value, .. } => {
                let env = self.bindings.precondition_environment();
                let mut evaluator = Evaluator::new(&env);
                let evaluated = evaluator.eval(value)?;
                let name = assignment_target_name(target)?;
                self.bindings.pre.insert(name, evaluated);
                Ok(())
            }
            Stmt::Call { target, call, .. } => {
                let env = self.bindings.precondition_environment();
                let mut evaluator = Evaluator::new(&env);
                let result = evaluator.eval(call)?;
                if let Some(name) = target {
                    self.bindings.pre.insert(name.as_str().to_string(), result.clone());
                    if name.as_str() == "result" {
                        self.bindings.result = Some(result);
                    }
                } else {
                    self.bindings.result = Some(result);
                }
                Ok(())
            }
            Stmt::Loop { count, variable, body, .. } => {
                let env = self.bindings.precondition_environment();
                let mut evaluator = Evaluator::new(&env);
                let count = match evaluator.eval(count)? {
                    Value::Int(n) if n >= 0 => n as u64,
                    other => {
                        return Err(RuntimeError::TypeError {
                            expected: "non-negative int".to_string(),
                            found: other.type_tag().to_string(),
                        })
                    }
                };
                for i in 0..count {
                    if let Some(variable) = variable {
                        self.bindings.pre.insert(variable.as_str().to_string(), Value::Int(i as i128));
                    }
                    for inner in body {
                        self.exec_stmt(inner)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn run_then(&mut self) -> Vec<ThenResult> {
        self.then
            .iter()
            .map(|predicate| {
                let env = self.bindings.postcondition_environment();
                let old_env = self.bindings.precondition_environment();
                let mut evaluator = Evaluator::new(&env).in_postcondition(&old_env);
                match evaluator.eval(predicate) {
                    Ok(Value::Boolean(true)) => ThenResult {
                        status: StepStatus::Passed,
                        message: "assertion held".to_string(),
                        expected: Some(serde_json::Value::Bool(true)),
                        actual: Some(serde_json::Value::Bool(true)),
                        values: None,
                        error: None,
                    },
                    Ok(Value::Boolean(false)) => ThenResult {
                        status: StepStatus::Failed,
                        message: "assertion did not hold".to_string(),
                        expected: Some(serde_json::Value::Bool(true)),
                        actual: Some(serde_json::Value::Bool(false)),
                        values: None,
                        error: None,
                    },
                    Ok(other) => ThenResult {
                        status: StepStatus::Failed,
                        message: format!("`then` predicate must be boolean, found {}", other.type_tag()),
                        expected: Some(serde_json::Value::String("boolean".to_string())),
                        actual: Some(to_json(&other)),
                        values: None,
                        error: None,
                    },
                    Err(error) => ThenResult {
                        status: StepStatus::Errored,
                        message: "assertion raised a runtime error".to_string(),
                        expected: None,
                        actual: None,
                        values: None,
                        error: Some(error.to_string()),
                    },
                }
            })
            .collect()
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }
}

fn all_passed(steps: &[impl HasStatus]) -> bool {
    steps.iter().all(|step| step.status() == StepStatus::Passed)
}

pub(crate) fn skipped_then_results(count: usize) -> Vec<ThenResult> {
    (0..count)
        .map(|_| ThenResult {
            status: StepStatus::NotRun,
            message: "skipped: an earlier given/when step failed".to_string(),
            expected: None,
            actual: None,
            values: None,
            error: None,
        })
        .collect()
}

trait HasStatus {
    fn status(&self) -> StepStatus;
}

impl HasStatus for StepResult {
    fn status(&self) -> StepStatus {
        self.status
    }
}

impl HasStatus for ThenResult {
    fn status(&self) -> StepStatus {
        self.status
    }
}

fn assignment_target_name(target: &Expr) -> Result<String, RuntimeError> {
    match target {
        Expr::Identifier(name, _) => Ok(name.as_str().to_string()),
        Expr::Input(name, _) => Ok(name.as_str().to_string()),
        other => Err(RuntimeError::TypeError {
            expected: "assignable name".to_string(),
            found: format!("{other:?}"),
        }),
    }
}

fn describe_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Assignment { .. } => "assignment".to_string(),
        Stmt::Call { target: Some(name), .. } => format!("call bound to `{}`", name.as_str()),
        Stmt::Call { target: None, .. } => "call".to_string(),
        Stmt::Loop { variable: Some(name), .. } => format!("loop as `{}`", name.as_str()),
        Stmt::Loop { variable: None, .. } => "loop".to_string(),
    }
}
