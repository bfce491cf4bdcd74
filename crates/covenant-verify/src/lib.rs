//! covenant-verify - Expression Evaluator, Sandboxed Runner, Contract
//! Verifier, Scenario Runner
//!
//! Where `covenant-sem` answers "is this domain internally consistent",
//! this crate answers "does a concrete target function actually behave
//! the way the domain says it should". The two share an AST
//! (`covenant-ast`) and a type vocabulary (`covenant_sem::ResolvedType`)
//! but not an error model: `covenant-sem` accumulates diagnostics and
//! never aborts mid-check, while a `verify` call can fail outright
//! (malformed test data, an unknown behavior name) the same way
//! `covenant_util::error` treats its own boundary failures, before ever
//! producing a report.
//!
//! Pipeline, in dependency order:
//!
//! 1. [`value`] - the runtime [`value::Value`] union every other module
//!    passes around.
//! 2. [`env`] - [`env::Environment`] (what the evaluator reads) and
//!    [`env::Bindings`] (what the verifier threads through one
//!    behavior's checks).
//! 3. [`json`] - the JSON/`Value` boundary conversion test data and
//!    target functions both cross.
//! 4. [`eval`] - the expression evaluator.
//! 5. [`sandbox`] - the timed-execution wrapper a dynamic target
//!    invocation runs inside.
//! 6. [`scenario`] - drives one `given`/`when`/`then` block.
//! 7. [`verifier`] - orchestrates all of the above into a
//!    [`verifier::VerificationReport`].

pub mod env;
pub mod error;
pub mod eval;
pub mod json;
pub mod sandbox;
pub mod scenario;
pub mod value;
pub mod verifier;

pub use env::{Bindings, EffectHandler, Environment};
pub use error::{Result, RuntimeError, VerifyError};
pub use eval::Evaluator;
pub use sandbox::{run_with_timeout, Outcome};
pub use scenario::{ScenarioResult, ScenarioRunner, ScenarioState, StepResult, StepStatus, ThenResult};
pub use value::Value;
pub use verifier::{
    verify, verify_with_config, BehaviorResult, BehaviorTestData, BindingsSpec, ExpectedError, ExpectedOutcome,
    PredicateResult, PredicateStatus, ScenarioTestData, Summary, TargetFunction, TestData, VerificationMode,
    VerificationReport, VerifierConfig,
};
