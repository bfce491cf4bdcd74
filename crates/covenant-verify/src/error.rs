//! Error types for the contract verifier.
//!
//! Grounded on the pattern in `covenant_util::error`: one `thiserror`
//! enum per concern, `#[from]` conversions at the boundaries, a `Result`
//! alias. Diagnostics from `covenant-sem` are a different animal (they
//! accumulate in a `Handler` and never abort); these are genuine fatal
//! failures per §7 ("Structural" errors): malformed test data, a missing
//! target function, a spec that cannot be found.

use thiserror::Error;

/// A fatal failure that aborts a `verify` call before any
/// `VerificationReport` can be produced.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed test data: {0}")]
    MalformedTestData(String),

    #[error("test data names behavior `{0}`, which the domain does not declare")]
    UnknownBehavior(String),

    #[error("failed to parse test data JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("target function `{0}` could not be located")]
    TargetNotFound(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;

/// A non-fatal failure recorded against one predicate, target
/// invocation, or scenario step rather than aborting the whole verify
/// run (§7, "Runtime evaluation" / "Target invocation error").
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("type error: expected {expected}, found {found}")]
    TypeError { expected: String, found: String },

    #[error("undefined name `{0}`")]
    UndefinedName(String),

    #[error("no field `{field}` on value of type {ty}")]
    NoSuchField { field: String, ty: String },

    #[error("index out of bounds: {index} (length {length})")]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("collection exceeds the bound on quantifier iteration ({0} items)")]
    CollectionTooLarge(usize),

    #[error("evaluation exceeded the recursion depth limit")]
    RecursionLimitExceeded,

    #[error("target invocation failed: {0}")]
    TargetInvocation(String),

    #[error("target invocation timed out")]
    Timeout,
}
