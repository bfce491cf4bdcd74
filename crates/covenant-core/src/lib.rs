//! covenant-core - Facade and Session Orchestration
//!
//! Plays the role `faxc-drv` plays for the full compiler: a single entry
//! point that sequences the phases other crates expose, without owning
//! any of their logic. There is no codegen pipeline here, so the
//! sequencing is short: `check` a [`Domain`], and optionally `verify` it
//! against test data once it checks clean. A [`Session`] just carries the
//! two downstream crates' config structs so a caller sets them once
//! instead of threading them through every call.
//!
//! Where `covenant-sem` and `covenant-verify` each keep their own error
//! model (an accumulating `Handler` for the former, a fatal `thiserror`
//! enum for the latter), this crate is the one place that collapses both
//! into a single blanket `anyhow::Error` — the role `anyhow` plays at
//! `faxc`'s binary boundary, carried here even though this crate has no
//! binary of its own.

use std::sync::Arc;

use covenant_ast::Domain;
use covenant_sem::{CheckerConfig, TypeCheckResult};
use covenant_verify::{TargetFunction, TestData, VerificationMode, VerificationReport, VerifierConfig};
use thiserror::Error;
use tracing::debug_span;

/// A fatal failure that stops a [`Session`] short of producing a report,
/// as distinct from a failed *check* or *verify* (those still produce a
/// result, just one with `success`/`passed` set to `false`).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("domain failed static checks ({diagnostic_count} diagnostic(s)); verification was not attempted")]
    CheckFailed { diagnostic_count: usize },

    #[error(transparent)]
    Verify(#[from] covenant_verify::VerifyError),
}

/// Blanket result alias for this crate's public surface (see module docs).
pub type Result<T> = anyhow::Result<T>;

/// The two downstream crates' config structs, gathered so a caller
/// builds them once per [`Session`] instead of per call. Not read from
/// environment or file: populating this from TOML/CLI flags is left to
/// whatever binary eventually wraps this crate (out of scope here).
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreConfig {
    pub checker: CheckerConfig,
    pub verifier: VerifierConfig,
}

/// The combined result of checking and, if the domain checked clean,
/// verifying it.
#[derive(Debug)]
pub struct CombinedReport {
    pub check: TypeCheckResult,
    pub verify: Option<VerificationReport>,
}

/// One orchestration session over a [`CoreConfig`]. Stateless beyond the
/// config itself: a `Session` can be reused across many domains.
#[derive(Debug, Clone, Copy, Default)]
pub struct Session {
    config: CoreConfig,
}

impl Session {
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Run static checking only (§4.4's eight phases).
    pub fn check(&self, domain: &Domain) -> TypeCheckResult {
        let _span = debug_span!("check", domain = %domain.name.as_str()).entered();
        covenant_sem::check_with_config(domain, self.config.checker)
    }

    /// Run `verify` directly, without a preceding `check`. Useful when
    /// the caller already knows the domain checks clean (e.g. it just
    /// called [`Session::check`] itself) and doesn't want to pay for a
    /// second pass.
    pub async fn verify(
        &self,
        domain: &Domain,
        test_data: &TestData,
        target: Option<Arc<dyn TargetFunction>>,
        mode: VerificationMode,
    ) -> Result<VerificationReport> {
        let _span = debug_span!("verify", domain = %domain.name.as_str(), mode = ?mode).entered();
        let report = covenant_verify::verify_with_config(domain, test_data, target, mode, self.config.verifier).await?;
        Ok(report)
    }

    /// Check, then verify only if the check found no errors — mirroring
    /// a compiler driver that does not run later phases once an earlier
    /// one has already failed (`faxc-drv::Session::compile`'s
    /// `read_sources` → `run_pipeline` → `emit_output` sequencing, each
    /// step short-circuiting the next on error).
    pub async fn check_and_verify(
        &self,
        domain: &Domain,
        test_data: &TestData,
        target: Option<Arc<dyn TargetFunction>>,
        mode: VerificationMode,
    ) -> Result<CombinedReport> {
        let check = self.check(domain);
        if !check.success {
            return Err(CoreError::CheckFailed { diagnostic_count: check.diagnostics.len() }.into());
        }
        let verify = self.verify(domain, test_data, target, mode).await?;
        Ok(CombinedReport { check, verify: Some(verify) })
    }
}
