//! The sandboxed runner (§4.6): a uniform timed-execution wrapper.
//!
//! Single-threaded cooperative scheduling: a task yields only at an
//! explicit `await`. `run_with_timeout` races the task against a timer
//! built on `tokio::time::timeout`; on expiry the outcome is `Timeout`
//! and whatever the task eventually produces, if anything, is
//! discarded. Cancellation is cooperative, not forced: the runner
//! guarantees only that the *caller* is released at the deadline, not
//! that the task itself stops running.

use std::future::Future;
use std::time::{Duration, Instant};

/// The uniform outcome of one timed execution.
#[derive(Debug, Clone)]
pub enum Outcome<T, E> {
    Success(T, Duration),
    Failure(E, Duration),
    Timeout(Duration),
}

impl<T, E> Outcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(..))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Outcome::Timeout(..))
    }

    pub fn duration(&self) -> Duration {
        match self {
            Outcome::Success(_, d) | Outcome::Failure(_, d) | Outcome::Timeout(d) => *d,
        }
    }
}

/// Run `task` to completion or until `timeout_ms` elapses, whichever
/// comes first. `task` is a future rather than a plain closure so that
/// the one real suspension point in this crate, an async target
/// function invocation, can be awaited inside it.
pub async fn run_with_timeout<F, T, E>(task: F, timeout_ms: u64) -> Outcome<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let started = Instant::now();
    match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
        Ok(Ok(value)) => Outcome::Success(value, started.elapsed()),
        Ok(Err(error)) => Outcome::Failure(error, started.elapsed()),
        Err(_elapsed) => Outcome::Timeout(started.elapsed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fast_task_succeeds_before_timeout() {
        let outcome: Outcome<i32, String> = run_with_timeout(async { Ok(7) }, 1000).await;
        assert!(matches!(outcome, Outcome::Success(7, _)));
    }

    #[tokio::test]
    async fn test_slow_task_times_out() {
        let outcome: Outcome<i32, String> = run_with_timeout(
            async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(7)
            },
            20,
        )
        .await;
        assert!(outcome.is_timeout());
    }

    #[tokio::test]
    async fn test_failing_task_reports_failure_not_timeout() {
        let outcome: Outcome<i32, String> = run_with_timeout(async { Err("boom".to_string()) }, 1000).await;
        assert!(matches!(outcome, Outcome::Failure(ref msg, _) if msg == "boom"));
    }
}
