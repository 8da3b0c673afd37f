//! Retry loop: run a closure until success, a non-retryable failure, or timeout.

use super::classify::CallContext;
use super::kind::DriverFailure;
use super::policy::RetryPolicy;
use std::time::{Duration, Instant};

/// One failed attempt, as reported in the retry log.
#[derive(Debug)]
pub struct RetryAttempt<'a, E> {
    /// 0-based attempt number.
    pub attempt: u32,
    pub elapsed: Duration,
    /// Sleep chosen before the next attempt.
    pub delay: Duration,
    pub failure: &'a E,
}

/// Runs `f` until it succeeds or the policy says to stop.
///
/// Retryable failures are followed by a blocking backoff sleep, never past the
/// deadline. Once the timeout (measured from the first attempt) has elapsed,
/// the most recent failure is returned unchanged.
pub fn run_with_retry<E, T, F>(policy: &RetryPolicy<E>, f: F) -> Result<T, E>
where
    E: DriverFailure,
    F: FnMut() -> Result<T, E>,
{
    run_filtered(policy, f, |_, _| true)
}

/// Like [`run_with_retry`], with a per-call filter that can only veto
/// failures the policy already considers retryable.
pub(crate) fn run_filtered<E, T, F, P>(policy: &RetryPolicy<E>, mut f: F, accept: P) -> Result<T, E>
where
    E: DriverFailure,
    F: FnMut() -> Result<T, E>,
    P: Fn(&E, &CallContext) -> bool,
{
    let span = policy.span();
    let start = Instant::now();
    let mut delays = policy.delays();
    let mut attempt = 0u32;
    loop {
        tracing::trace!(parent: span, attempt, "calling database operation");
        let err = match f() {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(
                        parent: span,
                        attempts = attempt + 1,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "database operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        let elapsed = start.elapsed();
        let ctx = CallContext { attempt, elapsed };
        if !(policy.is_retryable(&err, &ctx) && accept(&err, &ctx)) {
            return Err(err);
        }

        if elapsed >= policy.timeout() {
            tracing::warn!(
                parent: span,
                attempts = attempt + 1,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %err,
                "retry timeout exhausted; giving up"
            );
            return Err(err);
        }

        if policy.cancel_token().is_some_and(|t| t.is_cancelled()) {
            tracing::warn!(
                parent: span,
                attempts = attempt + 1,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %err,
                "retry cancelled; giving up"
            );
            return Err(err);
        }

        let remaining = policy.timeout() - elapsed;
        let delay = delays.next().unwrap_or(policy.max_delay()).min(remaining);
        log_retry(
            span,
            &RetryAttempt {
                attempt,
                elapsed,
                delay,
                failure: &err,
            },
        );
        std::thread::sleep(delay);
        attempt += 1;
    }
}

/// The first backoff of a call is a WARN; later ones drop to DEBUG so a long
/// outage does not flood the log.
fn log_retry<E: DriverFailure>(span: &tracing::Span, a: &RetryAttempt<'_, E>) {
    let attempt = a.attempt + 1;
    let elapsed_ms = a.elapsed.as_millis() as u64;
    let delay_ms = a.delay.as_millis() as u64;
    let kind = a.failure.kind();
    if a.attempt == 0 {
        tracing::warn!(
            parent: span,
            attempt,
            elapsed_ms,
            delay_ms,
            ?kind,
            error = %a.failure,
            "retryable database failure; backing off"
        );
    } else {
        tracing::debug!(
            parent: span,
            attempt,
            elapsed_ms,
            delay_ms,
            ?kind,
            error = %a.failure,
            "retryable database failure; backing off"
        );
    }
}
