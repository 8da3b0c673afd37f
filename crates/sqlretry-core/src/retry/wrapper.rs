use super::kind::DriverFailure;
use super::policy::RetryPolicy;
use super::run::{run_filtered, run_with_retry};
use std::fmt;
use std::sync::Arc;

/// A retry policy ready to be applied to database operations.
///
/// Cheap to clone; every clone shares the same immutable [`RetryPolicy`], so
/// one wrapper can serve any number of operations and threads.
///
/// ```no_run
/// use sqlretry_core::retry::{DbError, ErrorKind, RetryPolicy};
///
/// let retry = RetryPolicy::<DbError>::builder().timeout_secs(30.0).build()?;
/// let job_info = retry.wrap(|job_id: i64| -> Result<String, DbError> {
///     Err(DbError::new(ErrorKind::Programming, format!("no job {job_id}")))
/// });
/// assert!(job_info(7).is_err());
/// # Ok::<(), sqlretry_core::retry::ConfigError>(())
/// ```
pub struct RetryWrapper<E> {
    policy: Arc<RetryPolicy<E>>,
}

impl<E> Clone for RetryWrapper<E> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
        }
    }
}

impl<E> fmt::Debug for RetryWrapper<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryWrapper")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<E: DriverFailure> RetryWrapper<E> {
    pub(crate) fn new(policy: RetryPolicy<E>) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &RetryPolicy<E> {
        &self.policy
    }

    /// Run `op` once under the retry policy.
    pub fn call<T, F>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        run_with_retry(&self.policy, op)
    }

    /// Wrap `op` into a function with the same input and output that retries
    /// transient failures. The argument is cloned for each attempt; pass a
    /// tuple for several arguments.
    ///
    /// `op` may run several times per call, so it must be idempotent.
    pub fn wrap<A, T, F>(&self, op: F) -> impl Fn(A) -> Result<T, E>
    where
        A: Clone,
        F: Fn(A) -> Result<T, E>,
    {
        let policy = Arc::clone(&self.policy);
        move |args: A| run_with_retry(&policy, || op(args.clone()))
    }

    /// Like [`wrap`](Self::wrap), but `filter` also sees the call's argument.
    ///
    /// The filter runs after the policy's own kind and classifier checks, so it
    /// can stop a retry for particular arguments but never add one.
    pub fn wrap_with_filter<A, T, F, P>(&self, op: F, filter: P) -> impl Fn(A) -> Result<T, E>
    where
        A: Clone,
        F: Fn(A) -> Result<T, E>,
        P: Fn(&E, &A) -> bool,
    {
        let policy = Arc::clone(&self.policy);
        move |args: A| run_filtered(&policy, || op(args.clone()), |err, _| filter(err, &args))
    }
}
