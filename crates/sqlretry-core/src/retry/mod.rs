//! Timeout-bounded retry and backoff for database operations.
//!
//! A [`RetryPolicyBuilder`] validates the configuration and produces a
//! [`RetryWrapper`]. Operations run through the wrapper are retried with
//! capped exponential backoff while their failures classify as transient,
//! until the wall-clock timeout measured from the first attempt runs out.
//! Callers always get back their own error type, never a wrapper error.

mod cancel;
mod classify;
mod error;
mod kind;
mod policy;
mod run;
mod wrapper;

pub use cancel::CancelToken;
pub use classify::{is_retryable, is_socket_failure, socket_classifier, CallContext, Classifier};
pub use error::{ConfigError, DbError};
pub use kind::{DriverFailure, ErrorKind, KindSet};
pub use policy::{
    Backoff, RetryPolicy, RetryPolicyBuilder, DEFAULT_INITIAL_DELAY_SECS, DEFAULT_MAX_DELAY_SECS,
    DEFAULT_TIMEOUT_SECS,
};
pub use run::{run_with_retry, RetryAttempt};
pub use wrapper::RetryWrapper;
