//! Error types owned by the retry module.

use super::kind::{DriverFailure, ErrorKind};
use std::io;
use thiserror::Error;

/// Invalid retry configuration, reported by `RetryPolicyBuilder::build`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("timeout must be a non-negative number of seconds (got {0})")]
    InvalidTimeout(f64),
    #[error("initial delay must be a positive number of seconds (got {0})")]
    InvalidInitialDelay(f64),
    #[error("max delay must be a non-negative number of seconds (got {0})")]
    InvalidMaxDelay(f64),
    #[error("initial delay {initial}s exceeds max delay {max}s")]
    DelayOrder { initial: f64, max: f64 },
}

/// Tagged driver error for drivers that report failures as plain data.
///
/// The optional `cause` carries the low-level I/O error (if any) that the
/// driver wrapped, so classification can match on it instead of on the
/// outer kind.
#[derive(Debug, Error)]
#[error("{kind:?} error: {message}")]
pub struct DbError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub cause: Option<io::Error>,
}

impl DbError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying I/O failure.
    pub fn caused_by(mut self, cause: io::Error) -> Self {
        self.cause = Some(cause);
        self
    }
}

impl DriverFailure for DbError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}
