//! Shared helpers for retry integration tests.

use sqlretry_core::retry::{DbError, ErrorKind};
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Scripted operation: fails `failures` times, then returns `"ok"`.
/// Records when each call happened so tests can inspect the backoff gaps.
pub struct FlakyOp {
    failures: u32,
    make_error: fn(u32) -> DbError,
    calls: AtomicU32,
    started: Mutex<Vec<Instant>>,
}

impl FlakyOp {
    pub fn new(failures: u32, make_error: fn(u32) -> DbError) -> Self {
        Self {
            failures,
            make_error,
            calls: AtomicU32::new(0),
            started: Mutex::new(Vec::new()),
        }
    }

    /// Never succeeds.
    pub fn always(make_error: fn(u32) -> DbError) -> Self {
        Self::new(u32::MAX, make_error)
    }

    pub fn call(&self) -> Result<&'static str, DbError> {
        self.started.lock().unwrap().push(Instant::now());
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failures {
            Err((self.make_error)(n))
        } else {
            Ok("ok")
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Time between consecutive calls, in seconds.
    pub fn gaps(&self) -> Vec<f64> {
        let started = self.started.lock().unwrap();
        started
            .windows(2)
            .map(|w| (w[1] - w[0]).as_secs_f64())
            .collect()
    }
}

/// Driver error carrying a lost-connection socket cause.
pub fn connection_lost(n: u32) -> DbError {
    DbError::new(ErrorKind::Database, format!("server closed the connection (#{n})"))
        .caused_by(io::Error::from(io::ErrorKind::ConnectionReset))
}

/// Operational error with no nested cause.
pub fn operational(n: u32) -> DbError {
    DbError::new(ErrorKind::Operational, format!("lock wait timeout (#{n})"))
}

/// Caller mistake; never worth retrying.
pub fn syntax_error(_n: u32) -> DbError {
    DbError::new(ErrorKind::Programming, "syntax error at or near \"SELEC\"")
}

pub fn application(_n: u32) -> DbError {
    DbError::new(ErrorKind::Application, "validation failed")
}
