//! Decide whether a failure is transient.

use super::kind::{DriverFailure, KindSet};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// What the classifier knows about the call that just failed.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    /// 0-based number of the attempt that produced the failure.
    pub attempt: u32,
    /// Time since the first attempt started.
    pub elapsed: Duration,
}

/// Predicate that narrows kind-based eligibility using the failure's contents.
pub type Classifier<E> = Arc<dyn Fn(&E, &CallContext) -> bool + Send + Sync>;

/// Kind membership gates; the classifier (if any) only narrows further.
/// A failure whose kind is outside `kinds` is never retried, whatever the
/// classifier would say.
pub fn is_retryable<E: DriverFailure>(
    err: &E,
    ctx: &CallContext,
    kinds: &KindSet,
    classifier: Option<&Classifier<E>>,
) -> bool {
    if !kinds.contains(err.kind()) {
        return false;
    }
    classifier.map_or(true, |c| c(err, ctx))
}

/// Socket-level I/O kinds that signal a lost or unreachable server.
fn is_socket_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::UnexpectedEof
    )
}

/// True when `err` or anything in its source chain is a socket-level
/// `io::Error`.
pub fn is_socket_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if is_socket_kind(io_err.kind()) {
                return true;
            }
        }
        current = e.source();
    }
    false
}

/// Classifier used when no explicit kind set is configured: retry driver
/// errors only when they wrap a socket failure.
pub fn socket_classifier<E: DriverFailure>() -> Classifier<E> {
    Arc::new(|err: &E, _ctx: &CallContext| is_socket_failure(err))
}
