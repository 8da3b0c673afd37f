//! What a wrapped operation writes to the log, captured through a scoped
//! subscriber. TRACE is filtered out, as it is under the default filter.

mod common;

use common::FlakyOp;
use sqlretry_core::retry::{DbError, ErrorKind, KindSet, RetryPolicy};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Runs `f` under a DEBUG-level subscriber and returns everything it logged.
/// The policy must be built inside `f` so its span belongs to that subscriber.
fn logged<F: FnOnce()>(f: F) -> String {
    let out = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(out.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    out.text()
}

fn operational_policy(timeout: f64) -> sqlretry_core::retry::RetryWrapper<DbError> {
    RetryPolicy::<DbError>::builder()
        .timeout_secs(timeout)
        .initial_delay_secs(0.01)
        .max_delay_secs(0.02)
        .retryable_kinds(KindSet::new().with(ErrorKind::Operational))
        .build()
        .unwrap()
}

#[test]
fn first_attempt_success_logs_nothing() {
    let text = logged(|| {
        let retry = operational_policy(5.0);
        assert_eq!(retry.call(|| Ok::<_, DbError>(1)).unwrap(), 1);
    });
    assert_eq!(text, "");
}

#[test]
fn non_retryable_failure_logs_nothing() {
    let text = logged(|| {
        let retry = operational_policy(5.0);
        let op = FlakyOp::always(common::syntax_error);
        assert!(retry.call(|| op.call()).is_err());
        assert_eq!(op.calls(), 1);
    });
    assert_eq!(text, "");
}

#[test]
fn exhaustion_logs_one_warning_with_attempts_and_elapsed() {
    let text = logged(|| {
        let retry = operational_policy(0.1);
        let op = FlakyOp::always(common::operational);
        assert!(retry.call(|| op.call()).is_err());
    });
    let gave_up: Vec<&str> = text
        .lines()
        .filter(|l| l.contains("retry timeout exhausted"))
        .collect();
    assert_eq!(gave_up.len(), 1, "{text}");
    let line = gave_up[0];
    assert!(line.contains("WARN"), "{line}");
    assert!(line.contains("attempts="), "{line}");
    assert!(line.contains("elapsed_ms="), "{line}");
}

#[test]
fn only_first_backoff_is_a_warning() {
    let text = logged(|| {
        let retry = operational_policy(5.0);
        let op = FlakyOp::new(3, common::operational);
        assert_eq!(retry.call(|| op.call()).unwrap(), "ok");
    });
    let backoffs: Vec<&str> = text.lines().filter(|l| l.contains("backing off")).collect();
    assert_eq!(backoffs.len(), 3, "{text}");
    assert!(backoffs[0].contains("WARN"), "{}", backoffs[0]);
    for line in &backoffs[1..] {
        assert!(line.contains("DEBUG"), "{line}");
        assert!(!line.contains("WARN"), "{line}");
    }
    assert!(text
        .lines()
        .any(|l| l.contains("INFO") && l.contains("succeeded after retry")));
}
