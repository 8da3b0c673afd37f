use super::cancel::CancelToken;
use super::classify::{self, CallContext, Classifier};
use super::error::ConfigError;
use super::kind::{DriverFailure, KindSet};
use super::wrapper::RetryWrapper;
use crate::config::RetryConfig;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: f64 = 300.0;
pub const DEFAULT_INITIAL_DELAY_SECS: f64 = 0.1;
pub const DEFAULT_MAX_DELAY_SECS: f64 = 10.0;

/// Validated, immutable retry configuration.
///
/// Built once through [`RetryPolicyBuilder`] and shared by every call made
/// through the resulting [`RetryWrapper`]. Nothing here changes per call.
pub struct RetryPolicy<E> {
    timeout: Duration,
    initial_delay: Duration,
    max_delay: Duration,
    kinds: KindSet,
    classifier: Option<Classifier<E>>,
    span: tracing::Span,
    cancel: Option<CancelToken>,
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("timeout", &self.timeout)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("kinds", &self.kinds)
            .field("classifier", &self.classifier.as_ref().map(|_| "<fn>"))
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl<E: DriverFailure> RetryPolicy<E> {
    pub fn builder() -> RetryPolicyBuilder<E> {
        RetryPolicyBuilder::new()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn kinds(&self) -> &KindSet {
        &self.kinds
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Span every retry event is attached to.
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub(crate) fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    /// Backoff schedule: `initial, min(2*initial, max), min(4*initial, max), ...`.
    pub fn delays(&self) -> Backoff {
        Backoff {
            next: self.initial_delay,
            max: self.max_delay,
        }
    }

    pub fn is_retryable(&self, err: &E, ctx: &CallContext) -> bool {
        classify::is_retryable(err, ctx, &self.kinds, self.classifier.as_ref())
    }
}

/// Endless iterator over backoff delays, doubling up to a cap.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = current.saturating_mul(2).min(self.max);
        Some(current)
    }
}

/// Seconds to a `Duration`, saturating at `Duration::MAX` (so infinity means
/// "no limit"). `None` for NaN and negative values.
fn secs_to_duration(secs: f64) -> Option<Duration> {
    if secs.is_nan() || secs < 0.0 {
        return None;
    }
    if secs >= Duration::MAX.as_secs_f64() {
        return Some(Duration::MAX);
    }
    Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
}

enum ClassifierChoice<E> {
    /// Socket-cause detector when kinds are defaulted, nothing otherwise.
    Default,
    Disabled,
    Custom(Classifier<E>),
}

/// Factory for [`RetryWrapper`]s. Validation happens in [`build`](Self::build),
/// before anything is wrapped.
pub struct RetryPolicyBuilder<E> {
    timeout_secs: f64,
    initial_delay_secs: f64,
    max_delay_secs: f64,
    kinds: Option<KindSet>,
    classifier: ClassifierChoice<E>,
    span: Option<tracing::Span>,
    cancel: Option<CancelToken>,
}

impl<E: DriverFailure> Default for RetryPolicyBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DriverFailure> RetryPolicyBuilder<E> {
    pub fn new() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            initial_delay_secs: DEFAULT_INITIAL_DELAY_SECS,
            max_delay_secs: DEFAULT_MAX_DELAY_SECS,
            kinds: None,
            classifier: ClassifierChoice::Default,
            span: None,
            cancel: None,
        }
    }

    /// Seed a builder from the `[retry]` section of the config file.
    pub fn from_config(cfg: &RetryConfig) -> Self {
        let builder = Self::new()
            .timeout_secs(cfg.timeout_secs)
            .initial_delay_secs(cfg.initial_delay_secs)
            .max_delay_secs(cfg.max_delay_secs);
        match &cfg.retryable_kinds {
            Some(kinds) => builder.retryable_kinds(kinds.iter().copied().collect()),
            None => builder,
        }
    }

    /// How long after the first attempt retries are still allowed. `0` means
    /// a single attempt.
    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn initial_delay_secs(mut self, secs: f64) -> Self {
        self.initial_delay_secs = secs;
        self
    }

    pub fn max_delay_secs(mut self, secs: f64) -> Self {
        self.max_delay_secs = secs;
        self
    }

    /// Replace the default "any driver error" set. Unless a classifier is also
    /// given, kind membership alone then decides.
    pub fn retryable_kinds(mut self, kinds: KindSet) -> Self {
        self.kinds = Some(kinds);
        self
    }

    /// Narrow eligible failures further; only consulted for failures whose
    /// kind is already retryable.
    pub fn classifier<F>(mut self, f: F) -> Self
    where
        F: Fn(&E, &CallContext) -> bool + Send + Sync + 'static,
    {
        self.classifier = ClassifierChoice::Custom(Arc::new(f));
        self
    }

    /// Drop the default socket-cause classifier.
    pub fn without_classifier(mut self) -> Self {
        self.classifier = ClassifierChoice::Disabled;
        self
    }

    /// Span retry events are recorded under. Defaults to a `sqlretry` span
    /// created in [`build`](Self::build), so logging must be initialized first.
    pub fn span(mut self, span: tracing::Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn build(self) -> Result<RetryWrapper<E>, ConfigError> {
        let timeout = secs_to_duration(self.timeout_secs)
            .ok_or(ConfigError::InvalidTimeout(self.timeout_secs))?;
        let initial_delay = secs_to_duration(self.initial_delay_secs)
            .filter(|d| !d.is_zero())
            .ok_or(ConfigError::InvalidInitialDelay(self.initial_delay_secs))?;
        let max_delay = secs_to_duration(self.max_delay_secs)
            .ok_or(ConfigError::InvalidMaxDelay(self.max_delay_secs))?;
        if initial_delay > max_delay {
            return Err(ConfigError::DelayOrder {
                initial: self.initial_delay_secs,
                max: self.max_delay_secs,
            });
        }

        let (kinds, classifier) = match (self.kinds, self.classifier) {
            (None, ClassifierChoice::Default) => {
                (KindSet::any_driver(), Some(classify::socket_classifier()))
            }
            (None, ClassifierChoice::Disabled) => (KindSet::any_driver(), None),
            (None, ClassifierChoice::Custom(c)) => (KindSet::any_driver(), Some(c)),
            (Some(kinds), ClassifierChoice::Custom(c)) => (kinds, Some(c)),
            (Some(kinds), _) => (kinds, None),
        };

        let span = self
            .span
            .unwrap_or_else(|| tracing::info_span!(target: "sqlretry", "sql_retry"));

        Ok(RetryWrapper::new(RetryPolicy {
            timeout,
            initial_delay,
            max_delay,
            kinds,
            classifier,
            span,
            cancel: self.cancel,
        }))
    }
}
