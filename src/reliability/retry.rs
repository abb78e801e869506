//! Retry with exponential backoff, built on `backon`.
//!
//! The harness retries exactly one thing: connecting to a server that was
//! just spawned and may not be listening yet. Errors are classified by
//! [`is_transient_io_error`]; anything else ends the retry loop at once.

use backon::{BackoffBuilder, ExponentialBuilder, Retryable};
use std::future::Future;
use std::io;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ReadinessConfig;

const BACKOFF_FACTOR: f32 = 2.0;

/// Backoff schedule: `initial_delay` doubling up to `max_delay`, for at most
/// `max_retries` retries after the first attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryConfig {
    #[must_use]
    pub const fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
        }
    }

    /// The delays slept between attempts, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        self.builder().build()
    }

    /// Total time spent sleeping if every retry is used.
    #[must_use]
    pub fn worst_case_wait(&self) -> Duration {
        self.delays().sum()
    }

    fn builder(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries as usize)
            .with_factor(BACKOFF_FACTOR)
    }
}

impl From<&ReadinessConfig> for RetryConfig {
    fn from(readiness: &ReadinessConfig) -> Self {
        Self::new(
            readiness.max_retries,
            Duration::from_millis(readiness.initial_delay_ms),
            Duration::from_millis(readiness.max_delay_ms),
        )
    }
}

/// Run `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or the schedule is exhausted. Returns the last error in the
/// latter two cases.
pub async fn retry_async<F, Fut, T, E, R>(
    config: RetryConfig,
    operation: F,
    should_retry: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let result = operation
        .retry(config.builder())
        .when(|e| should_retry(e))
        .notify(|err: &E, delay: Duration| {
            debug!(delay_ms = delay.as_millis() as u64, error = %err, "Retrying");
        })
        .await;

    if let Err(e) = &result {
        warn!(max_retries = config.max_retries, error = %e, "Retries exhausted");
    }
    result
}

/// Errors a connect to a server that is still starting up can produce.
#[must_use]
pub fn is_transient_io_error(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::TimedOut
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::AddrNotAvailable
    )
}
