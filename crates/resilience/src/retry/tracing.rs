//! Structured logging for retry operations
//!
//! Events go through the `tracing` crate so the host application decides
//! where they end up. Per-retry warnings and the exhaustion warning follow
//! the policy's `log_retries` flag; everything else is emitted at debug
//! level regardless.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FailureKind;
use crate::retry::RetryPolicy;

/// Logging scope for one invocation of a retried operation
pub struct RetrySpan<'a> {
    operation: &'a str,
    max_attempts: u32,
    log_retries: bool,
}

impl<'a> RetrySpan<'a> {
    /// Start a span for `operation` under `policy`
    pub fn start(operation: &'a str, policy: &RetryPolicy) -> Self {
        debug!(
            operation = operation,
            max_attempts = policy.max_attempts(),
            "Starting retry operation"
        );

        Self { operation, max_attempts: policy.max_attempts(), log_retries: policy.log_retries() }
    }

    /// Record a failed attempt that will be retried after `wait`
    ///
    /// `attempt` is 1-based.
    pub fn record_retry(&self, attempt: u32, error: &dyn fmt::Display, wait: Duration) {
        if !self.log_retries {
            return;
        }
        warn!(
            operation = %self.operation,
            attempt = attempt,
            max_attempts = self.max_attempts,
            wait_ms = wait.as_millis() as u64,
            "Attempt {attempt} failed: {error}. Retrying in {:.2} seconds...",
            wait.as_secs_f64()
        );
    }

    /// Record a successful invocation
    pub fn record_success(&self, attempts: u32, total_delay: Duration) {
        debug!(
            operation = %self.operation,
            attempts = attempts,
            total_delay_ms = total_delay.as_millis() as u64,
            "Retry operation succeeded"
        );
    }

    /// Record a failure whose kind is outside the retryable set
    pub fn record_non_retryable(&self, attempt: u32, kind: FailureKind, error: &dyn fmt::Display) {
        debug!(
            operation = %self.operation,
            attempt = attempt,
            kind = %kind,
            error = %error,
            "Non-retryable failure, giving up"
        );
    }

    /// Record that all attempts have been exhausted
    pub fn record_exhausted(&self, attempts: u32, total_delay: Duration, error: &dyn fmt::Display) {
        if self.log_retries {
            warn!(
                operation = %self.operation,
                attempts = attempts,
                total_delay_ms = total_delay.as_millis() as u64,
                error = %error,
                "All retry attempts exhausted"
            );
        } else {
            debug!(
                operation = %self.operation,
                attempts = attempts,
                error = %error,
                "All retry attempts exhausted"
            );
        }
    }

    /// Record that cancellation stopped the loop
    pub fn record_cancelled(&self, attempts: u32) {
        debug!(operation = %self.operation, attempts = attempts, "Retry operation cancelled");
    }
}
