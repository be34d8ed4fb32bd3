//! Per-invocation attempt state shared by both executor variants
//!
//! The blocking and async executors drive the same [`AttemptState`]: it
//! classifies each failure, decides between "retry after this wait" and
//! "stop with this error", and records the waits actually slept. The
//! variants only differ in how they suspend between attempts.

use std::fmt;
use std::time::Duration;

use crate::error::ClassifyFailure;
use crate::retry::backoff;
use crate::retry::error::{RetryError, RetryResult};
use crate::retry::tracing::RetrySpan;
use crate::retry::RetryPolicy;

/// What the executor does after a failed attempt
#[derive(Debug)]
pub(crate) enum Step<E> {
    /// Suspend for the wait, then invoke the operation again
    Backoff(Duration),
    /// Surface this error to the caller
    Stop(RetryError<E>),
}

/// Attempt counter and captured failure for a single invocation
///
/// Never shared: each call to an executor builds its own.
pub(crate) struct AttemptState<'a, E> {
    policy: &'a RetryPolicy,
    span: RetrySpan<'a>,
    /// 0-based index of the attempt currently running
    attempt: u32,
    /// Operation invocations so far
    invocations: u32,
    delays: Vec<Duration>,
    last_error: Option<E>,
    last_error_summary: Option<String>,
}

impl<'a, E> AttemptState<'a, E>
where
    E: ClassifyFailure + fmt::Display,
{
    pub(crate) fn new(policy: &'a RetryPolicy, operation: &'a str) -> Self {
        Self {
            policy,
            span: RetrySpan::start(operation, policy),
            attempt: 0,
            invocations: 0,
            delays: Vec::new(),
            last_error: None,
            last_error_summary: None,
        }
    }

    /// Record that the operation is about to be invoked
    pub(crate) fn begin_attempt(&mut self) {
        self.invocations += 1;
    }

    /// Classify a failure and decide what happens next
    pub(crate) fn on_failure(&mut self, error: E) -> Step<E> {
        let kind = error.failure_kind();
        self.last_error_summary = Some(error.to_string());

        if !self.policy.is_retryable(kind) {
            self.span.record_non_retryable(self.invocations, kind, &error);
            self.last_error = None;
            return Step::Stop(RetryError::NonRetryable {
                attempts: self.invocations,
                source: error,
            });
        }

        if self.attempt >= self.policy.max_retries() {
            self.span.record_exhausted(self.invocations, self.total_delay(), &error);
            self.last_error = None;
            return Step::Stop(RetryError::Exhausted { attempts: self.invocations, source: error });
        }

        let wait = backoff::next_wait(self.policy, self.attempt);
        self.span.record_retry(self.attempt + 1, &error, wait);
        self.last_error = Some(error);
        Step::Backoff(wait)
    }

    /// Record a completed suspension and move to the next attempt
    pub(crate) fn after_backoff(&mut self, wait: Duration) {
        self.delays.push(wait);
        self.attempt += 1;
    }

    /// Stop because cancellation fired; keeps the last captured failure
    pub(crate) fn cancelled(&mut self) -> RetryError<E> {
        self.span.record_cancelled(self.invocations);
        RetryError::Cancelled { attempts: self.invocations, last_error: self.last_error.take() }
    }

    pub(crate) fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }

    /// Build the outcome; logs success when the result is `Ok`
    pub(crate) fn finish<T>(self, result: RetryResult<T, E>) -> RetryOutcome<T, E> {
        if result.is_ok() {
            self.span.record_success(self.invocations, self.total_delay());
        }
        RetryOutcome {
            result,
            attempts: self.invocations,
            delays: self.delays,
            last_error: self.last_error_summary,
        }
    }
}

/// Outcome of a retry execution including result and summary statistics
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    /// Final result of the invocation
    pub result: RetryResult<T, E>,
    /// Number of times the operation was invoked
    pub attempts: u32,
    /// Waits slept between attempts, in order
    pub delays: Vec<Duration>,
    /// Human-readable representation of the last failure, if any
    pub last_error: Option<String>,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }

    /// Sum of all waits
    pub fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }

    /// Number of retries performed (attempts after the first)
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    /// Whether the operation eventually succeeded
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the shared attempt state machine.
    use super::*;
    use crate::error::{CommonError, FailureKind};

    fn deterministic(max_retries: u32) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(max_retries)
            .min_wait(Duration::from_secs(1))
            .max_wait(Duration::from_secs(10))
            .no_jitter()
            .retry_on([FailureKind::Network])
            .build()
            .expect("valid policy")
    }

    #[test]
    fn test_retryable_failure_backs_off_then_exhausts() {
        let policy = deterministic(2);
        let mut state = AttemptState::new(&policy, "unit");

        state.begin_attempt();
        match state.on_failure(CommonError::network("svc", "first")) {
            Step::Backoff(wait) => {
                assert_eq!(wait, Duration::from_secs(1));
                state.after_backoff(wait);
            }
            Step::Stop(err) => panic!("unexpected stop: {err}"),
        }

        state.begin_attempt();
        match state.on_failure(CommonError::network("svc", "second")) {
            Step::Backoff(wait) => {
                assert_eq!(wait, Duration::from_secs(2));
                state.after_backoff(wait);
            }
            Step::Stop(err) => panic!("unexpected stop: {err}"),
        }

        state.begin_attempt();
        match state.on_failure(CommonError::network("svc", "third")) {
            Step::Stop(RetryError::Exhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert_eq!(source, CommonError::network("svc", "third"));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(state.total_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_non_retryable_failure_stops_immediately() {
        let policy = deterministic(5);
        let mut state = AttemptState::new(&policy, "unit");

        state.begin_attempt();
        match state.on_failure(CommonError::validation("query", "empty")) {
            Step::Stop(RetryError::NonRetryable { attempts, .. }) => assert_eq!(attempts, 1),
            other => panic!("expected non-retryable stop, got {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_carries_last_failure() {
        let policy = deterministic(3);
        let mut state = AttemptState::new(&policy, "unit");

        state.begin_attempt();
        assert!(matches!(state.on_failure(CommonError::network("svc", "down")), Step::Backoff(_)));

        match state.cancelled() {
            RetryError::Cancelled { attempts, last_error } => {
                assert_eq!(attempts, 1);
                assert_eq!(last_error, Some(CommonError::network("svc", "down")));
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[test]
    fn test_finish_reports_statistics() {
        let policy = deterministic(1);
        let mut state = AttemptState::new(&policy, "unit");

        state.begin_attempt();
        if let Step::Backoff(wait) = state.on_failure(CommonError::network("svc", "blip")) {
            state.after_backoff(wait);
        }
        state.begin_attempt();

        let outcome = state.finish::<u8>(Ok(7));
        assert!(outcome.succeeded());
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.retries(), 1);
        assert_eq!(outcome.delays, vec![Duration::from_secs(1)]);
        assert_eq!(outcome.last_error.as_deref(), Some("Network error from 'svc': blip"));
        assert_eq!(outcome.into_result().ok(), Some(7));
    }
}
