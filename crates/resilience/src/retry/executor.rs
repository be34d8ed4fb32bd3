//! Retry executor for blocking and async operations
//!
//! [`RetryExecutor`] borrows a [`RetryPolicy`] and drives an operation
//! through the shared attempt state machine. Two entry-point families exist:
//!
//! - [`execute`](RetryExecutor::execute) /
//!   [`execute_with_outcome`](RetryExecutor::execute_with_outcome): async,
//!   suspends with `tokio::time::sleep` between attempts.
//! - [`execute_blocking`](RetryExecutor::execute_blocking) /
//!   [`execute_blocking_with_outcome`](RetryExecutor::execute_blocking_with_outcome):
//!   blocks the calling thread through a [`BlockingSleep`].
//!
//! # Example
//!
//! ```no_run
//! use bizcomply_resilience::{CommonError, RetryPresets};
//!
//! # async fn fetch() -> Result<String, CommonError> { Ok(String::new()) }
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPresets::http();
//! let body = policy.executor().named("web_search").execute(fetch).await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::ClassifyFailure;
use crate::retry::attempt::{AttemptState, RetryOutcome, Step};
use crate::retry::error::RetryResult;
use crate::retry::sleep::{sleep_async, BlockingSleep, SleepStatus, ThreadSleep};
use crate::retry::RetryPolicy;

const DEFAULT_OPERATION_NAME: &str = "operation";

/// Runs operations under a retry policy
///
/// Cheap to build per call. The policy is borrowed, so one policy can back
/// any number of executors running concurrently.
#[derive(Debug, Clone)]
pub struct RetryExecutor<'p, S = ThreadSleep> {
    policy: &'p RetryPolicy,
    operation: String,
    cancel: Option<CancellationToken>,
    sleeper: S,
}

impl<'p> RetryExecutor<'p, ThreadSleep> {
    /// Create an executor that sleeps on the calling thread in blocking mode
    pub fn new(policy: &'p RetryPolicy) -> Self {
        Self {
            policy,
            operation: DEFAULT_OPERATION_NAME.to_string(),
            cancel: None,
            sleeper: ThreadSleep,
        }
    }
}

impl<'p, S> RetryExecutor<'p, S> {
    /// Name used in the `operation` field of every log event
    #[must_use]
    pub fn named(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Stop retrying once `token` is cancelled
    ///
    /// A pending backoff ends early and the call returns
    /// [`RetryError::Cancelled`](crate::retry::RetryError::Cancelled) with the
    /// last failure. A token that is already cancelled prevents any further
    /// invocation, including the first.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Replace the sleeper used by the blocking entry points
    pub fn with_sleeper<T: BlockingSleep>(self, sleeper: T) -> RetryExecutor<'p, T> {
        RetryExecutor {
            policy: self.policy,
            operation: self.operation,
            cancel: self.cancel,
            sleeper,
        }
    }

    /// The policy this executor runs under
    pub fn policy(&self) -> &RetryPolicy {
        self.policy
    }

    /// Operation name used in log events
    pub fn operation(&self) -> &str {
        &self.operation
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Execute an async operation, retrying per the policy
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyFailure + fmt::Display,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Execute an async operation and report attempt statistics
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyFailure + fmt::Display,
    {
        let mut state = AttemptState::new(self.policy, &self.operation);

        loop {
            if self.is_cancelled() {
                let err = state.cancelled();
                return state.finish(Err(err));
            }

            state.begin_attempt();
            let error = match operation().await {
                Ok(value) => return state.finish(Ok(value)),
                Err(error) => error,
            };

            match state.on_failure(error) {
                Step::Stop(err) => return state.finish(Err(err)),
                Step::Backoff(wait) => {
                    if sleep_async(wait, self.cancel.as_ref()).await == SleepStatus::Cancelled {
                        let err = state.cancelled();
                        return state.finish(Err(err));
                    }
                    state.after_backoff(wait);
                }
            }
        }
    }
}

impl<S: BlockingSleep> RetryExecutor<'_, S> {
    /// Execute a blocking operation, retrying per the policy
    pub fn execute_blocking<F, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: ClassifyFailure + fmt::Display,
    {
        self.execute_blocking_with_outcome(operation).into_result()
    }

    /// Execute a blocking operation and report attempt statistics
    pub fn execute_blocking_with_outcome<F, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: ClassifyFailure + fmt::Display,
    {
        let mut state = AttemptState::new(self.policy, &self.operation);

        loop {
            if self.is_cancelled() {
                let err = state.cancelled();
                return state.finish(Err(err));
            }

            state.begin_attempt();
            let error = match operation() {
                Ok(value) => return state.finish(Ok(value)),
                Err(error) => error,
            };

            match state.on_failure(error) {
                Step::Stop(err) => return state.finish(Err(err)),
                Step::Backoff(wait) => {
                    if self.sleeper.sleep(wait, self.cancel.as_ref()) == SleepStatus::Cancelled {
                        let err = state.cancelled();
                        return state.finish(Err(err));
                    }
                    state.after_backoff(wait);
                }
            }
        }
    }
}

impl RetryPolicy {
    /// Executor bound to this policy
    pub fn executor(&self) -> RetryExecutor<'_> {
        RetryExecutor::new(self)
    }

    /// Run an async operation under this policy
    pub async fn retry<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyFailure + fmt::Display,
    {
        self.executor().execute(operation).await
    }

    /// Run a blocking operation under this policy
    pub fn retry_blocking<F, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: ClassifyFailure + fmt::Display,
    {
        self.executor().execute_blocking(operation)
    }
}

/// Convenience function to retry an async operation under `policy`
pub async fn retry<F, Fut, T, E>(policy: &RetryPolicy, operation: F) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ClassifyFailure + fmt::Display,
{
    policy.retry(operation).await
}

/// Convenience function to retry a blocking operation under `policy`
pub fn retry_blocking<F, T, E>(policy: &RetryPolicy, operation: F) -> RetryResult<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: ClassifyFailure + fmt::Display,
{
    policy.retry_blocking(operation)
}

#[cfg(test)]
mod tests {
    //! Unit tests for retry::executor.
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::error::{CommonError, FailureKind};
    use crate::retry::RetryError;
    use crate::testing::RecordingSleep;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(max_retries)
            .min_wait(Duration::from_secs(1))
            .max_wait(Duration::from_secs(10))
            .no_jitter()
            .retry_on([FailureKind::Network, FailureKind::Timeout])
            .build()
            .expect("valid policy")
    }

    #[test]
    fn test_executor_defaults() {
        let policy = policy(2);
        let executor = policy.executor();
        assert_eq!(executor.operation(), "operation");
        assert_eq!(executor.policy().max_retries(), 2);
        assert_eq!(executor.named("lookup").operation(), "lookup");
    }

    #[test]
    fn test_blocking_success_after_failures() {
        let policy = policy(3);
        let sleeper = RecordingSleep::new();
        let calls = AtomicU32::new(0);

        let outcome = policy.executor().with_sleeper(&sleeper).execute_blocking_with_outcome(|| {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(CommonError::network("index", "connection reset"))
            } else {
                Ok("ready")
            }
        });

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.result.ok(), Some("ready"));
        assert_eq!(sleeper.waits(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[test]
    fn test_blocking_non_retryable_not_retried() {
        let policy = policy(3);
        let sleeper = RecordingSleep::new();
        let calls = AtomicU32::new(0);

        let result: RetryResult<(), _> =
            policy.executor().with_sleeper(&sleeper).execute_blocking(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(CommonError::validation("query", "empty"))
            });

        assert!(matches!(result, Err(RetryError::NonRetryable { attempts: 1, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.waits().is_empty());
    }

    #[test]
    fn test_blocking_pre_cancelled_token_skips_operation() {
        let policy = policy(3);
        let token = CancellationToken::new();
        token.cancel();
        let calls = AtomicU32::new(0);

        let result: RetryResult<(), CommonError> =
            policy.executor().with_cancellation(token).execute_blocking(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 0, last_error: None })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_exhaustion_surfaces_last_error() {
        let policy = policy(2);
        let calls = Arc::new(AtomicU32::new(0));

        let outcome = policy
            .executor()
            .execute_with_outcome(|| {
                let calls = Arc::clone(&calls);
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Err::<(), _>(CommonError::timeout(format!("call-{n}"), Duration::from_secs(1)))
                }
            })
            .await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.delays, vec![Duration::from_secs(1), Duration::from_secs(2)]);
        match outcome.result {
            Err(RetryError::Exhausted { attempts: 3, source }) => {
                assert_eq!(source, CommonError::timeout("call-3", Duration::from_secs(1)));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_free_function_retries_async() {
        let policy = policy(1);
        let calls = Arc::new(AtomicU32::new(0));

        let value = retry(&policy, || {
            let calls = Arc::clone(&calls);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(CommonError::network("web", "reset"))
                } else {
                    Ok(42)
                }
            }
        })
        .await
        .expect("second attempt succeeds");

        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_free_function_retries_blocking_io_errors() {
        let policy = RetryPolicy::builder()
            .max_retries(1)
            .min_wait(Duration::from_millis(1))
            .max_wait(Duration::from_millis(1))
            .retry_on([FailureKind::Timeout])
            .build()
            .expect("valid policy");
        let mut calls = 0;

        let result = retry_blocking(&policy, || {
            calls += 1;
            if calls == 1 {
                Err(std::io::Error::from(std::io::ErrorKind::TimedOut))
            } else {
                Ok(calls)
            }
        });

        assert_eq!(result.ok(), Some(2));
    }
}
