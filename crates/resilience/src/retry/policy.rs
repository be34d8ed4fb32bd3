// Retry policy: immutable configuration shared by every invocation
use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::{CommonError, CommonResult, FailureKind};
use crate::retry::constants::*;

/// Which failure kinds trigger a retry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RetryOn {
    /// Retry every failure kind, including programming errors
    #[default]
    Any,
    /// Retry only the listed kinds
    Kinds(BTreeSet<FailureKind>),
}

impl RetryOn {
    /// Retry only the given kinds
    pub fn kinds<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = FailureKind>,
    {
        Self::Kinds(kinds.into_iter().collect())
    }

    /// Whether a failure of this kind should be retried
    pub fn matches(&self, kind: FailureKind) -> bool {
        match self {
            Self::Any => true,
            Self::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}

/// Retry policy with exponential backoff and optional full jitter
///
/// Built once through [`RetryPolicyBuilder`] (or a preset in
/// [`RetryPresets`](crate::retry::RetryPresets)) and shared read-only by any
/// number of concurrent invocations.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    min_wait: Duration,
    max_wait: Duration,
    exponential_base: f64,
    use_jitter: bool,
    retry_on: RetryOn,
    log_retries: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            min_wait: DEFAULT_MIN_WAIT,
            max_wait: DEFAULT_MAX_WAIT,
            exponential_base: DEFAULT_EXPONENTIAL_BASE,
            use_jitter: true,
            retry_on: RetryOn::Any,
            log_retries: true,
        }
    }
}

impl RetryPolicy {
    /// Start building a policy from the defaults
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::new()
    }

    /// Fixed policy for a built-in preset; remaining fields keep the defaults
    pub(crate) fn preset(
        max_retries: u32,
        min_wait: Duration,
        max_wait: Duration,
        retry_on: RetryOn,
    ) -> Self {
        Self { max_retries, min_wait, max_wait, retry_on, ..Self::default() }
    }

    /// Builder seeded with this policy's values
    pub fn to_builder(&self) -> RetryPolicyBuilder {
        RetryPolicyBuilder { policy: self.clone() }
    }

    /// Number of retries after the initial attempt
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total invocations allowed (`max_retries + 1`)
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Lower backoff bound
    pub fn min_wait(&self) -> Duration {
        self.min_wait
    }

    /// Upper backoff bound
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Growth factor per attempt
    pub fn exponential_base(&self) -> f64 {
        self.exponential_base
    }

    /// Whether waits are drawn uniformly from `[0, backoff]`
    pub fn use_jitter(&self) -> bool {
        self.use_jitter
    }

    /// The retryable set
    pub fn retry_on(&self) -> &RetryOn {
        &self.retry_on
    }

    /// Whether each retry is logged at warn level
    pub fn log_retries(&self) -> bool {
        self.log_retries
    }

    /// Whether a failure of this kind should be retried
    pub fn is_retryable(&self, kind: FailureKind) -> bool {
        self.retry_on.matches(kind)
    }

    /// Validate the policy invariants
    pub fn validate(&self) -> CommonResult<()> {
        if self.max_retries > MAX_MAX_RETRIES {
            return Err(CommonError::config_field(
                "max_retries",
                format!("must be at most {MAX_MAX_RETRIES}, got {}", self.max_retries),
            ));
        }

        if self.min_wait.is_zero() {
            return Err(CommonError::config_field("min_wait", "must be positive"));
        }

        if self.min_wait > self.max_wait {
            return Err(CommonError::config_field(
                "min_wait",
                format!(
                    "min_wait ({:?}) cannot be greater than max_wait ({:?})",
                    self.min_wait, self.max_wait
                ),
            ));
        }

        if !self.exponential_base.is_finite() || self.exponential_base < 1.0 {
            return Err(CommonError::config_field(
                "exponential_base",
                format!("must be a finite number >= 1, got {}", self.exponential_base),
            ));
        }

        if let RetryOn::Kinds(kinds) = &self.retry_on {
            if kinds.is_empty() {
                return Err(CommonError::config_field(
                    "retry_on",
                    "must name at least one failure kind",
                ));
            }
        }

        Ok(())
    }
}

/// Builder for [`RetryPolicy`] with fluent API
#[derive(Debug, Clone, Default)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    /// Create a builder seeded with the default policy
    pub fn new() -> Self {
        Self { policy: RetryPolicy::default() }
    }

    /// Set the number of retries after the initial attempt
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.policy.max_retries = retries;
        self
    }

    /// Set the lower backoff bound
    pub fn min_wait(mut self, wait: Duration) -> Self {
        self.policy.min_wait = wait;
        self
    }

    /// Set the upper backoff bound
    pub fn max_wait(mut self, wait: Duration) -> Self {
        self.policy.max_wait = wait;
        self
    }

    /// Set both backoff bounds from fractional seconds
    ///
    /// Negative or non-finite values are rejected here; the remaining
    /// invariants are checked by [`build`](Self::build).
    pub fn wait_secs(mut self, min_secs: f64, max_secs: f64) -> CommonResult<Self> {
        self.policy.min_wait = secs_to_duration("min_wait", min_secs)?;
        self.policy.max_wait = secs_to_duration("max_wait", max_secs)?;
        Ok(self)
    }

    /// Set the growth factor per attempt
    pub fn exponential_base(mut self, base: f64) -> Self {
        self.policy.exponential_base = base;
        self
    }

    /// Enable or disable full jitter
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.policy.use_jitter = enabled;
        self
    }

    /// Disable jitter (deterministic waits)
    pub fn no_jitter(self) -> Self {
        self.jitter(false)
    }

    /// Retry every failure kind
    pub fn retry_on_any(mut self) -> Self {
        self.policy.retry_on = RetryOn::Any;
        self
    }

    /// Retry only the given failure kinds
    pub fn retry_on<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = FailureKind>,
    {
        self.policy.retry_on = RetryOn::kinds(kinds);
        self
    }

    /// Replace the retryable set
    pub fn retry_on_set(mut self, retry_on: RetryOn) -> Self {
        self.policy.retry_on = retry_on;
        self
    }

    /// Enable or disable the per-retry warning
    pub fn log_retries(mut self, enabled: bool) -> Self {
        self.policy.log_retries = enabled;
        self
    }

    /// Validate and build the policy
    pub fn build(self) -> CommonResult<RetryPolicy> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}

pub(crate) fn secs_to_duration(field: &str, secs: f64) -> CommonResult<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        CommonError::config_field(
            field,
            format!("must be a finite, non-negative number of seconds, got {secs}"),
        )
    })
}
