// Constants for retry module
use std::time::Duration;

/// Default number of retries after the initial attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default lower backoff bound
pub const DEFAULT_MIN_WAIT: Duration = Duration::from_secs(1);

/// Default upper backoff bound
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60);

/// Default growth factor per attempt
pub const DEFAULT_EXPONENTIAL_BASE: f64 = 2.0;

/// Upper bound on `max_retries` accepted by the policy builder
pub const MAX_MAX_RETRIES: u32 = 100;

/// Longest single blocking sleep between cancellation checks
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(20);
