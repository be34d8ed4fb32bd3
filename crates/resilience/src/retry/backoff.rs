//! Backoff arithmetic shared by the blocking and async executors
//!
//! Both variants call [`next_wait`]; only the suspension mechanism differs
//! between them.

use std::time::Duration;

use rand::Rng;

use crate::retry::RetryPolicy;

/// Pre-jitter wait before the retry that follows failed attempt `attempt`
/// (0-based): `min(max_wait, min_wait * base^attempt)`.
pub fn compute_backoff(policy: &RetryPolicy, attempt: u32) -> Duration {
    // powi overflows to infinity, which the max_wait cap absorbs
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let scaled = policy.min_wait().as_secs_f64() * policy.exponential_base().powi(exponent);
    let capped = scaled.min(policy.max_wait().as_secs_f64());

    // `capped` is finite and non-negative for any validated policy
    Duration::try_from_secs_f64(capped).unwrap_or(policy.max_wait())
}

/// Full jitter: a wait drawn uniformly from `[0, backoff]`
pub fn full_jitter<R: Rng + ?Sized>(backoff: Duration, rng: &mut R) -> Duration {
    if backoff.is_zero() {
        return backoff;
    }
    let secs = rng.gen_range(0.0..=backoff.as_secs_f64());
    Duration::try_from_secs_f64(secs).unwrap_or(backoff).min(backoff)
}

/// Actual wait before the next retry, jitter applied when the policy asks for
/// it
pub fn next_wait(policy: &RetryPolicy, attempt: u32) -> Duration {
    let backoff = compute_backoff(policy, attempt);
    if policy.use_jitter() {
        full_jitter(backoff, &mut rand::thread_rng())
    } else {
        backoff
    }
}
