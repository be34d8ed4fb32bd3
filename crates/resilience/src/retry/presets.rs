//! Pre-configured retry policies for common BizComply call sites
//!
//! Each preset can be tweaked through
//! [`RetryPolicy::to_builder`](crate::retry::RetryPolicy::to_builder).

use std::time::Duration;

use crate::error::{CommonError, CommonResult, FailureKind};
use crate::retry::{RetryOn, RetryPolicy};

/// Named policy presets
pub struct RetryPresets;

impl RetryPresets {
    /// Names accepted by [`by_name`](Self::by_name)
    pub const NAMES: [&'static str; 4] =
        ["database", "http", "best_effort_fetch", "regulatory_fetch"];

    /// Local database calls: 5 retries, 0.1s to 10s, busy or broken storage
    pub fn database() -> RetryPolicy {
        RetryPolicy::preset(
            5,
            Duration::from_millis(100),
            Duration::from_secs(10),
            RetryOn::kinds([FailureKind::StorageBusy, FailureKind::StorageInterface]),
        )
    }

    /// Outbound HTTP calls: 3 retries, 1s to 10s, network errors and timeouts
    pub fn http() -> RetryPolicy {
        RetryPolicy::preset(
            3,
            Duration::from_secs(1),
            Duration::from_secs(10),
            RetryOn::kinds([FailureKind::Network, FailureKind::Timeout]),
        )
    }

    /// Best-effort fetches of external regulatory content: 5 retries, 2s to
    /// 30s
    ///
    /// Permissive: retries every failure kind, including validation and
    /// internal errors. Prefer [`http`](Self::http) or a narrower custom set
    /// when the call site can tell transient failures apart.
    pub fn best_effort_fetch() -> RetryPolicy {
        RetryPolicy::preset(5, Duration::from_secs(2), Duration::from_secs(30), RetryOn::Any)
    }

    /// Resolve a preset by name (case-insensitive)
    ///
    /// `regulatory_fetch` is an alias of `best_effort_fetch`.
    pub fn by_name(name: &str) -> CommonResult<RetryPolicy> {
        match name.trim().to_ascii_lowercase().as_str() {
            "database" => Ok(Self::database()),
            "http" => Ok(Self::http()),
            "best_effort_fetch" | "regulatory_fetch" => Ok(Self::best_effort_fetch()),
            other => Err(CommonError::config(format!(
                "unknown retry preset '{other}', expected one of: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }
}
