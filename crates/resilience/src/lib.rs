//! Resilience utilities shared across BizComply services.
//!
//! The centerpiece is the retry executor in [`retry`]: it wraps any fallible
//! operation (blocking or async) and re-invokes it on transient failures with
//! exponential backoff and optional jitter, surfacing the last failure once
//! the attempt budget is spent.
//!
//! # Modules
//!
//! - [`error`]: failure-kind classification and the crate's `CommonError`
//! - [`retry`]: policies, presets, backoff arithmetic and the executor
//! - [`config`]: loading retry profiles from TOML/JSON files or the
//!   environment
//! - [`observability`]: `tracing` subscriber setup
//! - `testing` (feature `test-utils`): recording sleeper and log capture

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod config;
pub mod error;
pub mod observability;
pub mod retry;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use config::{RetryProfileSettings, RetrySettings};
pub use error::{
    ClassifyFailure, CommonError, CommonResult, ErrorClassification, ErrorSeverity, FailureKind,
};
pub use retry::{
    retry, retry_blocking, BlockingSleep, RetryError, RetryExecutor, RetryOn, RetryOutcome,
    RetryPolicy, RetryPolicyBuilder, RetryPresets, RetryResult, SleepStatus, ThreadSleep,
};
