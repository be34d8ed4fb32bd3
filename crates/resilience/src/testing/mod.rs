//! Testing utilities and helpers
//!
//! Available with the `test-utils` feature:
//! - **[`sleep`]**: [`RecordingSleep`], a [`BlockingSleep`](crate::retry::BlockingSleep)
//!   that records waits instead of blocking
//! - **[`logs`]**: [`LogCapture`], a `tracing-subscriber` layer that captures
//!   events for assertions
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use std::time::Duration;
//!
//! use bizcomply_resilience::testing::RecordingSleep;
//! use bizcomply_resilience::{CommonError, RetryPolicy};
//!
//! let policy = RetryPolicy::builder().max_retries(2).no_jitter().build().unwrap();
//! let sleeper = RecordingSleep::new();
//!
//! let result: Result<(), _> = policy
//!     .executor()
//!     .with_sleeper(&sleeper)
//!     .execute_blocking(|| Err(CommonError::network("index", "down")));
//!
//! assert!(result.is_err());
//! assert_eq!(sleeper.waits(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
//! # }
//! ```

pub mod logs;
pub mod sleep;

// Re-export commonly used items
pub use logs::{CapturedEvent, LogCapture};
pub use sleep::RecordingSleep;
