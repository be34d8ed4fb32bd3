// Retry with exponential backoff and full jitter, blocking and async

mod attempt;
pub mod backoff;
pub mod constants;
pub mod error;
pub mod executor;
pub mod policy;
pub mod presets;
pub mod sleep;
pub mod tracing;

pub use attempt::RetryOutcome;
pub use error::{RetryError, RetryResult};
pub use executor::{retry, retry_blocking, RetryExecutor};
pub use policy::{RetryOn, RetryPolicy, RetryPolicyBuilder};
pub use presets::RetryPresets;
pub use sleep::{BlockingSleep, SleepStatus, ThreadSleep};
