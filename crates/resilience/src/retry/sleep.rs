// Suspension between attempts for the blocking and async executors
use std::thread;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::retry::constants::CANCEL_POLL_INTERVAL;

/// How a suspension ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepStatus {
    /// The full wait elapsed
    Completed,
    /// The cancellation token fired first
    Cancelled,
}

/// Blocks the calling thread between attempts of a blocking operation
///
/// Implementations must return [`SleepStatus::Cancelled`] promptly once
/// `cancel` fires. Tests substitute a recording implementation to observe the
/// computed waits without sleeping.
pub trait BlockingSleep: Send + Sync {
    /// Block for `duration` unless `cancel` fires first
    fn sleep(&self, duration: Duration, cancel: Option<&CancellationToken>) -> SleepStatus;
}

impl<S: BlockingSleep + ?Sized> BlockingSleep for &S {
    fn sleep(&self, duration: Duration, cancel: Option<&CancellationToken>) -> SleepStatus {
        (**self).sleep(duration, cancel)
    }
}

/// Production sleeper backed by [`std::thread::sleep`]
///
/// With a token present the wait is split into slices of at most
/// [`CANCEL_POLL_INTERVAL`] so cancellation is observed between slices.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl BlockingSleep for ThreadSleep {
    fn sleep(&self, duration: Duration, cancel: Option<&CancellationToken>) -> SleepStatus {
        let Some(token) = cancel else {
            thread::sleep(duration);
            return SleepStatus::Completed;
        };

        // A wait too long to express as an instant only ends on cancellation
        let deadline = Instant::now().checked_add(duration);
        loop {
            if token.is_cancelled() {
                return SleepStatus::Cancelled;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return SleepStatus::Completed;
                    }
                    (deadline - now).min(CANCEL_POLL_INTERVAL)
                }
                None => CANCEL_POLL_INTERVAL,
            };
            thread::sleep(slice);
        }
    }
}

/// Suspend the current task for `duration` unless `cancel` fires first
///
/// Cancellation wins when both are ready at the same poll.
pub(crate) async fn sleep_async(
    duration: Duration,
    cancel: Option<&CancellationToken>,
) -> SleepStatus {
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                () = token.cancelled() => SleepStatus::Cancelled,
                () = tokio::time::sleep(duration) => SleepStatus::Completed,
            }
        }
        None => {
            tokio::time::sleep(duration).await;
            SleepStatus::Completed
        }
    }
}
