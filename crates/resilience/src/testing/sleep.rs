//! Recording sleeper for blocking retry tests

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::retry::{BlockingSleep, SleepStatus};

/// A [`BlockingSleep`] that records every requested wait and returns
/// immediately
///
/// Clones share the same record, so a test can keep one handle while the
/// executor owns another (or pass `&sleeper`).
#[derive(Debug, Clone, Default)]
pub struct RecordingSleep {
    waits: Arc<Mutex<Vec<Duration>>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingSleep {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel `token` during the `sleeps`-th sleep, simulating a shutdown
    /// that arrives while the executor is backing off
    #[must_use]
    pub fn cancelling_after(mut self, sleeps: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((sleeps, token));
        self
    }

    /// Requested waits, in order
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().clone()
    }

    /// Number of sleeps requested
    pub fn sleep_count(&self) -> usize {
        self.waits.lock().len()
    }

    /// Sum of all requested waits
    pub fn total(&self) -> Duration {
        self.waits.lock().iter().sum()
    }
}

impl BlockingSleep for RecordingSleep {
    fn sleep(&self, duration: Duration, cancel: Option<&CancellationToken>) -> SleepStatus {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return SleepStatus::Cancelled;
        }

        let count = {
            let mut waits = self.waits.lock();
            waits.push(duration);
            waits.len()
        };

        if let Some((after, token)) = &self.cancel_after {
            if count >= *after {
                token.cancel();
            }
        }

        if cancel.is_some_and(CancellationToken::is_cancelled) {
            SleepStatus::Cancelled
        } else {
            SleepStatus::Completed
        }
    }
}
