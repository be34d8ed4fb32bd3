// Error types for retry module
use std::fmt;

use thiserror::Error;

use crate::error::{ClassifyFailure, FailureKind};

/// Terminal outcome of a retried operation
///
/// Every variant keeps the operation's own error value so callers can still
/// tell causes apart; nothing is replaced by a generic error.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The failure kind is outside the policy's retryable set
    #[error("Operation failed with non-retryable error: {source}")]
    NonRetryable { attempts: u32, source: E },

    /// Every allowed attempt failed; `source` is the last attempt's failure
    #[error("All retry attempts exhausted after {attempts} tries: {source}")]
    Exhausted { attempts: u32, source: E },

    /// Cancellation fired before the next attempt could run
    #[error("Retry cancelled after {attempts} attempts{}", last_error_suffix(.last_error.as_ref()))]
    Cancelled { attempts: u32, last_error: Option<E> },
}

fn last_error_suffix<E: fmt::Display>(last_error: Option<&E>) -> String {
    last_error.map(|err| format!(", last error: {err}")).unwrap_or_default()
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

impl<E> RetryError<E> {
    /// Number of times the operation was invoked
    pub fn attempts(&self) -> u32 {
        match self {
            Self::NonRetryable { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// The operation's last failure, if one was captured
    pub fn source_error(&self) -> Option<&E> {
        match self {
            Self::NonRetryable { source, .. } | Self::Exhausted { source, .. } => Some(source),
            Self::Cancelled { last_error, .. } => last_error.as_ref(),
        }
    }

    /// Consume the error and return the operation's last failure
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::NonRetryable { source, .. } | Self::Exhausted { source, .. } => Some(source),
            Self::Cancelled { last_error, .. } => last_error,
        }
    }

    /// Whether the retry loop stopped because of cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether the retry budget ran out
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

impl<E: ClassifyFailure> ClassifyFailure for RetryError<E> {
    fn failure_kind(&self) -> FailureKind {
        match self {
            Self::NonRetryable { source, .. } | Self::Exhausted { source, .. } => {
                source.failure_kind()
            }
            Self::Cancelled { .. } => FailureKind::Cancelled,
        }
    }
}
