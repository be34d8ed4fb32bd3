//! Common error types and failure classification
//!
//! Retry decisions in this crate are data-driven: every error the executor
//! sees is reduced to a [`FailureKind`] through the [`ClassifyFailure`]
//! trait, and the policy's retryable set is a set of kinds rather than a
//! catch-all.
//!
//! # Error Handling Architecture
//!
//! 1. **`FailureKind`**: an enumerated tag describing what went wrong
//!    (storage contention, network, timeout, validation, ...)
//!
//! 2. **`ClassifyFailure` trait**: maps an error value to its `FailureKind`.
//!    Implemented here for [`CommonError`] and `std::io::Error`; callers
//!    implement it for their own error enums.
//!
//! 3. **`ErrorClassification` trait**: severity and default retryability used
//!    for monitoring and alerting.
//!
//! ## Classifying a module-specific error
//!
//! ```rust
//! use bizcomply_resilience::error::{ClassifyFailure, FailureKind};
//!
//! #[derive(Debug)]
//! enum SearchError {
//!     IndexLocked,
//!     BadQuery(String),
//! }
//!
//! impl ClassifyFailure for SearchError {
//!     fn failure_kind(&self) -> FailureKind {
//!         match self {
//!             Self::IndexLocked => FailureKind::StorageBusy,
//!             Self::BadQuery(_) => FailureKind::Validation,
//!         }
//!     }
//! }
//!
//! assert_eq!(SearchError::IndexLocked.failure_kind(), FailureKind::StorageBusy);
//! ```

use std::fmt;
use std::io;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard result type using CommonError
pub type CommonResult<T> = Result<T, CommonError>;

/// Enumerated failure kinds used to decide retryable vs terminal failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Storage engine reported contention (locked database, busy handle)
    StorageBusy,
    /// Storage driver/interface failure (connection to the engine broke)
    StorageInterface,
    /// Network connectivity failure
    Network,
    /// Operation deadline elapsed
    Timeout,
    /// Remote side throttled the request
    RateLimited,
    /// Remote service temporarily unavailable
    Unavailable,
    /// Requested resource does not exist
    NotFound,
    /// Input rejected
    Validation,
    /// Caller lacks permission
    Unauthorized,
    /// Invalid configuration
    Config,
    /// Programming or invariant error
    Internal,
    /// Operation was cancelled
    Cancelled,
    /// Anything not covered above
    Other,
}

impl FailureKind {
    /// All kinds, in declaration order
    pub const ALL: [FailureKind; 13] = [
        Self::StorageBusy,
        Self::StorageInterface,
        Self::Network,
        Self::Timeout,
        Self::RateLimited,
        Self::Unavailable,
        Self::NotFound,
        Self::Validation,
        Self::Unauthorized,
        Self::Config,
        Self::Internal,
        Self::Cancelled,
        Self::Other,
    ];

    /// Snake-case name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageBusy => "storage_busy",
            Self::StorageInterface => "storage_interface",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::Unavailable => "unavailable",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Unauthorized => "unauthorized",
            Self::Config => "config",
            Self::Internal => "internal",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        }
    }

    /// Whether this kind is usually transient
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StorageBusy
                | Self::StorageInterface
                | Self::Network
                | Self::Timeout
                | Self::RateLimited
                | Self::Unavailable
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureKind {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|kind| kind.as_str() == normalized).ok_or_else(|| {
            CommonError::config_field("retry_on", format!("unknown failure kind '{s}'"))
        })
    }
}

/// Maps an error value to its [`FailureKind`]
pub trait ClassifyFailure {
    /// The kind of failure this error represents
    fn failure_kind(&self) -> FailureKind;
}

impl<T: ClassifyFailure + ?Sized> ClassifyFailure for &T {
    fn failure_kind(&self) -> FailureKind {
        (**self).failure_kind()
    }
}

impl<T: ClassifyFailure + ?Sized> ClassifyFailure for Box<T> {
    fn failure_kind(&self) -> FailureKind {
        (**self).failure_kind()
    }
}

impl ClassifyFailure for io::Error {
    fn failure_kind(&self) -> FailureKind {
        match self.kind() {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::BrokenPipe => FailureKind::Network,
            io::ErrorKind::TimedOut => FailureKind::Timeout,
            io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => FailureKind::StorageBusy,
            io::ErrorKind::NotFound => FailureKind::NotFound,
            io::ErrorKind::PermissionDenied => FailureKind::Unauthorized,
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => FailureKind::Validation,
            _ => FailureKind::Other,
        }
    }
}

/// Common error variants that appear across BizComply modules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommonError {
    /// Configuration-related errors
    #[error("Configuration error{}: {message}", field_suffix(.field.as_deref()))]
    Config { message: String, field: Option<String> },

    /// Storage engine errors; `busy` marks contention as opposed to an
    /// interface failure
    #[error("Storage error during '{operation}': {message}")]
    Storage { operation: String, message: String, busy: bool },

    /// Network connectivity errors
    #[error("Network error from '{service}': {message}")]
    Network { service: String, message: String },

    /// Timeout errors
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout { operation: String, duration: Duration },

    /// Rate limiting errors
    #[error("Rate limit exceeded for '{service}'")]
    RateLimited { service: String, retry_after: Option<Duration> },

    /// Remote service temporarily unavailable
    #[error("Service '{service}' unavailable: {message}")]
    Unavailable { service: String, message: String },

    /// Resource not found errors
    #[error("{resource_type} not found")]
    NotFound { resource_type: String },

    /// Validation errors
    #[error("Validation error for field '{field}': {message}")]
    Validation { field: String, message: String },

    /// Permission or authorization errors
    #[error("Unauthorized to perform '{operation}'")]
    Unauthorized { operation: String },

    /// Internal errors that shouldn't normally occur
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Operation cancelled by the caller
    #[error("Operation '{operation}' cancelled")]
    Cancelled { operation: String },
}

fn field_suffix(field: Option<&str>) -> String {
    field.map(|f| format!(" in field '{f}'")).unwrap_or_default()
}

impl CommonError {
    /// Create a simple configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), field: None }
    }

    /// Create a configuration error for a specific field
    pub fn config_field<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    /// Storage contention (locked database, busy connection)
    pub fn storage_busy<O: Into<String>, S: Into<String>>(operation: O, message: S) -> Self {
        Self::Storage { operation: operation.into(), message: message.into(), busy: true }
    }

    /// Storage interface failure (driver or connection broke)
    pub fn storage_interface<O: Into<String>, S: Into<String>>(operation: O, message: S) -> Self {
        Self::Storage { operation: operation.into(), message: message.into(), busy: false }
    }

    /// Create a network error
    pub fn network<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::Network { service: service.into(), message: message.into() }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, duration: Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration }
    }

    /// Create a rate limit error
    pub fn rate_limited<S: Into<String>>(service: S, retry_after: Option<Duration>) -> Self {
        Self::RateLimited { service: service.into(), retry_after }
    }

    /// Create a service-unavailable error
    pub fn unavailable<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::Unavailable { service: service.into(), message: message.into() }
    }

    /// Create a not found error
    pub fn not_found<T: Into<String>>(resource_type: T) -> Self {
        Self::NotFound { resource_type: resource_type.into() }
    }

    /// Create a validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create an unauthorized error
    pub fn unauthorized<O: Into<String>>(operation: O) -> Self {
        Self::Unauthorized { operation: operation.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Create a cancellation error
    pub fn cancelled<O: Into<String>>(operation: O) -> Self {
        Self::Cancelled { operation: operation.into() }
    }
}

impl ClassifyFailure for CommonError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Config { .. } => FailureKind::Config,
            Self::Storage { busy: true, .. } => FailureKind::StorageBusy,
            Self::Storage { busy: false, .. } => FailureKind::StorageInterface,
            Self::Network { .. } => FailureKind::Network,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Unavailable { .. } => FailureKind::Unavailable,
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::Validation { .. } => FailureKind::Validation,
            Self::Unauthorized { .. } => FailureKind::Unauthorized,
            Self::Internal { .. } => FailureKind::Internal,
            Self::Cancelled { .. } => FailureKind::Cancelled,
        }
    }
}

/// Error classification for monitoring and alerting
pub trait ErrorClassification {
    /// Check if this error is retryable by default
    ///
    /// Retry policies make the final call; this is the answer when no policy
    /// says otherwise.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        self.failure_kind().is_transient()
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Storage { busy: true, .. }
            | Self::Timeout { .. }
            | Self::RateLimited { .. }
            | Self::Unavailable { .. }
            | Self::Unauthorized { .. } => ErrorSeverity::Warning,
            Self::NotFound { .. } | Self::Cancelled { .. } => ErrorSeverity::Info,
            Self::Internal { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

// Standard conversions from common error types
impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::config(format!("Invalid JSON format: {err}"))
    }
}

impl From<toml::de::Error> for CommonError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("Invalid TOML format: {err}"))
    }
}
