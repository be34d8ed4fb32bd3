//! `tracing` subscriber setup for binaries and examples that embed the
//! resilience crate
//!
//! Library code only emits events; installing a subscriber is the host's job.
//! These helpers give BizComply services a consistent default: `RUST_LOG`
//! filtering (falling back to `info`) and either human-readable or JSON
//! output.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable selecting the output format (`json` or `text`)
pub const LOG_FORMAT_ENV_VAR: &str = "BIZCOMPLY_LOG_FORMAT";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Read the format from `BIZCOMPLY_LOG_FORMAT`; anything but `json` is
    /// text
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV_VAR) {
            Ok(value) if value.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Install the global subscriber using the format from the environment
///
/// Returns `false` when a global subscriber was already installed; calling
/// this more than once is harmless.
pub fn init_tracing() -> bool {
    init_tracing_with(LogFormat::from_env())
}

/// Install the global subscriber with an explicit format
pub fn init_tracing_with(format: LogFormat) -> bool {
    let filter = env_filter();
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer().with_target(false)).try_init()
        }
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
    };

    installed.is_ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[cfg(test)]
mod tests {
    //! Unit tests for observability.
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let _ = init_tracing_with(LogFormat::Text);
        assert!(!init_tracing_with(LogFormat::Json));
    }

    #[test]
    fn test_default_format_is_text() {
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }
}
