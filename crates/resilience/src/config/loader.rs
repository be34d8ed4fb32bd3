//! Retry settings loader
//!
//! ## Loading Strategy
//! 1. If `BIZCOMPLY_RETRY_CONFIG` is set, load the file it names (errors are
//!    reported, never silently ignored)
//! 2. Otherwise probe the working directory for a settings file
//! 3. Otherwise fall back to empty settings, so every profile resolves to
//!    its built-in preset
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./bizcomply-retry.toml` or `./bizcomply-retry.json`
//! 2. `./config/retry.toml` or `./config/retry.json`

use std::path::{Path, PathBuf};

use crate::config::RetrySettings;
use crate::error::{CommonError, CommonResult};

/// Environment variable holding the path of the retry settings file
pub const CONFIG_ENV_VAR: &str = "BIZCOMPLY_RETRY_CONFIG";

/// Load retry settings with automatic fallback strategy
///
/// # Errors
/// Returns `CommonError::Config` if a configured or discovered file cannot be
/// read, parsed or validated.
pub fn load() -> CommonResult<RetrySettings> {
    if std::env::var_os(CONFIG_ENV_VAR).is_some() {
        let settings = load_from_env()?;
        tracing::info!("Retry settings loaded from {CONFIG_ENV_VAR}");
        return Ok(settings);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(path),
        None => {
            tracing::debug!("No retry settings file found, using built-in presets");
            Ok(RetrySettings::default())
        }
    }
}

/// Load retry settings from the file named by `BIZCOMPLY_RETRY_CONFIG`
///
/// # Errors
/// Returns `CommonError::Config` if the variable is missing or the file is
/// invalid.
pub fn load_from_env() -> CommonResult<RetrySettings> {
    let path = env_var(CONFIG_ENV_VAR)?;
    load_from_file(PathBuf::from(path))
}

/// Load retry settings from a file
///
/// Supports JSON and TOML (detected by file extension). Every profile is
/// validated before the settings are returned.
///
/// # Errors
/// Returns `CommonError::Config` if the file is missing, unreadable, in an
/// unsupported format, or describes an invalid policy.
pub fn load_from_file(path: impl AsRef<Path>) -> CommonResult<RetrySettings> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CommonError::config(format!(
            "Retry settings file not found: {}",
            path.display()
        )));
    }

    tracing::info!(path = %path.display(), "Loading retry settings from file");

    let contents = std::fs::read_to_string(path).map_err(|e| {
        CommonError::config(format!("Failed to read retry settings file: {e}"))
    })?;

    let settings = parse_settings(&contents, path)?;
    settings.validate()?;
    Ok(settings)
}

/// Parse settings from string content; format is detected by extension
fn parse_settings(contents: &str, path: &Path) -> CommonResult<RetrySettings> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    let settings: RetrySettings = match extension.to_ascii_lowercase().as_str() {
        "toml" => toml::from_str(contents)?,
        "json" => serde_json::from_str(contents)?,
        other => {
            return Err(CommonError::config(format!("Unsupported settings format: {other}")));
        }
    };

    settings.normalize_keys()
}

/// Probe the working directory for a retry settings file
///
/// # Returns
/// The first file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_in(&cwd)
}

fn probe_in(dir: &Path) -> Option<PathBuf> {
    [
        "bizcomply-retry.toml",
        "bizcomply-retry.json",
        "config/retry.toml",
        "config/retry.json",
    ]
    .into_iter()
    .map(|candidate| dir.join(candidate))
    .find(|path| path.is_file())
}

/// Get required environment variable
fn env_var(key: &str) -> CommonResult<String> {
    std::env::var(key).map_err(|_| {
        CommonError::config(format!("Missing required environment variable: {key}"))
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for config::loader.
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_parse_toml() {
        let contents = r#"
            [HTTP]
            max_retries = 1
            retry_on = ["network"]
        "#;
        let settings = parse_settings(contents, Path::new("retry.toml")).expect("valid toml");
        let policy = settings.policy("http").expect("valid profile");
        assert_eq!(policy.max_retries(), 1);
        assert_eq!(settings.profile_names().collect::<Vec<_>>(), vec!["http"]);
    }

    #[test]
    fn test_parse_json() {
        let contents = r#"{ "database": { "min_wait_secs": 0.5, "log_retries": false } }"#;
        let settings = parse_settings(contents, Path::new("retry.json")).expect("valid json");
        let policy = settings.policy("database").expect("valid profile");
        assert!(!policy.log_retries());
    }

    #[test]
    fn test_profiles_differing_only_in_case_rejected() {
        let contents = "[HTTP]\nmax_retries = 1\n\n[http]\nmax_retries = 4\n";
        let err = parse_settings(contents, Path::new("retry.toml")).unwrap_err();
        assert!(matches!(
            err,
            CommonError::Config { ref field, .. } if field.as_deref() == Some("profiles")
        ));
        assert!(err.to_string().contains("'http'"));

        let contents = r#"{ "database": {}, " Database ": { "max_retries": 1 } }"#;
        assert!(parse_settings(contents, Path::new("retry.json")).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let contents = "[http]\nmax_attempts = 4\n";
        assert!(parse_settings(contents, Path::new("retry.toml")).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = parse_settings("", Path::new("retry.yaml")).unwrap_err();
        assert!(err.to_string().contains("Unsupported settings format"));
    }

    #[test]
    fn test_load_from_file_missing() {
        let err = load_from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_probe_prefers_root_file() {
        let dir = TempDir::new().expect("temp dir");
        assert!(probe_in(dir.path()).is_none());

        fs::create_dir(dir.path().join("config")).expect("config dir");
        fs::write(dir.path().join("config/retry.json"), "{}").expect("write json");
        assert_eq!(probe_in(dir.path()), Some(dir.path().join("config/retry.json")));

        fs::write(dir.path().join("bizcomply-retry.toml"), "").expect("write toml");
        assert_eq!(probe_in(dir.path()), Some(dir.path().join("bizcomply-retry.toml")));
    }
}
