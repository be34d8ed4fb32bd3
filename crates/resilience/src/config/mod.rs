//! Retry configuration loading and management
//!
//! Retry profiles can be tuned per deployment without a rebuild. A settings
//! file holds one table per profile; every field is optional and falls back
//! to the built-in preset of the same name (or to the crate defaults for
//! profiles that are not presets).
//!
//! ```toml
//! [http]
//! max_retries = 2
//! max_wait_secs = 5.0
//!
//! [database]
//! retry_on = ["storage_busy"]
//!
//! [search_index]
//! min_wait_secs = 0.25
//! retry_on = "any"
//! jitter = false
//! ```

pub mod loader;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult, FailureKind};
use crate::retry::policy::secs_to_duration;
use crate::retry::{RetryOn, RetryPolicy, RetryPresets};

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths, CONFIG_ENV_VAR};

const RETRY_ON_ANY: &str = "any";

/// Retryable set as written in a settings file: `"any"` or a list of kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetryOnSetting {
    /// Only `"any"` is accepted
    Keyword(String),
    /// Failure-kind names, e.g. `["network", "timeout"]`
    Kinds(Vec<String>),
}

impl RetryOnSetting {
    /// Resolve into a [`RetryOn`], rejecting unknown names
    pub fn to_retry_on(&self) -> CommonResult<RetryOn> {
        match self {
            Self::Keyword(word) if word.trim().eq_ignore_ascii_case(RETRY_ON_ANY) => {
                Ok(RetryOn::Any)
            }
            Self::Keyword(word) => Err(CommonError::config_field(
                "retry_on",
                format!("expected \"{RETRY_ON_ANY}\" or a list of failure kinds, got \"{word}\""),
            )),
            Self::Kinds(names) => {
                let kinds = names
                    .iter()
                    .map(|name| name.parse::<FailureKind>())
                    .collect::<CommonResult<Vec<_>>>()?;
                Ok(RetryOn::kinds(kinds))
            }
        }
    }
}

/// Overrides for one retry profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryProfileSettings {
    /// Retries after the initial attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Lower backoff bound in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_wait_secs: Option<f64>,
    /// Upper backoff bound in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wait_secs: Option<f64>,
    /// Growth factor per attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exponential_base: Option<f64>,
    /// Full jitter on or off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter: Option<bool>,
    /// Retryable set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_on: Option<RetryOnSetting>,
    /// Per-retry warning on or off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_retries: Option<bool>,
}

impl RetryProfileSettings {
    /// Apply these overrides on top of `base` and validate the result
    pub fn apply(&self, base: &RetryPolicy) -> CommonResult<RetryPolicy> {
        let mut builder = base.to_builder();

        if let Some(retries) = self.max_retries {
            builder = builder.max_retries(retries);
        }
        if let Some(secs) = self.min_wait_secs {
            builder = builder.min_wait(secs_to_duration("min_wait_secs", secs)?);
        }
        if let Some(secs) = self.max_wait_secs {
            builder = builder.max_wait(secs_to_duration("max_wait_secs", secs)?);
        }
        if let Some(base) = self.exponential_base {
            builder = builder.exponential_base(base);
        }
        if let Some(jitter) = self.jitter {
            builder = builder.jitter(jitter);
        }
        if let Some(retry_on) = &self.retry_on {
            builder = builder.retry_on_set(retry_on.to_retry_on()?);
        }
        if let Some(log) = self.log_retries {
            builder = builder.log_retries(log);
        }

        builder.build()
    }
}

/// Retry profiles keyed by name
///
/// Profile names are matched case-insensitively. `regulatory_fetch` and
/// `best_effort_fetch` name the same built-in preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrySettings {
    profiles: BTreeMap<String, RetryProfileSettings>,
}

impl RetrySettings {
    /// Empty settings: every profile resolves to its built-in preset
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a profile
    #[must_use]
    pub fn with_profile(mut self, name: &str, profile: RetryProfileSettings) -> Self {
        self.profiles.insert(normalize(name), profile);
        self
    }

    /// Overrides configured for `name`, if any
    pub fn profile(&self, name: &str) -> Option<&RetryProfileSettings> {
        let key = normalize(name);
        self.profiles.get(&key).or_else(|| alias(&key).and_then(|other| self.profiles.get(other)))
    }

    /// Names of all configured profiles
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Whether no profile is configured
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Build the validated policy for `name`
    ///
    /// Built-in presets apply even when the profile is not configured. Any
    /// other name must be configured and starts from the crate defaults.
    pub fn policy(&self, name: &str) -> CommonResult<RetryPolicy> {
        let preset = RetryPresets::by_name(name);
        match (self.profile(name), preset) {
            (Some(profile), Ok(base)) => profile.apply(&base),
            (Some(profile), Err(_)) => profile.apply(&RetryPolicy::default()),
            (None, Ok(base)) => Ok(base),
            (None, Err(_)) => {
                Err(CommonError::config(format!("unknown retry profile '{}'", name.trim())))
            }
        }
    }

    /// Build every configured profile, reporting the first invalid one
    pub fn validate(&self) -> CommonResult<()> {
        for name in self.profiles.keys() {
            self.policy(name).map_err(|err| {
                CommonError::config(format!("invalid retry profile '{name}': {err}"))
            })?;
        }
        Ok(())
    }

    /// Re-key profiles by normalized name, rejecting names that collide
    fn normalize_keys(self) -> CommonResult<Self> {
        let mut profiles = BTreeMap::new();
        for (name, profile) in self.profiles {
            let key = normalize(&name);
            if profiles.insert(key.clone(), profile).is_some() {
                return Err(CommonError::config_field(
                    "profiles",
                    format!("retry profile '{key}' is defined more than once (names ignore case)"),
                ));
            }
        }
        Ok(Self { profiles })
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn alias(name: &str) -> Option<&'static str> {
    match name {
        "regulatory_fetch" => Some("best_effort_fetch"),
        "best_effort_fetch" => Some("regulatory_fetch"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for retry settings.
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_empty_settings_resolve_presets() {
        let settings = RetrySettings::new();
        assert!(settings.is_empty());
        assert_eq!(settings.policy("http").expect("preset"), RetryPresets::http());
        assert_eq!(settings.policy("database").expect("preset"), RetryPresets::database());
        assert!(settings.policy("search_index").is_err());
    }

    #[test]
    fn test_profile_overrides_preset_fields() {
        let settings = RetrySettings::new().with_profile(
            "HTTP",
            RetryProfileSettings {
                max_retries: Some(1),
                max_wait_secs: Some(5.0),
                ..Default::default()
            },
        );

        let policy = settings.policy("http").expect("valid profile");
        assert_eq!(policy.max_retries(), 1);
        assert_eq!(policy.max_wait(), Duration::from_secs(5));
        // untouched fields keep the preset values
        assert_eq!(policy.min_wait(), Duration::from_secs(1));
        assert!(policy.is_retryable(FailureKind::Timeout));
    }

    #[test]
    fn test_custom_profile_starts_from_defaults() {
        let settings = RetrySettings::new().with_profile(
            "search_index",
            RetryProfileSettings {
                jitter: Some(false),
                retry_on: Some(RetryOnSetting::Kinds(vec![
                    "storage_busy".into(),
                    "timeout".into(),
                ])),
                ..Default::default()
            },
        );

        let policy = settings.policy("search_index").expect("valid profile");
        assert_eq!(policy.max_retries(), 3);
        assert!(!policy.use_jitter());
        assert!(policy.is_retryable(FailureKind::StorageBusy));
        assert!(!policy.is_retryable(FailureKind::Network));
    }

    #[test]
    fn test_regulatory_fetch_alias() {
        let settings = RetrySettings::new().with_profile(
            "regulatory_fetch",
            RetryProfileSettings { max_retries: Some(2), ..Default::default() },
        );
        assert_eq!(settings.policy("best_effort_fetch").expect("alias").max_retries(), 2);
    }

    #[test]
    fn test_retry_on_keyword() {
        let any = RetryOnSetting::Keyword("ANY".into()).to_retry_on().expect("any");
        assert_eq!(any, RetryOn::Any);
        assert!(RetryOnSetting::Keyword("some".into()).to_retry_on().is_err());
        assert!(RetryOnSetting::Kinds(vec!["gremlins".into()]).to_retry_on().is_err());
    }

    #[test]
    fn test_invalid_override_reported() {
        let settings = RetrySettings::new().with_profile(
            "database",
            RetryProfileSettings { min_wait_secs: Some(20.0), ..Default::default() },
        );
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("invalid retry profile 'database'"));
    }

    #[test]
    fn test_negative_wait_rejected() {
        let profile = RetryProfileSettings { min_wait_secs: Some(-1.0), ..Default::default() };
        assert!(profile.apply(&RetryPolicy::default()).is_err());
    }
}
