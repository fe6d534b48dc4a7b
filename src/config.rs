// src/config.rs
// =============================================================================
// Runtime settings for a harvest run.
//
// Settings come from three layers, later layers win:
// 1. Built-in defaults (Settings::default)
// 2. An optional TOML file (harvester.toml, or --config <path>)
// 3. Command-line flags (applied in main.rs)
//
// Every field has a default, so a settings file only needs the keys it
// wants to change:
//
//   base_url = "http://localhost:8000"
//   checkpoint_every = 50
//
//   [retry]
//   max_retries = 8
// =============================================================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::crawl::ExpansionPolicy;
use crate::error::{HarvestError, Result};

// Settings file picked up from the working directory when --config is absent
pub const DEFAULT_SETTINGS_FILE: &str = "harvester.toml";

const MAX_RETRY_LIMIT: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Scheme + host of the autocomplete service, without the version path
    pub base_url: String,
    /// Where names_<version>.txt and failures_<version>.txt live
    pub output_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Flush results every N dispatched queries (0 = only at the end)
    pub checkpoint_every: usize,
    pub expansion: ExpansionPolicy,
    pub rate: RateSettings,
    pub retry: RetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://35.200.185.69:8000".to_string(),
            output_dir: PathBuf::from("output"),
            request_timeout_secs: 10,
            user_agent: concat!("name-harvester/", env!("CARGO_PKG_VERSION")).to_string(),
            checkpoint_every: 100,
            expansion: ExpansionPolicy::default(),
            rate: RateSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

// Tuning for the adaptive inter-request interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateSettings {
    /// Responses slower than this widen the interval
    pub slow_response_ms: u64,
    /// Added to the interval after a slow response
    pub slow_step_ms: u64,
    /// Removed from the interval after a fast response (down to baseline)
    pub fast_step_ms: u64,
    /// Interval multiplier applied after every 429
    pub rate_limit_factor: f64,
    /// Upper bound for the adaptive interval
    pub max_interval_ms: u64,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            slow_response_ms: 500,
            slow_step_ms: 100,
            fast_step_ms: 50,
            rate_limit_factor: 1.5,
            max_interval_ms: 30_000,
        }
    }
}

impl RateSettings {
    pub fn slow_response(&self) -> Duration {
        Duration::from_millis(self.slow_response_ms)
    }

    pub fn slow_step(&self) -> Duration {
        Duration::from_millis(self.slow_step_ms)
    }

    pub fn fast_step(&self) -> Duration {
        Duration::from_millis(self.fast_step_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }
}

// Backoff policy for HTTP 429 responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    /// Retries after the first attempt; the query fails once these run out
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff_ms: 1_000,
            backoff_multiplier: 2.0,
            max_backoff_ms: 60_000,
        }
    }
}

impl RetrySettings {
    // Delay before retry number `attempt` (1-based):
    //   initial * multiplier^(attempt - 1), capped at max_backoff
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = millis.min(self.max_backoff_ms as f64);
        Duration::from_millis(capped as u64)
    }
}

impl Settings {
    // Loads settings from `path` if given, otherwise from DEFAULT_SETTINGS_FILE
    // when it exists, otherwise returns the defaults.
    //
    // An explicitly requested file that is missing is an error; the implicit
    // one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let implicit = Path::new(DEFAULT_SETTINGS_FILE);
                if implicit.exists() {
                    Self::from_file(implicit)?
                } else {
                    log::debug!("No {} found, using default settings", DEFAULT_SETTINGS_FILE);
                    Self::default()
                }
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarvestError::config(format!("cannot read settings file {}: {}", path.display(), e))
        })?;
        let settings: Settings = toml::from_str(&text)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| HarvestError::config(format!("invalid base_url '{}': {}", self.base_url, e)))?;

        if self.request_timeout_secs == 0 {
            return Err(HarvestError::config("request_timeout_secs must be positive"));
        }
        if !is_growth_factor(self.rate.rate_limit_factor) {
            return Err(HarvestError::config(
                "rate.rate_limit_factor must be a finite number >= 1.0",
            ));
        }
        if !is_growth_factor(self.retry.backoff_multiplier) {
            return Err(HarvestError::config(
                "retry.backoff_multiplier must be a finite number >= 1.0",
            ));
        }
        if self.retry.max_retries > MAX_RETRY_LIMIT {
            return Err(HarvestError::config(format!(
                "retry.max_retries must be at most {}",
                MAX_RETRY_LIMIT
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// NaN fails every comparison, so it is rejected here too
fn is_growth_factor(value: f64) -> bool {
    value.is_finite() && value >= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let retry = RetrySettings {
            max_retries: 10,
            initial_backoff_ms: 1_000,
            backoff_multiplier: 2.0,
            max_backoff_ms: 5_000,
        };
        assert_eq!(retry.backoff_for(1), Duration::from_millis(1_000));
        assert_eq!(retry.backoff_for(2), Duration::from_millis(2_000));
        assert_eq!(retry.backoff_for(3), Duration::from_millis(4_000));
        assert_eq!(retry.backoff_for(4), Duration::from_millis(5_000));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "checkpoint_every = 7\nexpansion = \"full_alphabet\"\n\n[retry]\nmax_retries = 2"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.checkpoint_every, 7);
        assert_eq!(settings.expansion, ExpansionPolicy::FullAlphabet);
        assert_eq!(settings.retry.max_retries, 2);
        assert_eq!(settings.retry.initial_backoff_ms, 1_000);
        assert_eq!(settings.rate, RateSettings::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(HarvestError::Config(_))));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_speed = 11").unwrap();
        assert!(matches!(
            Settings::load(Some(file.path())),
            Err(HarvestError::Toml(_))
        ));
    }

    #[test]
    fn test_validate_rejects_shrinking_factor() {
        let mut settings = Settings::default();
        settings.rate.rate_limit_factor = 0.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.base_url = "not a url".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_non_finite_factors_are_rejected() {
        for text in [
            "[rate]\nrate_limit_factor = nan",
            "[rate]\nrate_limit_factor = inf",
            "[retry]\nbackoff_multiplier = nan",
            "[retry]\nbackoff_multiplier = inf",
        ] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "{}", text).unwrap();
            assert!(
                matches!(Settings::load(Some(file.path())), Err(HarvestError::Config(_))),
                "accepted: {}",
                text
            );
        }

        let mut settings = Settings::default();
        settings.retry.backoff_multiplier = f64::NAN;
        assert!(settings.validate().is_err());
        settings.retry.backoff_multiplier = 1.0;
        assert!(settings.validate().is_ok());
    }
}
