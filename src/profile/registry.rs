// src/profile/registry.rs
// =============================================================================
// The static table of known API versions.
//
//   version  alphabet                                  results  req/min
//   v1       a-z                                       10       100
//   v2       0-9 a-z                                   12       50
//   v3       ' ' + - . 0-9 a-z                         15       80
//
// Looking up a version that is not in the table is a configuration error and
// happens before any network activity.
// =============================================================================

use std::collections::HashSet;
use std::time::Duration;

use crate::error::{HarvestError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiProfile {
    /// Version identifier, also the path segment in the endpoint URL
    pub version: String,
    /// Ordered characters queries are built from
    pub alphabet: Vec<char>,
    /// Server-side cap on names per response
    pub max_results: usize,
    /// Sustained request budget
    pub max_requests_per_minute: u32,
    /// Full URL of the autocomplete endpoint (query goes in ?query=)
    pub endpoint: String,
}

impl ApiProfile {
    pub fn new(
        version: &str,
        alphabet: &str,
        max_results: usize,
        max_requests_per_minute: u32,
        base_url: &str,
    ) -> Self {
        Self {
            version: version.to_string(),
            alphabet: alphabet.chars().collect(),
            max_results,
            max_requests_per_minute,
            endpoint: format!("{}/{}/autocomplete", base_url.trim_end_matches('/'), version),
        }
    }

    // Baseline spacing between requests: one minute divided by the rate cap
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(60) / self.max_requests_per_minute.max(1)
    }

    pub fn alphabet_string(&self) -> String {
        self.alphabet.iter().collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.alphabet.is_empty() {
            return Err(HarvestError::invalid_profile(format!(
                "{}: alphabet is empty",
                self.version
            )));
        }

        let mut seen = HashSet::new();
        for c in &self.alphabet {
            if !seen.insert(*c) {
                return Err(HarvestError::invalid_profile(format!(
                    "{}: alphabet repeats '{}'",
                    self.version, c
                )));
            }
        }

        if self.max_results == 0 {
            return Err(HarvestError::invalid_profile(format!(
                "{}: max_results must be positive",
                self.version
            )));
        }
        if self.max_requests_per_minute == 0 {
            return Err(HarvestError::invalid_profile(format!(
                "{}: max_requests_per_minute must be positive",
                self.version
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<ApiProfile>,
}

impl ProfileRegistry {
    // The three versions the service exposes, all pointing at `base_url`
    pub fn builtin(base_url: &str) -> Result<Self> {
        Self::from_profiles(vec![
            ApiProfile::new("v1", "abcdefghijklmnopqrstuvwxyz", 10, 100, base_url),
            ApiProfile::new("v2", "0123456789abcdefghijklmnopqrstuvwxyz", 12, 50, base_url),
            ApiProfile::new(
                "v3",
                " +-.0123456789abcdefghijklmnopqrstuvwxyz",
                15,
                80,
                base_url,
            ),
        ])
    }

    pub fn from_profiles(profiles: Vec<ApiProfile>) -> Result<Self> {
        for profile in &profiles {
            profile.validate()?;
        }
        Ok(Self { profiles })
    }

    pub fn lookup(&self, version: &str) -> Result<&ApiProfile> {
        self.profiles
            .iter()
            .find(|p| p.version == version)
            .ok_or_else(|| HarvestError::UnknownVersion {
                version: version.to_string(),
                known: self.versions().iter().map(|v| v.to_string()).collect(),
            })
    }

    pub fn versions(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.version.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApiProfile> {
        self.profiles.iter()
    }
}
