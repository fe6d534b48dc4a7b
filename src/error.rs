// src/error.rs
// =============================================================================
// Error types shared across the harvester.
//
// Two families:
// - HarvestError: things that stop a run before it starts (bad version,
//   bad settings, I/O on the output directory)
// - FetchError: things that go wrong on a single request. These never leave
//   the fetch client; they are turned into "empty result + failure record".
//
// Rust concepts:
// - thiserror: derive Display/Error for enums instead of writing impls by hand
// - #[from]: lets `?` convert a foreign error into our enum automatically
// =============================================================================

use thiserror::Error;

// Result alias used by everything below main.rs
pub type Result<T> = std::result::Result<T, HarvestError>;

#[derive(Error, Debug)]
pub enum HarvestError {
    /// The requested API version has no profile
    #[error("unknown API version '{version}' (valid versions: {})", .known.join(", "))]
    UnknownVersion { version: String, known: Vec<String> },

    /// A profile failed validation (empty alphabet, zero caps, ...)
    #[error("invalid API profile: {0}")]
    InvalidProfile(String),

    /// Settings could not be loaded or are inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Building the HTTP client failed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HarvestError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_profile(message: impl Into<String>) -> Self {
        Self::InvalidProfile(message.into())
    }

    // True for errors caused by how the program was invoked rather than by
    // the environment. main.rs maps these to the "usage" exit code.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::UnknownVersion { .. })
    }
}

// Failure of the raw transport for one query.
//
// Status codes are not errors at this level: a 429 or a 500 is still a
// response and is classified by the fetch client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),
}
