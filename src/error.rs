use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while parsing a lookback expression such as `3d`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("invalid duration: {input:?} (expected <number><s|m|h|d|w>)")]
    InvalidFormat { input: String },

    #[error("invalid number in duration: {input:?}")]
    InvalidMagnitude { input: String },
}

/// Failures reported by a remote event source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid API base URL: {url}")]
    InvalidBaseUrl { url: String },
}

/// Failures of a single account's fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no events found for user {login} (since {since})")]
    NoResults { login: String, since: String },

    #[error("fetching events for {login}: {source}")]
    SourceUnavailable {
        login: String,
        #[source]
        source: SourceError,
    },
}

impl FetchError {
    pub fn is_no_results(&self) -> bool {
        matches!(self, FetchError::NoResults { .. })
    }
}

/// Startup errors: configuration file problems and credential resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "config file not found at {} (a YAML config at {} is not read; convert it to TOML at this path)",
        path.display(),
        crate::config::LEGACY_CONFIG_PATH
    )]
    NotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no users defined in config file")]
    NoAccounts,

    #[error("user {index} has empty username")]
    EmptyUsername { index: usize },

    #[error("GitHub API token is required for {login} (set --api, a per-user token, GITHUB_TOKEN or GITHUB_API_TOKEN)")]
    MissingCredential { login: String },

    #[error(transparent)]
    InvalidDuration(#[from] DurationError),

    #[error("failed to determine the configuration directory")]
    NoConfigDir,
}
