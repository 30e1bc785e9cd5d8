//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Refresh the bearer token when it expires within this many seconds.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 30;
/// Delay before an errored resource goes back to idle.
pub const DEFAULT_ERROR_RESET_SECS: u64 = 60;

/// Per-resource freshness windows.
///
/// A successful fetch younger than its window satisfies later non-forced
/// fetches from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    pub balance: Duration,
    pub transactions: Duration,
    pub packages: Duration,
    pub costs: Duration,
    pub tasks: Duration,
    pub task_details: Duration,
    pub filters: Duration,
    pub channel_sets: Duration,
    pub channel_set_details: Duration,
    pub error_reset: Duration,
}

impl Default for Freshness {
    fn default() -> Self {
        Self {
            balance: Duration::from_secs(60),
            transactions: Duration::from_secs(60),
            packages: Duration::from_secs(5 * 60),
            costs: Duration::from_secs(60 * 60),
            tasks: Duration::from_secs(30),
            task_details: Duration::from_secs(30),
            filters: Duration::from_secs(5 * 60),
            channel_sets: Duration::from_secs(60),
            channel_set_details: Duration::from_secs(60),
            error_reset: Duration::from_secs(DEFAULT_ERROR_RESET_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash, e.g. `https://host/api`.
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub refresh_margin_secs: i64,
    /// Where to persist the bearer token. `None` keeps it in memory only.
    pub token_file: Option<PathBuf>,
    pub freshness: Freshness,
}

impl ClientConfig {
    /// Config pointing at `api_url` with every other knob at its default.
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            refresh_margin_secs: DEFAULT_REFRESH_MARGIN_SECS,
            token_file: None,
            freshness: Freshness::default(),
        }
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CHANLENS_API_URL`: default `http://127.0.0.1:8000/api`
    /// - `CHANLENS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CHANLENS_CONNECT_TIMEOUT_SECS`: default 10
    /// - `CHANLENS_TOKEN_FILE`: path of the persisted bearer token
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the API URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the API URL is not an http(s) URL.
    pub fn from_lookup<F>(get: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = get("CHANLENS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        validate_api_url(&api_url)?;

        let mut config = Self::new(api_url);
        config.request_timeout_secs = parse_or(&get, "CHANLENS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS);
        config.connect_timeout_secs = parse_or(&get, "CHANLENS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS);
        config.token_file = get("CHANLENS_TOKEN_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        Ok(config)
    }
}

/// Reject anything that is not an absolute http(s) URL.
///
/// # Errors
///
/// Returns [`ApiError::Config`] describing the bad value.
pub fn validate_api_url(raw: &str) -> Result<(), ApiError> {
    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .ok_or_else(|| ApiError::Config(format!("api url must start with http:// or https://: {raw}")))?;
    if rest.trim_matches('/').is_empty() {
        return Err(ApiError::Config(format!("api url has no host: {raw}")));
    }
    Ok(())
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    get(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
