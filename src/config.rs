//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STATE_DIR: &str = ".clinica";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The API base URL is not an absolute http(s) URL.
    #[error("invalid CLINICA_API_URL '{0}' (expected http:// or https://)")]
    InvalidApiUrl(String),

    /// A timeout of zero would fail every request immediately.
    #[error("{var} must be greater than zero")]
    ZeroTimeout { var: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub request_secs: u64,
    pub refresh_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without trailing slash; request paths start with `/api/v1`.
    pub api_url: String,
    pub timeouts: ClientTimeouts,
    /// Directory for the file-backed session store.
    pub state_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            timeouts: ClientTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                refresh_secs: DEFAULT_REFRESH_TIMEOUT_SECS,
            },
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CLINICA_API_URL`: default `http://localhost:8000`
    /// - `CLINICA_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CLINICA_REFRESH_TIMEOUT_SECS`: default 10
    /// - `CLINICA_STATE_DIR`: default `./.clinica`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL is not http(s) or a timeout is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("CLINICA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let timeouts = ClientTimeouts {
            request_secs: env_parse_u64("CLINICA_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            refresh_secs: env_parse_u64("CLINICA_REFRESH_TIMEOUT_SECS", DEFAULT_REFRESH_TIMEOUT_SECS),
        };
        let state_dir = std::env::var("CLINICA_STATE_DIR").map_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);

        Self::build(&api_url, timeouts, state_dir)
    }

    /// Validate and normalize explicit settings.
    ///
    /// # Errors
    ///
    /// Same rules as [`Self::from_env`].
    pub fn build(api_url: &str, timeouts: ClientTimeouts, state_dir: PathBuf) -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(api_url)?;
        if timeouts.request_secs == 0 {
            return Err(ConfigError::ZeroTimeout { var: "CLINICA_REQUEST_TIMEOUT_SECS" });
        }
        if timeouts.refresh_secs == 0 {
            return Err(ConfigError::ZeroTimeout { var: "CLINICA_REFRESH_TIMEOUT_SECS" });
        }
        Ok(Self { api_url, timeouts, state_dir })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.request_secs)
    }

    #[must_use]
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.refresh_secs)
    }

    /// Absolute URL for an API path such as `/api/v1/doctors`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidApiUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
