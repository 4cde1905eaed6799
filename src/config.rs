//! Settings for the users client
//!
//! Settings are read from an `appsettings.json` style file with three
//! sections. Every field has a default so a partial file is fine.
//!
//! ```json
//! {
//!   "ApiSettings": { "BaseUrl": "https://reqres.in/api/", "ApiKey": "reqres-free-v1" },
//!   "RetryPolicySettings": { "RetryCount": 3, "RetryDelayMilliseconds": 500 },
//!   "CacheSettings": { "ExpirationMinutes": 5 }
//! }
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default upstream base URL
pub const DEFAULT_BASE_URL: &str = "https://reqres.in/api/";

/// Default API key for the public ReqRes tier
pub const DEFAULT_API_KEY: &str = "reqres-free-v1";

/// Default per-request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default total attempts per logical call
const DEFAULT_RETRY_COUNT: i64 = 3;

/// Default fixed wait between attempts
const DEFAULT_RETRY_DELAY_MS: i64 = 500;

/// Default cache time-to-live in minutes
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 5;

/// Environment variable overriding `ApiSettings.ApiKey`
pub const API_KEY_ENV: &str = "REQRES_API_KEY";

/// Environment variable overriding `ApiSettings.BaseUrl`
pub const BASE_URL_ENV: &str = "REQRES_BASE_URL";

/// Top-level settings document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    pub api_settings: ApiSettings,
    pub retry_policy_settings: RetryPolicySettings,
    pub cache_settings: CacheSettings,
}

/// Upstream connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApiSettings {
    /// Base URL every request path is joined onto
    pub base_url: String,
    /// Value sent in the `x-api-key` header
    pub api_key: String,
    /// Per-request timeout
    pub timeout_seconds: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiSettings {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Retry behavior for transient failures
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RetryPolicySettings {
    /// Total attempts per logical call, including the first.
    ///
    /// This is not a count of retries after the first call: `RetryCount: 3`
    /// makes three requests at most, not four.
    pub retry_count: i64,
    /// Fixed wait between attempts
    pub retry_delay_milliseconds: i64,
}

impl Default for RetryPolicySettings {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay_milliseconds: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicySettings {
    /// Total attempts, never less than one
    pub fn max_attempts(&self) -> u32 {
        u32::try_from(self.retry_count.max(1)).unwrap_or(u32::MAX)
    }

    /// Wait between attempts; negative values clamp to zero
    pub fn delay(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.retry_delay_milliseconds).unwrap_or(0))
    }
}

/// Cache lifetime settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CacheSettings {
    pub expiration_minutes: i64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
        }
    }
}

impl CacheSettings {
    /// Time-to-live for cache entries.
    ///
    /// A zero or negative `ExpirationMinutes` falls back to the default.
    pub fn ttl(&self) -> Duration {
        let minutes = if self.expiration_minutes > 0 {
            self.expiration_minutes
        } else {
            DEFAULT_EXPIRATION_MINUTES
        };
        Duration::from_secs(minutes.unsigned_abs().saturating_mul(60))
    }
}

impl Settings {
    /// Parses settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Reads settings from `path` if it exists, otherwise returns defaults
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Applies `REQRES_API_KEY` and `REQRES_BASE_URL` overrides
    pub fn apply_env(mut self) -> Self {
        if let Ok(key) = env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.api_settings.api_key = key;
            }
        }
        if let Ok(url) = env::var(BASE_URL_ENV) {
            if !url.is_empty() {
                self.api_settings.base_url = url;
            }
        }
        self
    }

    /// Checks values that would otherwise fail on the first request
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_settings.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(url.to_string()));
        }
        Ok(())
    }
}
