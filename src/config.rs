// Configuration: everything the client needs is resolved once from the
// environment and then handed to `PredictaClient::new` explicitly.

use std::collections::HashMap;
use std::env::VarError;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "PREDICTA_API_KEY";
/// Environment variable overriding the service base URL.
pub const API_URL_VAR: &str = "PREDICTA_API_URL";
/// Environment variable overriding the request timeout, in seconds.
pub const TIMEOUT_VAR: &str = "PREDICTA_TIMEOUT_SECS";

/// Service endpoint used when `PREDICTA_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://dev.predictasearch.com/api";
/// Request timeout used when `PREDICTA_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration. The API key is kept optional here so that a missing
/// credential is reported by the client constructor, before any request.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Build a config with the given key and default endpoint settings.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Resolve the config from the process environment.
    pub fn from_env() -> Result<Self> {
        let mut vars = HashMap::new();
        for key in [API_KEY_VAR, API_URL_VAR, TIMEOUT_VAR] {
            if let Some(value) = env_value(key, std::env::var(key))? {
                vars.insert(key, value);
            }
        }
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Resolve the config through an arbitrary key lookup.
    ///
    /// Unset and empty variables are treated alike. Invalid URL or timeout
    /// values are configuration errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR).map(|k| k.trim().to_string());

        let base_url = match get(API_URL_VAR) {
            Some(url) => normalize_base_url(&url)?,
            None => DEFAULT_BASE_URL.to_string(),
        };

        let timeout = match get(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Configuration(format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_VAR, raw))
                })?;
                if secs == 0 {
                    return Err(Error::Configuration(format!("{} must be greater than zero", TIMEOUT_VAR)));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_key,
            base_url,
            timeout,
        })
    }
}

/// Unset is `None`. A value that is not valid UTF-8 is reported as such
/// instead of being mistaken for an unset variable.
fn env_value(key: &str, value: std::result::Result<String, VarError>) -> Result<Option<String>> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(Error::Configuration(format!("{} is not valid UTF-8", key))),
    }
}

/// Check that `raw` is an absolute http(s) URL and strip trailing slashes so
/// endpoint paths can be appended with a single `/`.
fn normalize_base_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let url = reqwest::Url::parse(raw)
        .map_err(|e| Error::Configuration(format!("{} is not a valid URL ({}): {}", API_URL_VAR, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        other => Err(Error::Configuration(format!(
            "{} must use http or https, got {}",
            API_URL_VAR, other
        ))),
    }
}
