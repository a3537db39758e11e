//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pagegate_auth::{PathMatch, PolicyConfig};

/// Configuration for the page gate client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend API (also the origin the credential is scoped to).
    pub api_url: String,
    /// Timeout applied to every outbound request, in milliseconds.
    pub request_timeout_ms: u64,
    pub policy: PolicyConfig,
    /// Page the mobile "create" action opens when no handler is registered.
    pub create_action_fallback: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("current page location is unusable: {0}")]
    Location(#[from] pagegate_core::GateError),
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            request_timeout_ms: 10_000,
            policy: PolicyConfig::default(),
            create_action_fallback: "/solicitacoes.html".to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `PAGEGATE_API_URL`, `PAGEGATE_REQUEST_TIMEOUT_MS`
    /// and `PAGEGATE_PATH_MATCH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("PAGEGATE_API_URL") {
            config.api_url = url;
        }

        if let Some(raw) = lookup("PAGEGATE_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "PAGEGATE_REQUEST_TIMEOUT_MS",
                message: format!("{e}"),
            })?;
        }

        if let Some(raw) = lookup("PAGEGATE_PATH_MATCH") {
            config.policy.path_match =
                raw.parse::<PathMatch>().map_err(|e| ConfigError::Invalid {
                    key: "PAGEGATE_PATH_MATCH",
                    message: e.to_string(),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "api_url",
                message: format!("'{}' is not an http(s) URL", self.api_url),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Origin the stored credential belongs to.
    pub fn origin(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}
