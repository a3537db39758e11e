//! Authenticated requests against the backend API.
//!
//! The fetcher never navigates or clears the credential itself: an invalidated
//! credential is reported as [`FetchOutcome::Unauthorized`] and handled by the
//! page controller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::config::{ClientConfig, ConfigError};
use crate::token_store::{Credential, TokenStore};

/// Per-request options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result of an authenticated request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The backend answered with anything other than 401.
    Ok(reqwest::Response),
    /// The backend rejected the credential (401).
    Unauthorized,
    NetworkError(FetchError),
}

/// HTTP client that attaches the stored bearer credential to every request.
pub struct AuthenticatedFetcher {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
    tokens: Arc<dyn TokenStore>,
}

impl AuthenticatedFetcher {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            api_url: config.origin().to_string(),
            timeout: config.request_timeout(),
            tokens,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Current credential. A storage failure is logged and read as "no credential".
    pub async fn credential(&self) -> Option<Credential> {
        match self.tokens.get().await {
            Ok(credential) => credential,
            Err(err) => {
                tracing::warn!("failed to read stored credential: {err:#}");
                None
            }
        }
    }

    pub async fn get(&self, path: &str) -> FetchOutcome {
        self.request(path, RequestOptions::get()).await
    }

    pub async fn request(&self, path: &str, options: RequestOptions) -> FetchOutcome {
        let url = format!("{}/{}", self.api_url, path.trim_start_matches('/'));

        let headers = match build_headers(&options.headers) {
            Ok(headers) => headers,
            Err(err) => return FetchOutcome::NetworkError(err),
        };

        let mut req = self
            .client
            .request(options.method.clone(), &url)
            .timeout(self.timeout)
            .headers(headers);

        if let Some(credential) = self.credential().await {
            req = req.bearer_auth(credential.expose());
        }

        if let Some(body) = &options.body {
            match serde_json::to_vec(body) {
                Ok(bytes) => req = req.body(bytes),
                Err(e) => {
                    return FetchOutcome::NetworkError(FetchError::InvalidRequest(e.to_string()));
                }
            }
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                tracing::warn!(%url, "request timed out");
                return FetchOutcome::NetworkError(FetchError::Timeout);
            }
            Err(e) => {
                tracing::warn!(%url, "request failed: {e}");
                return FetchOutcome::NetworkError(FetchError::Network(e.to_string()));
            }
        };

        if resp.status() == StatusCode::UNAUTHORIZED {
            tracing::info!(%url, "credential rejected by backend");
            return FetchOutcome::Unauthorized;
        }

        tracing::debug!(%url, status = resp.status().as_u16(), "request completed");
        FetchOutcome::Ok(resp)
    }
}

/// JSON content type unless the caller supplied their own.
fn build_headers(extra: &[(String, String)]) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetchError::InvalidRequest(format!("header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::InvalidRequest(format!("header value for '{name}': {e}")))?;
        headers.insert(name, value);
    }

    Ok(headers)
}
