//! Provider HTTP client
//!
//! Shared plumbing for the provider's AJAX endpoints: one `reqwest::Client`
//! with a per-request timeout, plus the header set every call (including
//! playlist fetches) must carry.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, REFERER, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{Config, DEFAULT_BASE_URL};
use crate::error::{ResolveError, Result};

/// Provider AJAX client
#[derive(Debug, Clone)]
pub struct ProviderClient {
    base_url: String,
    http: reqwest::Client,
    headers: HeaderMap,
}

/// `{status, html}` envelope used by the server-list and episode-list endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct AjaxHtml {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub html: String,
}

impl ProviderClient {
    /// Create a client from configuration
    pub fn new(config: &Config) -> Self {
        Self::build(config.base_url(), config.request_timeout(), &config.user_agent)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let defaults = Config::default();
        let base_url = base_url.into();
        Self::build(
            base_url.trim_end_matches('/'),
            defaults.request_timeout(),
            &defaults.user_agent,
        )
    }

    fn build(base_url: &str, timeout: Duration, user_agent: &str) -> Self {
        let base_url = if base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url.to_string()
        };

        Self {
            headers: default_headers(&base_url, user_agent),
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every provider request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Underlying HTTP client (shares timeout settings)
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for a provider path
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a provider URL and return the body as text
    pub(crate) async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Remote {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ResolveError::Network(format!("failed to read body of {}: {}", url, e)))
    }

    /// GET a provider URL and decode the JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body)
            .map_err(|e| ResolveError::Decode(format!("{}: {}", url, e)))
    }
}

fn default_headers(base_url: &str, user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );

    match HeaderValue::from_str(&format!("{}/", base_url)) {
        Ok(value) => {
            headers.insert(REFERER, value);
        }
        Err(e) => tracing::warn!(base_url, error = %e, "base URL is not a valid Referer header"),
    }
    match HeaderValue::from_str(user_agent) {
        Ok(value) => {
            headers.insert(USER_AGENT, value);
        }
        Err(e) => tracing::warn!(error = %e, "configured user agent is not a valid header value"),
    }

    headers
}

/// Parse a CSS selector; selectors are static so a failure is a programming error
pub(crate) fn selector(css: &str) -> Result<scraper::Selector> {
    scraper::Selector::parse(css)
        .map_err(|e| ResolveError::Decode(format!("invalid selector {}: {:?}", css, e)))
}
