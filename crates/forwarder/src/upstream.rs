//! HTTP client for the n8n REST API.

use crate::errors::{ConfigError, ForwardError, Result as ForwardResult};
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use std::fmt;
use std::sync::Arc;

/// Header carrying the n8n API key on every upstream call.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-n8n-api-key");

pub const DEFAULT_BASE_URL: &str = "http://localhost:5678/api/v1";

pub const BASE_URL_VAR: &str = "N8N_API_BASE_URL";
pub const API_KEY_VAR: &str = "N8N_API_KEY";

#[derive(Clone)]
pub struct UpstreamConfig {
    base_url: String,
    api_key: String,
}

impl UpstreamConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let api_key = api_key.into();

        if api_key.trim().is_empty() {
            return Err(ConfigError::Missing(API_KEY_VAR));
        }

        reqwest::Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Reads the configuration from runtime bindings such as an edge worker's
    /// environment. The base URL falls back to [`DEFAULT_BASE_URL`].
    pub fn from_bindings<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = lookup(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;

        Self::new(base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// A single planned call against the n8n API. `path` includes the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Bytes>,
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Shared, cheaply cloneable client. Holds the connection pool and the fixed
/// header set; carries no per-call state.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: Arc<str>,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ConfigError> {
        let mut api_key = HeaderValue::from_str(&config.api_key)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.as_str()),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and reads the full response body. Any status is a
    /// successful exchange here; interpreting it is the caller's job.
    pub async fn execute(&self, request: &UpstreamRequest) -> ForwardResult<UpstreamResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url_for(&request.path));
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ForwardError::UnreadableBody { status, source })?;

        Ok(UpstreamResponse { status, body })
    }
}
