// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport abstraction for the remote contents API.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTPS requests for production (reqwest)
//! - Mock transports for unit testing

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Url;

/// Timeout applied to every request by [`ReqwestTransport`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport could not be constructed.
    #[error("invalid transport setup: {0}")]
    Setup(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// Reading the response failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path starting with `/`, e.g. `/repos/alice/notes/contents/backup.json`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        HttpRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the value of a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A raw response, before classification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are stored lowercase.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for request/response communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait HttpTransport: Send + Sync {
    /// Sends a request and returns the response, whatever its status.
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + '_>>;
}

/// HTTPS transport implementation using reqwest.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base: Url,
}

impl ReqwestTransport {
    /// Creates a transport that authenticates every request with `credential`.
    pub fn new(base_url: &str, credential: &str, user_agent: &str) -> TransportResult<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {credential}"))
            .map_err(|_| TransportError::Setup("credential contains invalid characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| TransportError::Setup(format!("invalid user agent: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        let base = Url::parse(base_url)
            .map_err(|e| TransportError::Setup(format!("invalid API base '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::Setup(format!("invalid API base '{base_url}'")));
        }

        Ok(ReqwestTransport { client, base })
    }

    /// Joins a request path onto the API base, percent-encoding each segment.
    pub fn url_for(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            let url = self.url_for(&request.path);
            let mut builder = match request.method {
                Method::Get => self.client.get(url),
                Method::Put => self.client.put(url),
                Method::Delete => self.client.delete(url),
            };
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::ConnectionFailed(e.to_string())
                }
            })?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
                })
                .collect();
            let body = response.text().await.map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::ReceiveFailed(e.to_string())
                }
            })?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}
