//! Request data models
//!
//! Describes what a caller asks for: the endpoint, the per-call configuration,
//! and the mutable request value that flows through request interceptors

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// HTTP method for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Convert to the reqwest method type
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(format!("Unsupported HTTP method: {}", other)),
        }
    }
}

/// A path plus optional query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
    query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter; repeated keys are kept in order
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Path with exactly one leading slash
    pub fn normalized_path(&self) -> String {
        format!("/{}", self.path.trim_start_matches('/'))
    }
}

impl From<&str> for Endpoint {
    fn from(path: &str) -> Self {
        Endpoint::new(path)
    }
}

impl From<String> for Endpoint {
    fn from(path: String) -> Self {
        Endpoint::new(path)
    }
}

/// Per-call request configuration
///
/// Owned by the call that builds it. Header names are case-insensitive and
/// repeated names keep their insertion order.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HeaderMap,
    /// JSON body (optional)
    pub body: Option<serde_json::Value>,
    /// Per-attempt deadline override (optional)
    pub timeout: Option<Duration>,
    /// Whether failed attempts may be retried
    pub retry: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::new(HttpMethod::Get)
    }
}

impl RequestConfig {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
            retry: true,
        }
    }

    /// Add a header, keeping any existing values for the same name
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable retries for this call
    pub fn no_retry(mut self) -> Self {
        self.retry = false;
        self
    }
}

/// The value request interceptors receive and return
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub url: String,
    pub config: RequestConfig,
}

impl OutgoingRequest {
    pub fn new(url: impl Into<String>, config: RequestConfig) -> Self {
        Self {
            url: url.into(),
            config,
        }
    }
}
