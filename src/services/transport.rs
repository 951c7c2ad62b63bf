//! HTTP transport
//!
//! The single network seam of the client. `HttpTransport` dispatches through
//! reqwest; deadlines are applied by the caller, not here.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use tracing::debug;

use crate::models::OutgoingRequest;
use crate::utils::error::{ClientResult, TransportError};

/// A received HTTP response, before normalization
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Executes one HTTP exchange
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request; any HTTP status is a successful exchange
    async fn send(&self, request: &OutgoingRequest) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport instance
    pub fn new() -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("crm-api-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Use a preconfigured reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &OutgoingRequest) -> Result<RawResponse, TransportError> {
        let config = &request.config;

        let mut builder = self
            .client
            .request(config.method.to_reqwest(), &request.url)
            .headers(config.headers.clone());

        if let Some(body) = &config.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        debug!("Received HTTP {} ({} bytes)", status, body.len());
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
