//! Authentication interceptor
//!
//! Reads the bearer token from the credential store and attaches it to
//! outgoing requests. The client never writes to the store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::OutgoingRequest;
use crate::utils::error::InterceptorError;

/// Key under which the token is persisted
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Read-only view of the persisted credential store
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current bearer token; `None` when the user is signed out
    async fn read_token(&self) -> Result<Option<String>>;
}

/// In-process token holder, written by the session owner
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn read_token(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }
}

/// Key-value JSON file, e.g. `{"authToken": "..."}`
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: AUTH_TOKEN_KEY.to_string(),
        }
    }

    /// Read the token from a different key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn read_token(&self) -> Result<Option<String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Credential store {:?} does not exist", self.path);
                return Ok(None);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read credential store: {:?}", self.path))
            }
        };

        let values: serde_json::Value =
            serde_json::from_str(&content).context("Failed to parse credential store JSON")?;

        Ok(values
            .get(&self.key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string))
    }
}

/// Attach `Authorization: Bearer <token>`
///
/// No-op without a token, or when the caller already set `Authorization`.
pub async fn inject_bearer(
    store: &dyn TokenStore,
    mut request: OutgoingRequest,
) -> Result<OutgoingRequest, InterceptorError> {
    if request.config.headers.contains_key(AUTHORIZATION) {
        return Ok(request);
    }

    let token = store
        .read_token()
        .await
        .map_err(|e| InterceptorError::new("auth-header", format!("{:#}", e)))?;

    let Some(token) = token.filter(|t| !t.is_empty()) else {
        debug!("No auth token available, sending request without Authorization");
        return Ok(request);
    };

    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| InterceptorError::new("auth-header", "stored token is not a valid header value"))?;
    value.set_sensitive(true);
    request.config.headers.insert(AUTHORIZATION, value);
    Ok(request)
}
