//! Interceptor pipeline
//!
//! Interceptors are registered once, frozen into an `InterceptorPipeline`,
//! and then invoked on every call in registration order. Request-phase
//! interceptors may rewrite the outgoing request; response-phase interceptors
//! only observe.

pub mod auth;
pub mod logging;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

use crate::models::{HttpMethod, OutgoingRequest};
use crate::utils::error::{ClientError, ClientResult, InterceptorError};
pub use auth::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Boxed future returned by custom request interceptors
pub type RequestFuture = BoxFuture<'static, Result<OutgoingRequest, InterceptorError>>;

/// Custom request-phase handler
pub type RequestHandler = Arc<dyn Fn(OutgoingRequest) -> RequestFuture + Send + Sync>;

/// Custom response-phase handler
pub type ResponseHandler = Arc<dyn Fn(&ResponseContext) -> Result<(), InterceptorError> + Send + Sync>;

/// Interceptor phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Request,
    Response,
}

/// What response interceptors observe about a finished call
#[derive(Debug, Clone)]
pub struct ResponseContext {
    pub request_id: Uuid,
    pub method: HttpMethod,
    pub url: String,
    /// HTTP status of the final attempt; `None` when no response arrived
    pub status: Option<u16>,
    /// Dispatches made, including the first
    pub attempts: u32,
    pub elapsed: Duration,
    pub success: bool,
    pub error: Option<String>,
}

/// A registered interceptor
#[derive(Clone)]
pub enum Interceptor {
    /// Adds `Authorization: Bearer <token>` when the store holds a token
    AuthHeader(Arc<dyn TokenStore>),
    /// Defaults `Content-Type` to `application/json`
    ContentType,
    /// Debug logging of outgoing requests
    RequestLogger,
    /// Debug logging of completed responses
    ResponseLogger,
    /// Caller-supplied request interceptor
    Request { name: String, handler: RequestHandler },
    /// Caller-supplied response interceptor
    Response { name: String, handler: ResponseHandler },
}

impl Interceptor {
    /// Wrap an async closure as a request interceptor
    pub fn request<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(OutgoingRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<OutgoingRequest, InterceptorError>> + Send + 'static,
    {
        Interceptor::Request {
            name: name.into(),
            handler: Arc::new(move |request| f(request).boxed()),
        }
    }

    /// Wrap a closure as a response interceptor
    pub fn response<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ResponseContext) -> Result<(), InterceptorError> + Send + Sync + 'static,
    {
        Interceptor::Response {
            name: name.into(),
            handler: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Interceptor::AuthHeader(_) => "auth-header",
            Interceptor::ContentType => "content-type",
            Interceptor::RequestLogger => "request-logger",
            Interceptor::ResponseLogger => "response-logger",
            Interceptor::Request { name, .. } | Interceptor::Response { name, .. } => name.as_str(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Interceptor::AuthHeader(_)
            | Interceptor::ContentType
            | Interceptor::RequestLogger
            | Interceptor::Request { .. } => Phase::Request,
            Interceptor::ResponseLogger | Interceptor::Response { .. } => Phase::Response,
        }
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("name", &self.name())
            .field("phase", &self.phase())
            .finish()
    }
}

/// Collects interceptors before the pipeline is frozen
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    interceptors: Vec<Interceptor>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in interceptors
    ///
    /// Logging interceptors are only registered in debug builds.
    pub fn with_defaults(mut self, token_store: Option<Arc<dyn TokenStore>>) -> Self {
        if let Some(store) = token_store {
            self.interceptors.push(Interceptor::AuthHeader(store));
        }
        self.interceptors.push(Interceptor::ContentType);
        if cfg!(debug_assertions) {
            self.interceptors.push(Interceptor::RequestLogger);
            self.interceptors.push(Interceptor::ResponseLogger);
        }
        self
    }

    /// Append an interceptor; the same interceptor may be registered twice
    pub fn register(mut self, interceptor: Interceptor) -> ClientResult<Self> {
        let name = interceptor.name();
        if name.trim().is_empty() {
            return Err(ClientError::InvalidInterceptor(
                "interceptor name cannot be empty".to_string(),
            ));
        }
        if name.trim() != name {
            return Err(ClientError::InvalidInterceptor(format!(
                "interceptor name '{}' has surrounding whitespace",
                name
            )));
        }
        debug!("Registered {:?} interceptor '{}'", interceptor.phase(), name);
        self.interceptors.push(interceptor);
        Ok(self)
    }

    pub fn build(self) -> InterceptorPipeline {
        InterceptorPipeline {
            interceptors: self.interceptors.into(),
        }
    }
}

/// Frozen, ordered interceptor list
#[derive(Debug, Clone)]
pub struct InterceptorPipeline {
    interceptors: Arc<[Interceptor]>,
}

impl Default for InterceptorPipeline {
    fn default() -> Self {
        PipelineBuilder::new().build()
    }
}

impl InterceptorPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(Interceptor::name).collect()
    }

    /// Run request-phase interceptors in order; each sees the previous output
    pub async fn run_request(
        &self,
        mut request: OutgoingRequest,
    ) -> Result<OutgoingRequest, InterceptorError> {
        for interceptor in self.interceptors.iter() {
            let result = match interceptor {
                Interceptor::AuthHeader(store) => auth::inject_bearer(store.as_ref(), request).await,
                Interceptor::ContentType => default_content_type(request),
                Interceptor::RequestLogger => {
                    logging::log_request(&request);
                    Ok(request)
                }
                Interceptor::Request { handler, .. } => handler(request).await,
                Interceptor::ResponseLogger | Interceptor::Response { .. } => Ok(request),
            };

            request = result.map_err(|e| {
                error!("Request interceptor '{}' aborted the pipeline: {}", interceptor.name(), e);
                e
            })?;
        }
        Ok(request)
    }

    /// Run response-phase interceptors in order
    pub fn run_response(&self, context: &ResponseContext) -> Result<(), InterceptorError> {
        for interceptor in self.interceptors.iter() {
            let result = match interceptor {
                Interceptor::ResponseLogger => {
                    logging::log_response(context);
                    Ok(())
                }
                Interceptor::Response { handler, .. } => handler(context),
                _ => Ok(()),
            };

            if let Err(e) = result {
                error!("Response interceptor '{}' failed: {}", interceptor.name(), e);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Set `Content-Type: application/json` unless the caller chose one
fn default_content_type(mut request: OutgoingRequest) -> Result<OutgoingRequest, InterceptorError> {
    if !request.config.headers.contains_key(CONTENT_TYPE) {
        request
            .config
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    Ok(request)
}
