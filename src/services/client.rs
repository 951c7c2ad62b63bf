//! API client service
//!
//! The façade every caller goes through: builds the URL, runs the
//! interceptor pipeline, dispatches under a deadline, retries transient
//! failures, and normalizes the result into `ApiResponse<T>`.
//!
//! Expected failures never escape as errors. Only configuration and
//! registration faults are reported, by `ApiClientBuilder::build`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use super::normalizer::ResponseNormalizer;
use super::retry::{Attempt, RetryDecision};
use super::transport::{HttpTransport, Transport};
use crate::config::{ClientConfig, Settings};
use crate::middleware::{
    FileTokenStore, Interceptor, InterceptorPipeline, PipelineBuilder, ResponseContext, TokenStore,
};
use crate::models::{ApiResponse, Endpoint, HttpMethod, OutgoingRequest, RequestConfig};
use crate::utils::error::{classify, ClientResult, ErrorKind, Failure};

struct ClientInner {
    config: ClientConfig,
    pipeline: InterceptorPipeline,
    transport: Arc<dyn Transport>,
    normalizer: ResponseNormalizer,
}

/// Process-scoped API client
///
/// Cheap to clone; clones share configuration, interceptors and transport.
/// Calls never share mutable state and may run concurrently.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .field("interceptors", &self.inner.pipeline.names())
            .finish()
    }
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Build a client from environment settings
    pub fn from_env() -> ClientResult<Self> {
        Self::builder().settings(Settings::new()?).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn pipeline(&self) -> &InterceptorPipeline {
        &self.inner.pipeline
    }

    /// GET request
    pub async fn get<T: DeserializeOwned>(&self, endpoint: impl Into<Endpoint>) -> ApiResponse<T> {
        self.request(endpoint.into(), RequestConfig::new(HttpMethod::Get))
            .await
    }

    /// POST request
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: impl Into<Endpoint>,
        body: Option<Value>,
    ) -> ApiResponse<T> {
        self.request(endpoint.into(), with_body(HttpMethod::Post, body))
            .await
    }

    /// PUT request
    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: impl Into<Endpoint>,
        body: Option<Value>,
    ) -> ApiResponse<T> {
        self.request(endpoint.into(), with_body(HttpMethod::Put, body))
            .await
    }

    /// PATCH request
    pub async fn patch<T: DeserializeOwned>(
        &self,
        endpoint: impl Into<Endpoint>,
        body: Option<Value>,
    ) -> ApiResponse<T> {
        self.request(endpoint.into(), with_body(HttpMethod::Patch, body))
            .await
    }

    /// DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: impl Into<Endpoint>) -> ApiResponse<T> {
        self.request(endpoint.into(), RequestConfig::new(HttpMethod::Delete))
            .await
    }

    /// Execute a request; always resolves to a well-formed `ApiResponse`
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        config: RequestConfig,
    ) -> ApiResponse<T> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "api_request",
            request_id = %request_id,
            method = %config.method,
            path = %endpoint.path(),
        );

        self.execute(request_id, endpoint, config)
            .instrument(span)
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request_id: Uuid,
        endpoint: Endpoint,
        config: RequestConfig,
    ) -> ApiResponse<T> {
        let inner = &self.inner;
        let started = Instant::now();

        let url = match inner.config.build_url(&endpoint) {
            Ok(url) => url,
            Err(e) => {
                error!("Failed to build request URL: {}", e);
                return ApiResponse::failure(ErrorKind::UnknownError.user_message());
            }
        };

        let outgoing = match inner.pipeline.run_request(OutgoingRequest::new(url, config)).await {
            Ok(outgoing) => outgoing,
            Err(e) => {
                let error = classify(Failure::Interceptor(e));
                return ApiResponse::failure(error.user_message());
            }
        };

        let deadline = outgoing
            .config
            .timeout
            .unwrap_or(inner.config.default_timeout);
        let mut attempt = Attempt::start(0);

        loop {
            debug!(
                "Dispatching attempt {}: {} {}",
                attempt.index + 1,
                outgoing.config.method,
                outgoing.url
            );

            let (status, result) =
                match tokio::time::timeout(deadline, inner.transport.send(&outgoing)).await {
                    Ok(Ok(raw)) => (
                        Some(raw.status),
                        inner.normalizer.normalize::<T>(&raw.body, raw.status),
                    ),
                    Ok(Err(e)) => (None, Err(classify(Failure::Transport(e)))),
                    Err(_) => (None, Err(classify(Failure::DeadlineExceeded(deadline)))),
                };

            debug!("Attempt {} finished in {:?}", attempt.index + 1, attempt.elapsed());

            let error = match result {
                Ok(response) => {
                    let attempts = attempt.index + 1;
                    return self.finish(request_id, &outgoing, status, attempts, started, response);
                }
                Err(error) => error,
            };

            let decision = if outgoing.config.retry {
                inner.config.retry.decide(attempt.index, &error)
            } else {
                RetryDecision::NoRetry
            };

            match decision {
                RetryDecision::Retry { delay } => {
                    warn!(
                        "Attempt {} failed ({}), retrying in {}ms",
                        attempt.index + 1,
                        error.kind,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt = Attempt::start(attempt.index + 1);
                }
                RetryDecision::NoRetry => {
                    if error.should_log_details() {
                        warn!("Request failed after {} attempt(s): {}", attempt.index + 1, error);
                    } else {
                        warn!("Request failed after {} attempt(s): {}", attempt.index + 1, error.kind);
                    }
                    let response = ApiResponse::failure(error.user_message());
                    let attempts = attempt.index + 1;
                    return self.finish(request_id, &outgoing, status, attempts, started, response);
                }
            }
        }
    }

    /// Run response interceptors over the final outcome
    fn finish<T>(
        &self,
        request_id: Uuid,
        outgoing: &OutgoingRequest,
        status: Option<u16>,
        attempts: u32,
        started: Instant,
        response: ApiResponse<T>,
    ) -> ApiResponse<T> {
        let context = ResponseContext {
            request_id,
            method: outgoing.config.method,
            url: outgoing.url.clone(),
            status,
            attempts,
            elapsed: started.elapsed(),
            success: response.is_success(),
            error: response.error().map(str::to_string),
        };

        match self.inner.pipeline.run_response(&context) {
            Ok(()) => response,
            Err(e) => ApiResponse::failure(classify(Failure::Interceptor(e)).user_message()),
        }
    }
}

fn with_body(method: HttpMethod, body: Option<Value>) -> RequestConfig {
    let config = RequestConfig::new(method);
    match body {
        Some(body) => config.body(body),
        None => config,
    }
}

/// Assembles an `ApiClient`
#[derive(Default)]
pub struct ApiClientBuilder {
    settings: Option<Settings>,
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn Transport>>,
    token_store: Option<Arc<dyn TokenStore>>,
    interceptors: Vec<Interceptor>,
    skip_defaults: bool,
}

impl ApiClientBuilder {
    /// Derive configuration and the credential file from settings
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Use an already-built configuration; takes precedence over settings
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Register an interceptor after the built-in ones
    pub fn interceptor(mut self, interceptor: Interceptor) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Do not register the built-in interceptors
    pub fn without_default_interceptors(mut self) -> Self {
        self.skip_defaults = true;
        self
    }

    /// Resolve the base URL and freeze the interceptor list
    ///
    /// Fails on misconfiguration (no base URL source, invalid URL) and on
    /// invalid interceptor registration.
    pub fn build(self) -> ClientResult<ApiClient> {
        let config = match (self.config, &self.settings) {
            (Some(config), _) => config,
            (None, Some(settings)) => ClientConfig::from_settings(settings)?,
            (None, None) => ClientConfig::from_settings(&Settings::default())?,
        };
        config.base_url()?;

        // Settings without an explicit store read the credential file
        let token_store = self.token_store.or_else(|| {
            self.settings.as_ref().map(|settings| {
                let store: Arc<dyn TokenStore> =
                    Arc::new(FileTokenStore::new(settings.credentials.token_store_path.clone()));
                store
            })
        });

        let mut pipeline = PipelineBuilder::new();
        if !self.skip_defaults {
            pipeline = pipeline.with_defaults(token_store);
        }
        for interceptor in self.interceptors {
            pipeline = pipeline.register(interceptor)?;
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                config,
                pipeline: pipeline.build(),
                transport,
                normalizer: ResponseNormalizer::new(),
            }),
        })
    }
}
